//! # tether
//!
//! Two cross-cutting utilities for services built on a small HTTP stack:
//!
//! - **Method logging.** [`LogDecorator::decorate`] wraps a method so every
//!   call logs its arguments, its return value and its failures, without
//!   changing what the caller sees.
//! - **Controller routes.** [`RouteRegistry`] collects route declarations per
//!   controller type and assembles them into prefixed, mountable [`Router`]s.
//!
//! Both are set up explicitly at startup. There is no global state: the
//! [`ExclusionRegistry`] and [`RouteRegistry`] are values you build, then hand
//! over.
//!
//! ## Logging a method
//!
//! ```rust
//! use std::sync::Arc;
//! use tether::{ExclusionRegistry, LogDecorator, LogOptions, MethodId};
//!
//! struct Accounts;
//!
//! impl Accounts {
//!     fn login(&self, user: &str, _password: &str) -> Result<u64, String> {
//!         if user.is_empty() { Err("missing user".into()) } else { Ok(42) }
//!     }
//! }
//!
//! let login_id = MethodId::of::<Accounts>("login");
//!
//! let mut exclusions = ExclusionRegistry::new();
//! exclusions.exclude(login_id.clone(), 1);
//!
//! let log = LogDecorator::builder()
//!     .info(|line| println!("{line}"))
//!     .error(|line| eprintln!("{line}"))
//!     .registry(Arc::new(exclusions))
//!     .build();
//!
//! let login = log.decorate(
//!     login_id,
//!     LogOptions::default(),
//!     |accounts: &Accounts, (user, password): (&str, &str)| accounts.login(user, password),
//! );
//!
//! // Accounts.login called with args: ["alice"]
//! // Accounts.login returned: 42
//! assert_eq!(login.call(&Accounts, ("alice", "hunter2")), Ok(42));
//!
//! // Accounts.login called with args: [""]
//! // Accounts.login threw error: missing user
//! assert!(login.call(&Accounts, ("", "hunter2")).is_err());
//! ```

mod args;
mod controller;
mod error;
mod filter;
mod handler;
mod interceptor;
mod method;
mod options;
mod registry;
mod request;
mod response;
mod router;
mod sink;
mod value;

pub use args::Arguments;
pub use controller::{Controller, ControllerRoutes, Controllers, RouteRegistry};
pub use error::Error;
pub use filter::{FilterAction, FilterTarget, KeyFilter, KeyPath};
pub use handler::{Action, Handler};
pub use interceptor::{LogDecorator, LogDecoratorBuilder, Logged};
pub use method::{Method, UnknownMethod};
pub use options::{ArgSelection, LogOptions};
pub use registry::{ExclusionRegistry, Exclusions, MethodId};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use sink::{LogFn, Sinks};
pub use value::{LogValue, Opaque, Serializer, json_serializer};
