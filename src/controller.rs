//! Declarative controller routes.
//!
//! Route declarations accumulate per controller type in a [`RouteRegistry`]
//! during setup. Each route is a controller method taking the instance as its
//! receiver. Assembly pairs the declarations with controller instances and
//! yields one prefixed router per instance:
//!
//! ```rust
//! use std::sync::Arc;
//! use tether::{Controller, Request, RouteRegistry, Router};
//!
//! struct Users {
//!     names: Vec<&'static str>,
//! }
//! impl Controller for Users {}
//!
//! impl Users {
//!     async fn list(self: Arc<Self>, _: Request) -> String {
//!         self.names.join(",")
//!     }
//! }
//!
//! let mut routes = RouteRegistry::new();
//! routes.controller::<Users>("/users").get("", Users::list);
//!
//! let users = Arc::new(Users { names: vec!["alice", "bob"] });
//! let app = routes
//!     .routes_for(users)
//!     .unwrap()
//!     .into_iter()
//!     .try_fold(Router::new(), Router::merge)
//!     .unwrap();
//! assert_eq!(app.routes().collect::<Vec<_>>(), [(tether::Method::Get, "/users")]);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::handler::{self, Action, Endpoint};
use crate::method::Method;
use crate::registry::short_type_name;
use crate::router::{Router, join_path};

use self::private::IntoAny;

/// Marks a type whose instances serve routes declared in a [`RouteRegistry`].
///
/// Every method has a working default; implementors write an empty impl.
pub trait Controller: private::IntoAny {
    /// Short type name, used in diagnostics.
    fn controller_name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    #[doc(hidden)]
    fn controller_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

mod private {
    use std::any::Any;
    use std::sync::Arc;

    pub trait IntoAny: Any + Send + Sync {
        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    }

    impl<T: Any + Send + Sync> IntoAny for T {
        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }
}

type Instance = Arc<dyn Any + Send + Sync>;

/// A declared route waiting for its controller instance.
struct Declared {
    method: Method,
    path: String,
    bind: Box<dyn Fn(Instance) -> Option<Endpoint> + Send + Sync>,
}

struct Entry {
    name: &'static str,
    prefix: String,
    routes: Vec<Declared>,
}

/// Per-controller route declarations and path prefixes.
///
/// Declaration methods take `&mut self`; assembly only reads, so one registry
/// can assemble routers for any number of instances.
#[derive(Default)]
pub struct RouteRegistry {
    entries: HashMap<TypeId, Entry>,
}

/// Route declarations for one controller type. Returned by
/// [`RouteRegistry::controller`].
pub struct ControllerRoutes<'r, C> {
    entry: &'r mut Entry,
    _controller: std::marker::PhantomData<fn(C)>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry<C: Controller>(&mut self) -> &mut Entry {
        self.entries.entry(TypeId::of::<C>()).or_insert_with(|| Entry {
            name: short_type_name::<C>(),
            prefix: String::new(),
            routes: Vec::new(),
        })
    }

    /// Records the path prefix for `C`. A controller declared this way
    /// assembles to a router even when it has no routes.
    pub fn controller<C: Controller>(&mut self, prefix: &str) -> ControllerRoutes<'_, C> {
        let entry = self.entry::<C>();
        entry.prefix = prefix.to_owned();
        ControllerRoutes { entry, _controller: std::marker::PhantomData }
    }

    /// Declares `method path → action` on `C`. A controller with routes but
    /// no [`controller`](Self::controller) call mounts at the root.
    pub fn route<C: Controller>(&mut self, method: Method, path: &str, action: impl Action<C>) -> &mut Self {
        declare(self.entry::<C>(), method, path, action);
        self
    }

    /// Builds one router per controller instance, in the order given, each
    /// mounted under its controller's prefix.
    ///
    /// Fails without side effects when an instance's type was never declared
    /// or a declared path is rejected by the router.
    pub fn routes_for(&self, controllers: impl Into<Controllers>) -> Result<Vec<Router>, Error> {
        controllers
            .into()
            .0
            .into_iter()
            .map(|controller| self.assemble(controller))
            .collect()
    }

    fn assemble(&self, controller: Arc<dyn Controller>) -> Result<Router, Error> {
        let name = controller.controller_name();
        let entry = self
            .entries
            .get(&controller.controller_id())
            .ok_or(Error::UnregisteredController(name))?;
        debug!(
            controller = entry.name,
            prefix = %entry.prefix,
            routes = entry.routes.len(),
            "mounting controller"
        );

        let instance = controller.into_any();
        let mut router = Router::new();
        for route in &entry.routes {
            let endpoint = (route.bind)(Arc::clone(&instance))
                .ok_or(Error::UnregisteredController(name))?;
            router.insert(route.method, &join_path(&entry.prefix, &route.path), endpoint)?;
        }
        Ok(router)
    }
}

impl<C: Controller> ControllerRoutes<'_, C> {
    pub fn route(self, method: Method, path: &str, action: impl Action<C>) -> Self {
        declare(&mut *self.entry, method, path, action);
        self
    }

    pub fn get(self, path: &str, action: impl Action<C>) -> Self {
        self.route(Method::Get, path, action)
    }

    pub fn post(self, path: &str, action: impl Action<C>) -> Self {
        self.route(Method::Post, path, action)
    }

    pub fn put(self, path: &str, action: impl Action<C>) -> Self {
        self.route(Method::Put, path, action)
    }

    pub fn delete(self, path: &str, action: impl Action<C>) -> Self {
        self.route(Method::Delete, path, action)
    }
}

fn declare<C: Controller, A: Action<C>>(entry: &mut Entry, method: Method, path: &str, action: A) {
    let action = Arc::new(action);
    entry.routes.push(Declared {
        method,
        path: path.to_owned(),
        bind: Box::new(move |instance: Instance| {
            let controller = instance.downcast::<C>().ok()?;
            Some(handler::bind(Arc::clone(&action), controller))
        }),
    });
}

/// One controller instance or a list of them.
pub struct Controllers(Vec<Arc<dyn Controller>>);

impl<C: Controller> From<Arc<C>> for Controllers {
    fn from(controller: Arc<C>) -> Self {
        Self(vec![controller as Arc<dyn Controller>])
    }
}

impl From<Arc<dyn Controller>> for Controllers {
    fn from(controller: Arc<dyn Controller>) -> Self {
        Self(vec![controller])
    }
}

impl From<&[Arc<dyn Controller>]> for Controllers {
    fn from(controllers: &[Arc<dyn Controller>]) -> Self {
        Self(controllers.to_vec())
    }
}

impl<const N: usize> From<[Arc<dyn Controller>; N]> for Controllers {
    fn from(controllers: [Arc<dyn Controller>; N]) -> Self {
        Self(controllers.into())
    }
}

impl From<Vec<Arc<dyn Controller>>> for Controllers {
    fn from(controllers: Vec<Arc<dyn Controller>>) -> Self {
        Self(controllers)
    }
}
