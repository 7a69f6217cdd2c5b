//! Method-logging interceptor.
//!
//! [`LogDecorator::decorate`] takes a method (any `Fn(receiver, args)`), its
//! [`MethodId`] and its [`LogOptions`], and returns a [`Logged`] wrapper. Each
//! call through the wrapper:
//!
//! 1. logs `"<Type>.<method> called with args: <json-array>"` (info sink),
//! 2. invokes the method with the original, unfiltered arguments,
//! 3. logs `"<Type>.<method> returned: <value>"` (info sink) or
//!    `"<Type>.<method> threw error: <message>"` (error sink),
//! 4. hands the result back untouched.
//!
//! The wrapper never changes what the caller sees. Logging failures degrade
//! to a shorter line and a note on the debug sink.
//!
//! # Which arguments are logged
//!
//! Arguments keep their original position through the whole pipeline:
//!
//! ```text
//! [a0, a1, a2, a3]
//!   → logArgs = [3, 0, 9]            → (3:a3) (0:a0)      index 9 is out of range
//!   → args key filters, in order     → applied to each object-shaped value
//!   → registry path redaction        → matched by original position
//!   → registry exclusion of 0        → (3:a3)             always last, always wins
//! ```
//!
//! # Deferred results
//!
//! [`Logged::call_deferred`] wraps a method returning a future. The argument
//! line is written immediately; the returned/threw line is written when the
//! future settles, before its output reaches the awaiting caller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::args::Arguments;
use crate::error::Error;
use crate::filter::{FilterTarget, omit_paths};
use crate::options::{ArgSelection, LogOptions};
use crate::registry::{ExclusionRegistry, MethodId};
use crate::sink::Sinks;
use crate::value::{LogValue, Serializer, json_serializer};

// ── LogDecorator ──────────────────────────────────────────────────────────────

/// Process-wide logging setup shared by every method it decorates.
///
/// ```rust
/// use tether::{LogDecorator, LogOptions, MethodId};
///
/// struct Calculator;
///
/// impl Calculator {
///     fn add(&self, a: i64, b: i64) -> i64 { a + b }
/// }
///
/// let log = LogDecorator::new();
/// let add = log.decorate(
///     MethodId::of::<Calculator>("add"),
///     LogOptions::default(),
///     |calc: &Calculator, (a, b): (i64, i64)| calc.add(a, b),
/// );
///
/// // logs "Calculator.add called with args: [2,3]" then "Calculator.add returned: 5"
/// assert_eq!(add.call_infallible(&Calculator, (2, 3)), 5);
/// ```
#[derive(Clone, Debug)]
pub struct LogDecorator {
    shared: Arc<Shared>,
}

struct Shared {
    sinks: Sinks,
    serializer: Serializer,
    registry: Arc<ExclusionRegistry>,
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("sinks", &self.sinks)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl LogDecorator {
    /// `tracing` sinks, JSON serializer, empty registry.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LogDecoratorBuilder {
        LogDecoratorBuilder {
            sinks: Sinks::default(),
            serializer: json_serializer(),
            registry: Arc::new(ExclusionRegistry::new()),
        }
    }

    /// Wraps `func` so every call through the result is logged per `options`.
    ///
    /// `func` receives the receiver (`&Self`, `&mut Self`, `()` for free
    /// functions) and the argument list exactly as the caller passed them.
    pub fn decorate<F>(&self, method: MethodId, options: LogOptions, func: F) -> Logged<F> {
        debug!(method = %method, log_args = ?options.log_args, "decorated");
        Logged {
            func,
            site: Arc::new(CallSite {
                method,
                options,
                shared: Arc::clone(&self.shared),
            }),
        }
    }

}

impl Default for LogDecorator {
    fn default() -> Self { Self::new() }
}

/// Builder for [`LogDecorator`]. Obtain via [`LogDecorator::builder`].
pub struct LogDecoratorBuilder {
    sinks: Sinks,
    serializer: Serializer,
    registry: Arc<ExclusionRegistry>,
}

impl LogDecoratorBuilder {
    pub fn info(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sinks.info = Arc::new(sink);
        self
    }

    pub fn error(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sinks.error = Arc::new(sink);
        self
    }

    pub fn debug(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sinks.debug = Arc::new(sink);
        self
    }

    /// Replaces all three sinks at once.
    pub fn sinks(mut self, sinks: Sinks) -> Self {
        self.sinks = sinks;
        self
    }

    /// Encoder for null, arrays and objects. Primitives never reach it.
    pub fn serializer(
        mut self,
        serializer: impl Fn(&Value) -> Result<String, Error> + Send + Sync + 'static,
    ) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Exclusion metadata. The registry is read-only from here on.
    pub fn registry(mut self, registry: Arc<ExclusionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn build(self) -> LogDecorator {
        LogDecorator {
            shared: Arc::new(Shared {
                sinks: self.sinks,
                serializer: self.serializer,
                registry: self.registry,
            }),
        }
    }
}

// ── Logged ────────────────────────────────────────────────────────────────────

/// A decorated method. Created by [`LogDecorator::decorate`].
///
/// Pick the entry point matching the method's return shape:
///
/// | method returns | call with |
/// |---|---|
/// | `Result<T, E>` | [`call`](Logged::call) |
/// | `T` | [`call_infallible`](Logged::call_infallible) |
/// | `impl Future<Output = Result<T, E>>` | [`call_deferred`](Logged::call_deferred) |
///
/// Arguments and return values must be `Serialize`, and return values owned.
/// Wrap anything without a loggable form in [`Opaque`](crate::Opaque).
#[derive(Clone, Debug)]
pub struct Logged<F> {
    func: F,
    site: Arc<CallSite>,
}

impl<F> Logged<F> {
    pub fn method(&self) -> &MethodId {
        &self.site.method
    }

    pub fn options(&self) -> &LogOptions {
        &self.site.options
    }

    /// Calls a fallible method. `Err` is logged (when enabled) and returned as is.
    pub fn call<R, A, T, E>(&self, receiver: R, args: A) -> Result<T, E>
    where
        F: Fn(R, A) -> Result<T, E>,
        A: Arguments,
        T: Serialize + 'static,
        E: fmt::Display,
    {
        self.site.log_args(&args);
        let result = (self.func)(receiver, args);
        self.site.log_settled(&result);
        result
    }

    /// Calls a method that cannot fail.
    pub fn call_infallible<R, A, T>(&self, receiver: R, args: A) -> T
    where
        F: Fn(R, A) -> T,
        A: Arguments,
        T: Serialize + 'static,
    {
        self.site.log_args(&args);
        let value = (self.func)(receiver, args);
        self.site.log_returned(&value);
        value
    }

    /// Calls a method returning a deferred result.
    ///
    /// The returned future resolves to exactly what the method's future
    /// resolves to. It does not borrow `self`.
    pub fn call_deferred<R, A, Fut, T, E>(
        &self,
        receiver: R,
        args: A,
    ) -> impl Future<Output = Result<T, E>> + use<F, R, A, Fut, T, E>
    where
        F: Fn(R, A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Arguments,
        T: Serialize + 'static,
        E: fmt::Display,
    {
        self.site.log_args(&args);
        let pending = (self.func)(receiver, args);
        let site = Arc::clone(&self.site);
        async move {
            let result = pending.await;
            site.log_settled(&result);
            result
        }
    }
}

// ── CallSite ──────────────────────────────────────────────────────────────────

/// Everything fixed at decoration time.
#[derive(Debug)]
struct CallSite {
    method: MethodId,
    options: LogOptions,
    shared: Arc<Shared>,
}

impl CallSite {
    fn log_args<A: Arguments>(&self, args: &A) {
        if !self.options.log_args.is_enabled() {
            return;
        }
        let rendered = args.to_values().and_then(|values| {
            LogValue::Structured(Value::Array(self.loggable_args(values)))
                .render(&self.shared.serializer)
        });
        let line = match rendered {
            Ok(text) => format!("{} called with args: {text}", self.method),
            Err(e) => {
                self.degraded(&e);
                format!("{} called", self.method)
            }
        };
        (self.shared.sinks.info)(&line);
    }

    fn loggable_args(&self, values: Vec<Value>) -> Vec<Value> {
        let mut indexed: Vec<(usize, Value)> = match &self.options.log_args {
            ArgSelection::Only(indices) => indices
                .iter()
                .filter_map(|&i| values.get(i).map(|value| (i, value.clone())))
                .collect(),
            ArgSelection::All | ArgSelection::Nothing => values.into_iter().enumerate().collect(),
        };

        for filter in self.options.filters_for(FilterTarget::Args) {
            for (_, value) in &mut indexed {
                filter.apply(value);
            }
        }

        if let Some(exclusions) = self.shared.registry.exclusions(&self.method) {
            for (i, value) in &mut indexed {
                omit_paths(value, exclusions.omitted_paths(*i));
            }
            indexed.retain(|(i, _)| !exclusions.is_excluded(*i));
        }

        indexed.into_iter().map(|(_, value)| value).collect()
    }

    fn log_settled<T: Serialize + 'static, E: fmt::Display>(&self, result: &Result<T, E>) {
        match result {
            Ok(value) => self.log_returned(value),
            Err(error) => self.log_threw(error),
        }
    }

    fn log_returned<T: Serialize + 'static>(&self, value: &T) {
        if !self.options.log_return_value {
            return;
        }
        let rendered = LogValue::from_serialize(value).and_then(|value| {
            let value = match value {
                LogValue::Structured(mut json) => {
                    for filter in self.options.filters_for(FilterTarget::ReturnValue) {
                        filter.apply(&mut json);
                    }
                    LogValue::Structured(json)
                }
                other => other,
            };
            value.render(&self.shared.serializer)
        });
        let line = match rendered {
            Ok(text) => format!("{} returned: {text}", self.method),
            Err(e) => {
                self.degraded(&e);
                format!("{} returned", self.method)
            }
        };
        (self.shared.sinks.info)(&line);
    }

    fn log_threw<E: fmt::Display>(&self, error: &E) {
        if !self.options.log_exceptions {
            return;
        }
        let line = match LogValue::from_error(error).render(&self.shared.serializer) {
            Ok(text) => format!("{} threw error: {text}", self.method),
            Err(e) => {
                self.degraded(&e);
                format!("{} threw error", self.method)
            }
        };
        (self.shared.sinks.error)(&line);
    }

    fn degraded(&self, error: &Error) {
        let line = format!("{} log serialization failed: {error}", self.method);
        (self.shared.sinks.debug)(&line);
    }
}
