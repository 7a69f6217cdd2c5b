//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Besides the trees the
//! router keeps its registrations in order, which is what lets a controller's
//! router be re-mounted under a prefix ([`Router::nest`]) and several
//! controller routers be combined into one application ([`Router::merge`]).

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{Endpoint, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup. Each [`Router::on`] call returns `self` so
/// registrations chain naturally:
///
/// ```rust
/// # use tether::{Method, Request, Response, Router};
/// # async fn get_user(_: Request) -> Response { Response::text("") }
/// # async fn create_user(_: Request) -> Response { Response::text("") }
/// let users = Router::new()
///     .get("/{id}", get_user)
///     .on(Method::Post, "/", create_user);
///
/// let app = Router::new().nest("/users", users).unwrap();
/// assert_eq!(app.routes().count(), 2);
/// ```
#[derive(Default)]
pub struct Router {
    trees: HashMap<Method, MatchitRouter<Endpoint>>,
    routes: Vec<Route>,
}

struct Route {
    method: Method,
    path: String,
    endpoint: Endpoint,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax. An empty path registers `/`.
    ///
    /// # Panics
    ///
    /// Panics if the path is malformed or conflicts with an existing route.
    /// Routes are declared at startup; a bad one is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        if let Err(e) = self.insert(method, &join_path("", path), handler.into_endpoint()) {
            panic!("{e}");
        }
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Mounts every route of `router` under `prefix`.
    pub fn nest(mut self, prefix: &str, router: Router) -> Result<Self, Error> {
        for route in router.routes {
            self.insert(route.method, &join_path(prefix, &route.path), route.endpoint)?;
        }
        Ok(self)
    }

    /// Mounts every route of `router` as is.
    pub fn merge(self, router: Router) -> Result<Self, Error> {
        self.nest("", router)
    }

    /// Registered `(method, path)` pairs, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (Method, &str)> {
        self.routes.iter().map(|r| (r.method, r.path.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes one request. Unmatched requests get `404 Not Found`.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Some((endpoint, params)) => {
                req.set_params(params);
                endpoint(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }

    pub(crate) fn insert(&mut self, method: Method, path: &str, endpoint: Endpoint) -> Result<(), Error> {
        self.trees
            .entry(method)
            .or_default()
            .insert(path, Arc::clone(&endpoint))
            .map_err(|source| Error::InvalidRoute { path: path.to_owned(), source })?;
        self.routes.push(Route { method, path: path.to_owned(), endpoint });
        Ok(())
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(Endpoint, HashMap<String, String>)> {
        let tree = self.trees.get(&method)?;
        let matched = tree.at(path).ok()?;
        let endpoint = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((endpoint, params))
    }
}

/// Joins a mount prefix and a route path into one absolute path.
///
/// `("/users", "/{id}")` → `/users/{id}`, `("/users", "")` → `/users`,
/// `("", "")` → `/`.
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    let mut joined = String::with_capacity(prefix.len() + path.len() + 2);
    if !prefix.is_empty() {
        if !prefix.starts_with('/') {
            joined.push('/');
        }
        joined.push_str(prefix);
    }
    if !path.is_empty() || joined.is_empty() {
        joined.push('/');
        joined.push_str(path);
    }
    joined
}
