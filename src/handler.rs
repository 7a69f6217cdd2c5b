//! Route handlers.
//!
//! Two handler shapes reach a router:
//!
//! ```text
//! async fn ready(req: Request) -> impl IntoResponse                 Handler, on a Router
//! async fn show(users: Arc<Users>, req: Request) -> impl IntoResponse   Action<Users>, in a RouteRegistry
//! ```
//!
//! A plain [`Handler`] becomes an [`Endpoint`] as soon as it is registered.
//! A controller [`Action`] stays unbound until assembly, when it is paired
//! with the controller instance passed to
//! [`RouteRegistry::routes_for`](crate::RouteRegistry::routes_for) and becomes
//! an endpoint calling that instance.
//!
//! Endpoints are `Arc`-shared so that nesting a router under a prefix
//! re-registers the same endpoint without cloning the handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A handler ready to serve requests.
#[doc(hidden)]
pub type Endpoint = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync + 'static>;

/// A free function serving a route: `async fn(Request) -> impl IntoResponse`.
pub trait Handler: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_endpoint(self) -> Endpoint;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_endpoint(self) -> Endpoint {
        Arc::new(move |req: Request| respond(self(req)))
    }
}

/// A controller method serving a route.
///
/// The controller instance is the receiver:
/// `async fn(Arc<C>, Request) -> impl IntoResponse`.
pub trait Action<C>: Send + Sync + 'static {
    #[doc(hidden)]
    fn invoke(&self, controller: Arc<C>, req: Request) -> BoxFuture;
}

impl<C, F, Fut, R> Action<C> for F
where
    F: Fn(Arc<C>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn invoke(&self, controller: Arc<C>, req: Request) -> BoxFuture {
        respond(self(controller, req))
    }
}

/// Pairs an action with the instance it runs on.
pub(crate) fn bind<C, A>(action: Arc<A>, controller: Arc<C>) -> Endpoint
where
    C: Send + Sync + 'static,
    A: Action<C>,
{
    Arc::new(move |req: Request| action.invoke(Arc::clone(&controller), req))
}

fn respond<Fut, R>(fut: Fut) -> BoxFuture
where
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    Box::pin(async move { fut.await.into_response() })
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::method::Method;

    struct Counter {
        start: u32,
    }

    async fn current(counter: Arc<Counter>, _: Request) -> String {
        counter.start.to_string()
    }

    #[tokio::test]
    async fn bound_action_sees_its_instance() {
        let action = Arc::new(current);
        let first = bind(Arc::clone(&action), Arc::new(Counter { start: 1 }));
        let second = bind(action, Arc::new(Counter { start: 2 }));

        let res = first(Request::new(Method::Get, "/")).await;
        assert_eq!(&res.body()[..], b"1");
        let res = second(Request::new(Method::Get, "/")).await;
        assert_eq!(&res.body()[..], b"2");
    }

    #[tokio::test]
    async fn plain_handler_converts_its_output() {
        async fn gone(_: Request) -> StatusCode { StatusCode::GONE }

        let endpoint = gone.into_endpoint();
        let res = endpoint(Request::new(Method::Get, "/")).await;
        assert_eq!(res.status_code(), StatusCode::GONE);
    }
}
