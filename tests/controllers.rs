//! Controller route registration and assembly.

use std::sync::Arc;

use http::StatusCode;
use tether::{Controller, Error, Method, Request, Response, RouteRegistry, Router};

struct Users {
    created_id: u32,
}
impl Controller for Users {}

impl Users {
    async fn list(self: Arc<Self>, _: Request) -> Response {
        Response::json(r#"[{"id":"1"}]"#)
    }

    async fn show(self: Arc<Self>, req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("unknown"))
    }

    async fn create(self: Arc<Self>, req: Request) -> Response {
        if req.body().is_empty() {
            return Response::status(StatusCode::BAD_REQUEST);
        }
        Response::builder()
            .status(StatusCode::CREATED)
            .header("location", &format!("/users/{}", self.created_id))
            .no_body()
    }
}

struct Health;
impl Controller for Health {}

async fn liveness(_: Arc<Health>, _: Request) -> &'static str {
    "ok"
}

struct Empty;
impl Controller for Empty {}

struct Forgotten;
impl Controller for Forgotten {}

fn registry() -> RouteRegistry {
    let mut routes = RouteRegistry::new();
    routes
        .controller::<Users>("/users")
        .get("", Users::list)
        .get("/{id}", Users::show)
        .post("/", Users::create);
    routes.route::<Health>(Method::Get, "/healthz", liveness);
    routes.controller::<Empty>("/empty");
    routes
}

fn users() -> Arc<Users> {
    Arc::new(Users { created_id: 99 })
}

fn app(controllers: &[Arc<dyn Controller>]) -> Router {
    registry()
        .routes_for(controllers)
        .unwrap()
        .into_iter()
        .try_fold(Router::new(), Router::merge)
        .unwrap()
}

#[test]
fn single_controller_mounts_under_its_prefix() {
    let routers = registry().routes_for(users()).unwrap();
    assert_eq!(routers.len(), 1);

    let routes: Vec<_> = routers[0].routes().collect();
    assert_eq!(
        routes,
        [
            (Method::Get, "/users"),
            (Method::Get, "/users/{id}"),
            (Method::Post, "/users"),
        ]
    );
}

#[test]
fn list_of_controllers_yields_one_router_each_in_order() {
    let batch: [Arc<dyn Controller>; 3] = [Arc::new(Health), users(), Arc::new(Empty)];
    let routers = registry().routes_for(batch).unwrap();
    assert_eq!(routers.len(), 3);
    // routes declared without a prefix mount at the root
    assert_eq!(routers[0].routes().collect::<Vec<_>>(), [(Method::Get, "/healthz")]);
    assert_eq!(routers[1].routes().count(), 3);
    assert!(routers[2].is_empty(), "a declared controller without routes still assembles");
}

#[test]
fn unknown_controller_is_an_error() {
    let err = registry().routes_for(Arc::new(Forgotten)).err().unwrap();
    assert!(matches!(err, Error::UnregisteredController("Forgotten")));
}

#[test]
fn failed_assembly_leaves_declarations_in_place() {
    let routes = registry();
    let batch: [Arc<dyn Controller>; 2] = [users(), Arc::new(Forgotten)];
    assert!(routes.routes_for(batch).is_err());

    let retry = routes.routes_for(users()).unwrap();
    assert_eq!(retry[0].routes().count(), 3);
}

#[test]
fn conflicting_declarations_fail_at_assembly() {
    let mut routes = RouteRegistry::new();
    routes
        .controller::<Health>("/health")
        .get("/live", liveness)
        .get("/live", liveness);

    let err = routes.routes_for(Arc::new(Health)).err().unwrap();
    assert!(matches!(err, Error::InvalidRoute { ref path, .. } if path == "/health/live"));
}

#[tokio::test]
async fn each_assembly_binds_its_own_instance() {
    let routes = registry();
    let first = routes.routes_for(Arc::new(Users { created_id: 1 })).unwrap().remove(0);
    let second = routes.routes_for(Arc::new(Users { created_id: 2 })).unwrap().remove(0);

    let create = || Request::new(Method::Post, "/users").with_body("{}");
    assert_eq!(first.dispatch(create()).await.header("location"), Some("/users/1"));
    assert_eq!(second.dispatch(create()).await.header("location"), Some("/users/2"));
}

#[tokio::test]
async fn assembled_application_dispatches_requests() {
    let app = app(&[users(), Arc::new(Health)]);

    let res = app.dispatch(Request::new(Method::Get, "/users/42")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(&res.body()[..], b"user 42");

    let res = app.dispatch(Request::new(Method::Get, "/users")).await;
    assert_eq!(res.header("content-type"), Some("application/json"));

    let res = app.dispatch(Request::new(Method::Post, "/users").with_body("{}")).await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(res.header("Location"), Some("/users/99"));

    let res = app.dispatch(Request::new(Method::Post, "/users")).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    let res = app.dispatch(Request::new(Method::Get, "/healthz")).await;
    assert_eq!(&res.body()[..], b"ok");

    let res = app.dispatch(Request::new(Method::Delete, "/users/42")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}
