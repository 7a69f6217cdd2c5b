//! Controllers with logged service methods.
//!
//! Run with:
//!   RUST_LOG=tether=debug cargo run --example controllers
//!
//! Dispatches a few requests through an application assembled from two
//! controllers. The user lookup is decorated, so every request to `/users`
//! shows up as `UserService.find called with args: ...` followed by
//! `UserService.find returned: ...` or `UserService.find threw error: ...`.

use std::sync::Arc;

use http::{HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use tether::{
    Controller, ExclusionRegistry, LogDecorator, LogOptions, Logged, Method, MethodId, Request,
    Response, RouteRegistry, Router,
};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct User {
    id: u32,
    name: &'static str,
}

struct UserService;

impl UserService {
    fn find(&self, id: u32, _api_key: &str) -> Result<User, String> {
        match id {
            1 => Ok(User { id, name: "alice" }),
            _ => Err(format!("user {id} not found")),
        }
    }
}

type FindUser = fn(&UserService, (u32, &str)) -> Result<User, String>;

fn find_user(svc: &UserService, (id, key): (u32, &str)) -> Result<User, String> {
    svc.find(id, key)
}

struct Users {
    service: UserService,
    find: Logged<FindUser>,
}

impl Controller for Users {}

impl Users {
    fn new(log: &LogDecorator) -> Self {
        Self {
            service: UserService,
            find: log.decorate(
                MethodId::of::<UserService>("find"),
                LogOptions::default(),
                find_user as FindUser,
            ),
        }
    }

    async fn show(self: Arc<Self>, req: Request) -> Response {
        let Some(id) = req.param("id").and_then(|id| id.parse::<u32>().ok()) else {
            return Response::status(StatusCode::BAD_REQUEST);
        };
        let key = req.header("x-api-key").unwrap_or_default();
        match self.find.call(&self.service, (id, key)) {
            Ok(user) => match serde_json::to_vec(&user) {
                Ok(body) => Response::json(body),
                Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
            },
            Err(_) => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

struct Status;

impl Controller for Status {}

impl Status {
    async fn ready(self: Arc<Self>, _: Request) -> &'static str {
        "ready"
    }
}

#[tokio::main]
async fn main() -> Result<(), tether::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // the api key is never logged
    let mut exclusions = ExclusionRegistry::new();
    exclusions.exclude(MethodId::of::<UserService>("find"), 1);
    let log = LogDecorator::builder().registry(Arc::new(exclusions)).build();

    let mut routes = RouteRegistry::new();
    routes.controller::<Users>("/users").get("/{id}", Users::show);
    routes.controller::<Status>("/status").get("/ready", Status::ready);

    let controllers: [Arc<dyn Controller>; 2] = [Arc::new(Users::new(&log)), Arc::new(Status)];
    let app = routes
        .routes_for(controllers)?
        .into_iter()
        .try_fold(Router::new(), Router::merge)?;

    let api_key = HeaderName::from_static("x-api-key");
    for (method, path) in [
        (Method::Get, "/users/1"),
        (Method::Get, "/users/2"),
        (Method::Get, "/status/ready"),
    ] {
        let req = Request::new(method, path)
            .with_header(api_key.clone(), HeaderValue::from_static("demo-secret"));
        let res = app.dispatch(req).await;
        println!("{method} {path} -> {}", res.status_code());
    }

    Ok(())
}
