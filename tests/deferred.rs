//! Decorated methods returning deferred results.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tether::{ExclusionRegistry, LogOptions, MethodId};
use tokio::sync::oneshot;

mod common;

use common::recording_decorator;

#[derive(Clone)]
struct Store {
    delay: Duration,
}

impl Store {
    async fn load(&self, key: String) -> Result<serde_json::Value, String> {
        tokio::time::sleep(self.delay).await;
        if key == "missing" {
            Err(format!("no such key: {key}"))
        } else {
            Ok(json!({"foo": "bar"}))
        }
    }
}

#[tokio::test]
async fn resolved_value_is_logged_after_settlement() {
    let (log, rec) = recording_decorator(ExclusionRegistry::new());
    let (release, gate) = oneshot::channel::<u32>();
    let gate = Arc::new(tokio::sync::Mutex::new(Some(gate)));

    let wait = log.decorate(
        MethodId::new("TestClass", "testMethod"),
        LogOptions::default(),
        move |(): (), (_label,): (&str,)| {
            let gate = Arc::clone(&gate);
            async move {
                let rx = gate.lock().await.take();
                match rx {
                    Some(rx) => rx.await.map_err(|_| "sender dropped"),
                    None => Err("already awaited"),
                }
            }
        },
    );

    let pending = wait.call_deferred((), ("foo",));
    assert_eq!(rec.info(), [r#"TestClass.testMethod called with args: ["foo"]"#]);

    let task = tokio::spawn(pending);
    tokio::task::yield_now().await;
    assert_eq!(rec.info().len(), 1, "nothing is logged before the result settles");

    release.send(7).unwrap();
    assert_eq!(task.await.unwrap(), Ok(7));
    assert_eq!(rec.info()[1], "TestClass.testMethod returned: 7");
}

#[tokio::test]
async fn resolved_object_is_serialized() {
    let (log, rec) = recording_decorator(ExclusionRegistry::new());
    let store = Store { delay: Duration::from_millis(5) };

    let load = log.decorate(
        MethodId::of::<Store>("load"),
        LogOptions::default().without_args(),
        |store: Store, (key,): (String,)| async move { store.load(key).await },
    );

    let value = load.call_deferred(store, ("present".to_owned(),)).await;
    assert_eq!(value, Ok(json!({"foo": "bar"})));
    assert_eq!(rec.info(), [r#"Store.load returned: {"foo":"bar"}"#]);
}

#[tokio::test]
async fn rejection_is_logged_and_still_propagates() {
    let (log, rec) = recording_decorator(ExclusionRegistry::new());
    let store = Store { delay: Duration::ZERO };

    let load = log.decorate(
        MethodId::of::<Store>("load"),
        LogOptions::default(),
        |store: Store, (key,): (String,)| async move { store.load(key).await },
    );

    let result = load.call_deferred(store, ("missing".to_owned(),)).await;
    assert_eq!(result, Err("no such key: missing".to_owned()));
    assert_eq!(rec.info(), [r#"Store.load called with args: ["missing"]"#]);
    assert_eq!(rec.error(), ["Store.load threw error: no such key: missing"]);
}

#[tokio::test]
async fn deferred_taps_respect_options() {
    let (log, rec) = recording_decorator(ExclusionRegistry::new());
    let store = Store { delay: Duration::ZERO };

    let quiet = log.decorate(
        MethodId::of::<Store>("load"),
        LogOptions::default()
            .without_args()
            .with_return_value(false)
            .with_exceptions(false),
        |store: Store, (key,): (String,)| async move { store.load(key).await },
    );

    assert!(quiet.call_deferred(store.clone(), ("present".to_owned(),)).await.is_ok());
    assert!(quiet.call_deferred(store, ("missing".to_owned(),)).await.is_err());
    assert!(rec.all().is_empty());
}

#[tokio::test]
async fn deferred_future_outlives_the_wrapper() {
    let (log, rec) = recording_decorator(ExclusionRegistry::new());
    let pending = {
        let ping = log.decorate(
            MethodId::new("Probe", "ping"),
            LogOptions::default().without_args(),
            |(): (), (): ()| async { Ok::<_, String>("pong") },
        );
        ping.call_deferred((), ())
    };

    assert_eq!(pending.await, Ok("pong"));
    assert_eq!(rec.info(), ["Probe.ping returned: pong"]);
}

#[tokio::test]
async fn rejection_is_logged_when_only_return_values_are_silenced() {
    let (log, rec) = recording_decorator(ExclusionRegistry::new());
    let store = Store { delay: Duration::ZERO };

    let load = log.decorate(
        MethodId::of::<Store>("load"),
        LogOptions::default()
            .without_args()
            .with_return_value(false)
            .with_exceptions(true),
        |store: Store, (key,): (String,)| async move { store.load(key).await },
    );

    assert!(load.call_deferred(store.clone(), ("present".to_owned(),)).await.is_ok());
    assert!(rec.all().is_empty(), "a resolved value is not logged");

    assert!(load.call_deferred(store, ("missing".to_owned(),)).await.is_err());
    assert!(rec.info().is_empty());
    assert_eq!(rec.error(), ["Store.load threw error: no such key: missing"]);
}
