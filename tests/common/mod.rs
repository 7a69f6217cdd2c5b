//! Shared utilities for integration tests.

use std::sync::{Arc, Mutex};

use tether::{ExclusionRegistry, LogDecorator};

/// Captures every line written to each sink.
#[derive(Clone, Default)]
pub struct Recorder {
    pub info: Arc<Mutex<Vec<String>>>,
    pub error: Arc<Mutex<Vec<String>>>,
    pub debug: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn info(&self) -> Vec<String> {
        self.info.lock().unwrap().clone()
    }

    pub fn error(&self) -> Vec<String> {
        self.error.lock().unwrap().clone()
    }

    pub fn debug(&self) -> Vec<String> {
        self.debug.lock().unwrap().clone()
    }

    /// Every captured line, across sinks.
    pub fn all(&self) -> Vec<String> {
        let mut lines = self.info();
        lines.extend(self.error());
        lines.extend(self.debug());
        lines
    }
}

/// A decorator writing into a fresh [`Recorder`].
#[allow(dead_code)]
pub fn recording_decorator(registry: ExclusionRegistry) -> (LogDecorator, Recorder) {
    let recorder = Recorder::default();
    let (info, error, debug) = (
        Arc::clone(&recorder.info),
        Arc::clone(&recorder.error),
        Arc::clone(&recorder.debug),
    );
    let decorator = LogDecorator::builder()
        .info(move |line| info.lock().unwrap().push(line.to_owned()))
        .error(move |line| error.lock().unwrap().push(line.to_owned()))
        .debug(move |line| debug.lock().unwrap().push(line.to_owned()))
        .registry(Arc::new(registry))
        .build();
    (decorator, recorder)
}
