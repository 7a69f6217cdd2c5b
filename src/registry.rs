//! Per-parameter exclusion metadata.
//!
//! The registry is built during setup, before any decorated method runs:
//!
//! ```rust
//! use std::sync::Arc;
//! use tether::{ExclusionRegistry, LogDecorator, MethodId};
//!
//! let login = MethodId::new("AuthController", "login");
//!
//! let mut registry = ExclusionRegistry::new();
//! registry
//!     .exclude(login.clone(), 1)                     // password: never logged
//!     .omit_paths(login.clone(), 0, ["session.token"]);
//!
//! let log = LogDecorator::builder().registry(Arc::new(registry)).build();
//! ```
//!
//! Moving it into an `Arc` freezes it: from then on it is only read.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::filter::KeyPath;

// ── MethodId ──────────────────────────────────────────────────────────────────

/// Stable identity of a decorated method: owning type name plus method name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MethodId {
    type_name: Cow<'static, str>,
    method: Cow<'static, str>,
}

impl MethodId {
    pub fn new(
        type_name: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self { type_name: type_name.into(), method: method.into() }
    }

    /// Uses the short name of `T` (`my_app::UserService` → `UserService`).
    pub fn of<T: ?Sized>(method: impl Into<Cow<'static, str>>) -> Self {
        Self::new(short_type_name::<T>(), method)
    }

    pub fn type_name(&self) -> &str { &self.type_name }
    pub fn method(&self) -> &str { &self.method }
}

/// `Type.method`, the prefix of every log line.
impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.method)
    }
}

pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ── Exclusions ────────────────────────────────────────────────────────────────

/// Exclusion metadata for one method.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Exclusions {
    excluded: Vec<usize>,
    omitted: BTreeMap<usize, Vec<KeyPath>>,
}

impl Exclusions {
    /// Positions never logged. Duplicates are kept; only membership matters.
    pub fn excluded(&self) -> &[usize] { &self.excluded }

    pub fn is_excluded(&self, index: usize) -> bool {
        self.excluded.contains(&index)
    }

    /// Paths redacted from the argument at `index`.
    pub fn omitted_paths(&self, index: usize) -> &[KeyPath] {
        self.omitted.get(&index).map(Vec::as_slice).unwrap_or_default()
    }
}

// ── ExclusionRegistry ─────────────────────────────────────────────────────────

/// Which arguments of which methods must stay out of the logs.
#[derive(Clone, Debug, Default)]
pub struct ExclusionRegistry {
    entries: HashMap<MethodId, Exclusions>,
}

impl ExclusionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never log the argument at `index`.
    pub fn exclude(&mut self, method: MethodId, index: usize) -> &mut Self {
        self.entries.entry(method).or_default().excluded.push(index);
        self
    }

    /// Redact `paths` from the argument at `index`. Replaces earlier paths for
    /// the same position.
    pub fn omit_paths<P: Into<KeyPath>>(
        &mut self,
        method: MethodId,
        index: usize,
        paths: impl IntoIterator<Item = P>,
    ) -> &mut Self {
        let paths = paths.into_iter().map(Into::into).collect();
        self.entries.entry(method).or_default().omitted.insert(index, paths);
        self
    }

    pub fn exclusions(&self, method: &MethodId) -> Option<&Exclusions> {
        self.entries.get(method)
    }

    pub fn is_excluded(&self, method: &MethodId, index: usize) -> bool {
        self.exclusions(method).is_some_and(|e| e.is_excluded(index))
    }

    pub fn omitted_paths(&self, method: &MethodId, index: usize) -> &[KeyPath] {
        self.exclusions(method)
            .map(|e| e.omitted_paths(index))
            .unwrap_or_default()
    }
}
