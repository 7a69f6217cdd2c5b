//! Key-path filters over structured values.
//!
//! A [`KeyPath`] names a nested field with dotted syntax (`data.secret`,
//! `items.0.token`). A [`KeyFilter`] either omits the named fields or picks
//! only them. Filters touch object-shaped values only; every other value
//! passes through unchanged, and paths that match nothing are no-ops.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── KeyPath ───────────────────────────────────────────────────────────────────

/// A dotted path into a structured value.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn new(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Removes the field at this path, if present.
    pub fn omit(&self, value: &mut Value) {
        let Some((last, parents)) = self.0.split_last() else { return };
        let mut cursor = value;
        for segment in parents {
            cursor = match step_mut(cursor, segment) {
                Some(next) => next,
                None => return,
            };
        }
        if let Value::Object(map) = cursor {
            map.remove(last);
        }
    }

    /// Returns the field at this path, if present.
    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(value, |cursor, segment| match cursor {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Writes `field` at this path inside `target`, creating objects on the way.
    fn insert(&self, target: &mut Map<String, Value>, field: Value) {
        let Some((last, parents)) = self.0.split_last() else { return };
        let mut cursor = target;
        for segment in parents {
            let slot = cursor
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            cursor = match slot {
                Value::Object(map) => map,
                _ => return,
            };
        }
        cursor.insert(last.clone(), field);
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

impl FromStr for KeyPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for KeyPath {
    fn from(s: String) -> Self { Self::new(&s) }
}

impl From<KeyPath> for String {
    fn from(path: KeyPath) -> Self { path.to_string() }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

// ── KeyFilter ─────────────────────────────────────────────────────────────────

/// Which logged value a [`KeyFilter`] applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterTarget {
    Args,
    ReturnValue,
    Exceptions,
}

/// What a [`KeyFilter`] does with its paths.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    /// Keep only the named paths.
    Pick,
    /// Drop the named paths.
    Omit,
}

/// A structural filter applied to logged values before serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFilter {
    pub target: FilterTarget,
    pub filter_action: FilterAction,
    pub paths: Vec<KeyPath>,
}

impl KeyFilter {
    pub fn omit<P: Into<KeyPath>>(target: FilterTarget, paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            target,
            filter_action: FilterAction::Omit,
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn pick<P: Into<KeyPath>>(target: FilterTarget, paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            target,
            filter_action: FilterAction::Pick,
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Applies the filter in place. Non-object values are left alone.
    pub fn apply(&self, value: &mut Value) {
        if !value.is_object() {
            return;
        }
        match self.filter_action {
            FilterAction::Omit => omit_paths(value, &self.paths),
            FilterAction::Pick => {
                let mut picked = Map::new();
                for path in &self.paths {
                    if let Some(field) = path.get(value) {
                        path.insert(&mut picked, field.clone());
                    }
                }
                *value = Value::Object(picked);
            }
        }
    }
}

/// Removes every path from an object-shaped value.
pub fn omit_paths(value: &mut Value, paths: &[KeyPath]) {
    if !value.is_object() {
        return;
    }
    for path in paths {
        path.omit(value);
    }
}
