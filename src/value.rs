//! Loggable values and their textual form.
//!
//! Every value that reaches a log line (the argument array, a return value,
//! an error) is first lifted into a [`LogValue`] and then rendered with
//! [`LogValue::render`]. Primitives render inline; anything structured goes
//! through the injected [`Serializer`].
//!
//! Values with no loggable form are wrapped in [`Opaque`]. The wrapper
//! serializes to a marker object that is stripped again before anything is
//! rendered: a whole opaque value renders as `unknown`, an opaque array element
//! as `null` and an opaque object field is dropped.

use std::any::TypeId;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;

use crate::error::Error;

/// A structured-value encoder: `(value) -> string`.
///
/// Shared across every decorated method of a [`LogDecorator`](crate::LogDecorator),
/// so it must be `Send + Sync`.
pub type Serializer = Arc<dyn Fn(&Value) -> Result<String, Error> + Send + Sync + 'static>;

/// The default encoder: compact JSON (`["a",1]`, `{"foo":"bar"}`).
///
/// `serde_json::Value` is an owned tree, so there is no reference cycle for
/// the encoder to trip over.
pub fn json_serializer() -> Serializer {
    Arc::new(|value: &Value| serde_json::to_string(value).map_err(Error::from))
}

/// A runtime value as seen by the interceptor.
#[derive(Clone, Debug, PartialEq)]
pub enum LogValue {
    /// No value at all (`()` results and missing arguments).
    Undefined,
    /// A failure, logged by its message.
    Error(String),
    /// Anything with a JSON shape: null, booleans, numbers, strings, arrays, objects.
    Structured(Value),
    /// A value with no loggable form.
    Opaque,
}

impl LogValue {
    /// Lifts any `Serialize` value. `()` maps to [`LogValue::Undefined`], a
    /// bare [`Opaque`] to [`LogValue::Opaque`].
    pub fn from_serialize<T: Serialize + ?Sized + 'static>(value: &T) -> Result<Self, Error> {
        // `()` serializes to null; keep the distinction a caller would expect.
        if TypeId::of::<T>() == TypeId::of::<()>() {
            return Ok(Self::Undefined);
        }
        let value = serde_json::to_value(value)?;
        if is_opaque(&value) {
            return Ok(Self::Opaque);
        }
        Ok(Self::Structured(scrubbed(value)))
    }

    /// Lifts a failure by its `Display` message.
    pub fn from_error<E: fmt::Display + ?Sized>(error: &E) -> Self {
        Self::Error(error.to_string())
    }

    /// Renders the value for a log line.
    ///
    /// | value | text |
    /// |---|---|
    /// | undefined | `undefined` |
    /// | error | its message |
    /// | bool | `true` / `false` |
    /// | number | decimal, whole floats without a fraction (`2.0` → `2`) |
    /// | string | itself, unquoted |
    /// | null / array / object | `serializer(value)` |
    /// | opaque | `unknown` |
    ///
    /// Only the serializer can fail; call sites decide how to degrade.
    pub fn render(&self, serializer: &Serializer) -> Result<String, Error> {
        match self {
            Self::Undefined => Ok("undefined".to_owned()),
            Self::Error(message) => Ok(message.clone()),
            Self::Opaque => Ok("unknown".to_owned()),
            Self::Structured(value) => match value {
                Value::Bool(b) => Ok(b.to_string()),
                Value::Number(n) => Ok(match n.as_f64() {
                    Some(f) if n.is_f64() => f.to_string(),
                    _ => n.to_string(),
                }),
                Value::String(s) => Ok(s.clone()),
                Value::Null | Value::Array(_) | Value::Object(_) => serializer(value),
            },
        }
    }
}

/// A value with no loggable form, passed through to the method untouched.
///
/// ```rust
/// use tether::{LogDecorator, LogOptions, MethodId, Opaque};
///
/// struct Socket;
///
/// let log = LogDecorator::new();
/// let send = log.decorate(
///     MethodId::new("Mailer", "send"),
///     LogOptions::default(),
///     |(): (), (_socket, to): (Opaque<&Socket>, &str)| to.len(),
/// );
///
/// // Mailer.send called with args: [null,"bob"]
/// assert_eq!(send.call_infallible((), (Opaque(&Socket), "bob")), 3);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Opaque<T>(pub T);

impl<T> Opaque<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Opaque<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Opaque<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

const OPAQUE_MARKER: &str = "$tether::Opaque";

impl<T> Serialize for Opaque<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(OPAQUE_MARKER, &())?;
        map.end()
    }
}

fn is_opaque(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.len() == 1 && map.contains_key(OPAQUE_MARKER))
}

/// Converts one value for an argument list: opaque parts become `null` or
/// disappear.
pub(crate) fn to_loggable<T: Serialize + ?Sized>(value: &T) -> Result<Value, Error> {
    Ok(scrubbed(serde_json::to_value(value)?))
}

fn scrubbed(mut value: Value) -> Value {
    scrub(&mut value);
    value
}

fn scrub(value: &mut Value) {
    if is_opaque(value) {
        *value = Value::Null;
        return;
    }
    match value {
        Value::Array(items) => items.iter_mut().for_each(scrub),
        Value::Object(map) => {
            map.retain(|_, field| !is_opaque(field));
            map.values_mut().for_each(scrub);
        }
        _ => {}
    }
}

impl From<Value> for LogValue {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}
