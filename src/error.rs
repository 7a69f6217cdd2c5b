//! Unified error type.

/// The error type returned by tether's fallible operations.
///
/// A decorated method never sees this type: interception failures degrade to
/// shorter log lines and are reported on the debug sink. `Error` surfaces from
/// serializers and from router assembly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value could not be converted into its structured JSON form.
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An injected serializer rejected a value.
    #[error("serializer: {0}")]
    Serializer(String),

    /// A route path was rejected by the radix tree.
    #[error("invalid route `{path}`: {source}")]
    InvalidRoute {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    /// A controller was handed to assembly without any registered routes or prefix.
    #[error("controller `{0}` has no registered routes")]
    UnregisteredController(&'static str),
}
