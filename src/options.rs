//! Per-method logging options.
//!
//! Options are resolved once, when a method is decorated. Every field has a
//! default, and user-supplied fields replace defaults wholesale (a shallow
//! merge): supplying `keyFilters` replaces the empty default list, supplying
//! `logArgs` replaces `true`.
//!
//! The wire form matches the host framework's option objects:
//!
//! ```rust
//! use tether::{ArgSelection, LogOptions};
//!
//! let options: LogOptions = serde_json::from_str(r#"{"logArgs": [0, 2]}"#).unwrap();
//! assert_eq!(options.log_args, ArgSelection::Only(vec![0, 2]));
//! assert!(options.log_return_value);
//! ```

use serde::{Deserialize, Serialize};

use crate::filter::{FilterTarget, KeyFilter};

/// Which positional arguments appear in the "called with args" line.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "ArgSelectionRepr", into = "ArgSelectionRepr")]
pub enum ArgSelection {
    /// Log every argument.
    #[default]
    All,
    /// Emit no argument line at all.
    Nothing,
    /// Log only these original positions, in this order.
    Only(Vec<usize>),
}

impl ArgSelection {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Nothing)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ArgSelectionRepr {
    Flag(bool),
    Indices(Vec<usize>),
}

impl From<ArgSelectionRepr> for ArgSelection {
    fn from(repr: ArgSelectionRepr) -> Self {
        match repr {
            ArgSelectionRepr::Flag(true) => Self::All,
            ArgSelectionRepr::Flag(false) => Self::Nothing,
            ArgSelectionRepr::Indices(indices) => Self::Only(indices),
        }
    }
}

impl From<ArgSelection> for ArgSelectionRepr {
    fn from(selection: ArgSelection) -> Self {
        match selection {
            ArgSelection::All => Self::Flag(true),
            ArgSelection::Nothing => Self::Flag(false),
            ArgSelection::Only(indices) => Self::Indices(indices),
        }
    }
}

impl From<bool> for ArgSelection {
    fn from(enabled: bool) -> Self {
        if enabled { Self::All } else { Self::Nothing }
    }
}

/// Logging configuration for one decorated method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogOptions {
    pub log_args: ArgSelection,
    pub log_return_value: bool,
    pub log_exceptions: bool,
    pub key_filters: Vec<KeyFilter>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_args: ArgSelection::All,
            log_return_value: true,
            log_exceptions: true,
            key_filters: Vec::new(),
        }
    }
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args(mut self, selection: impl Into<ArgSelection>) -> Self {
        self.log_args = selection.into();
        self
    }

    /// Log only the arguments at these original positions.
    pub fn only_args(self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.with_args(ArgSelection::Only(indices.into_iter().collect()))
    }

    pub fn without_args(self) -> Self {
        self.with_args(ArgSelection::Nothing)
    }

    pub fn with_return_value(mut self, enabled: bool) -> Self {
        self.log_return_value = enabled;
        self
    }

    pub fn with_exceptions(mut self, enabled: bool) -> Self {
        self.log_exceptions = enabled;
        self
    }

    pub fn with_key_filter(mut self, filter: KeyFilter) -> Self {
        self.key_filters.push(filter);
        self
    }

    /// Filters for `target`, in declaration order.
    pub(crate) fn filters_for(&self, target: FilterTarget) -> impl Iterator<Item = &KeyFilter> {
        self.key_filters.iter().filter(move |f| f.target == target)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::filter::FilterAction;

    #[test]
    fn defaults_log_everything() {
        let options = LogOptions::default();
        assert_eq!(options.log_args, ArgSelection::All);
        assert!(options.log_return_value);
        assert!(options.log_exceptions);
        assert!(options.key_filters.is_empty());
    }

    #[test]
    fn partial_options_merge_over_defaults() {
        let options: LogOptions = serde_json::from_value(json!({"logReturnValue": false})).unwrap();
        assert_eq!(options, LogOptions::default().with_return_value(false));
    }

    #[test]
    fn log_args_accepts_bool_or_indices() {
        let off: LogOptions = serde_json::from_value(json!({"logArgs": false})).unwrap();
        assert_eq!(off.log_args, ArgSelection::Nothing);
        assert!(!off.log_args.is_enabled());

        let some: LogOptions = serde_json::from_value(json!({"logArgs": [3, 1]})).unwrap();
        assert_eq!(some.log_args, ArgSelection::Only(vec![3, 1]));
        assert_eq!(serde_json::to_value(&some).unwrap()["logArgs"], json!([3, 1]));
    }

    #[test]
    fn key_filters_keep_declaration_order() {
        let options: LogOptions = serde_json::from_value(json!({
            "keyFilters": [
                {"target": "args", "filterAction": "omit", "paths": ["a"]},
                {"target": "returnValue", "filterAction": "pick", "paths": ["b"]},
                {"target": "args", "filterAction": "pick", "paths": ["c"]},
            ]
        }))
        .unwrap();

        let actions: Vec<_> = options
            .filters_for(FilterTarget::Args)
            .map(|f| f.filter_action)
            .collect();
        assert_eq!(actions, [FilterAction::Omit, FilterAction::Pick]);
    }
}
