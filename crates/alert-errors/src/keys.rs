//! Key layout of the alert error store
//!
//! - `failingAlerts` - set of currently failing alert names
//! - `alertsWithErrors` - set of alerts with any recorded history
//! - `errorEvents` - list of alert names, one entry per raw error event
//! - `errors:{name}` - list of JSON event records, most recent first
//!
//! A namespace, when set, is prepended to every key as `{namespace}:`.

const FAILING_ALERTS: &str = "failingAlerts";
const ALERTS_WITH_ERRORS: &str = "alertsWithErrors";
const ERROR_EVENTS: &str = "errorEvents";
const HISTORY_PREFIX: &str = "errors:";

/// Key names owned by one store handle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreKeys {
    prefix: String,
}

impl StoreKeys {
    /// Bare key names, no namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys scoped under `namespace`; an empty namespace means no prefix
    pub fn namespaced(namespace: &str) -> Self {
        let namespace = namespace.trim_end_matches(':');
        if namespace.is_empty() {
            return Self::default();
        }

        Self {
            prefix: format!("{}:", namespace),
        }
    }

    /// Build from an optional namespace (as loaded from configuration)
    pub fn from_namespace(namespace: Option<&str>) -> Self {
        namespace.map(Self::namespaced).unwrap_or_default()
    }

    pub fn failing_alerts(&self) -> String {
        format!("{}{}", self.prefix, FAILING_ALERTS)
    }

    pub fn alerts_with_errors(&self) -> String {
        format!("{}{}", self.prefix, ALERTS_WITH_ERRORS)
    }

    pub fn error_events(&self) -> String {
        format!("{}{}", self.prefix, ERROR_EVENTS)
    }

    /// Per-alert history list
    pub fn history(&self, alert: &str) -> String {
        format!("{}{}{}", self.prefix, HISTORY_PREFIX, alert)
    }
}
