//! Editor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by every session of a [`SessionManager`](crate::SessionManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Sessions untouched for this many seconds are dropped by `evict_idle`
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,

    /// Undo depth kept per session
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Maximum width of node previews in session info
    #[serde(default = "default_summary_width")]
    pub summary_width: usize,

    /// List heads that introduce bindings for extract-to-let
    #[serde(default = "default_binding_forms")]
    pub binding_forms: Vec<String>,
}

fn default_history_limit() -> usize {
    100
}

fn default_summary_width() -> usize {
    60
}

fn default_binding_forms() -> Vec<String> {
    vec!["let".to_string(), "let*".to_string()]
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: None,
            history_limit: default_history_limit(),
            summary_width: default_summary_width(),
            binding_forms: default_binding_forms(),
        }
    }
}

impl EditorConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn is_binding_form(&self, head: &str) -> bool {
        self.binding_forms.iter().any(|form| form == head)
    }
}
