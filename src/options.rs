use serde::{Deserialize, Serialize};

/// Settings shared by every page of a compiled model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineOptions {
    /// Where navigation goes when no `next` entry applies.
    pub default_next_path: String,
    /// The page that lists every answer; used in the summary's change links.
    pub summary_path: String,
    pub error_summary_title: String,
    /// Accept state keys that no page declares when validating at summary time.
    pub allow_unknown_state_keys: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_next_path: "/summary".to_string(),
            summary_path: "/summary".to_string(),
            error_summary_title: "Fix the following errors".to_string(),
            allow_unknown_state_keys: false,
        }
    }
}
