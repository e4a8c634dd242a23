use crate::core::models::challenge::ConfirmationChallenge;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const WARNING: &str =
    "This will completely and irreversibly delete the site and its data store.";

/// Everything an operator sees before confirming: what will be destroyed and,
/// for interactive confirmation, the code to re-enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptView {
    pub site: String,
    pub warning: String,
    pub operations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
}

impl PromptView {
    pub fn new(
        site: impl Into<String>,
        operations: Vec<String>,
        challenge: Option<&ConfirmationChallenge>,
    ) -> Self {
        Self {
            site: site.into(),
            warning: WARNING.to_string(),
            operations,
            code: challenge.map(|c| c.generated_code.clone()),
            issued_at: challenge.map(|c| c.issued_at),
        }
    }

    /// Whether the submit control should be enabled for `typed`. A
    /// convenience for form clients; submissions still go through the gate.
    pub fn submit_enabled(&self, typed: &str) -> bool {
        self.code.as_deref().is_some_and(|code| code == typed)
    }
}
