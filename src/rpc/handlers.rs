use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::errors::{SDError, SDResult};
use crate::core::models::challenge::DestructionRequest;
use crate::core::models::prompt::PromptView;
use crate::core::operations::gate::{ConfirmationGate, ExactMatchGate};
use crate::core::operations::orchestrator::{ActionOrchestrator, DestructionReport};

// Missing fields deserialize as empty strings, which the gate always denies.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitInput {
    pub generated_code: String,
    pub submitted_code: String,
    pub auth_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckInput {
    pub submitted_code: String,
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub submit_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitOutput {
    pub destroyed: bool,
    #[serde(flatten)]
    pub report: DestructionReport,
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub site: String,
    pub state: String,
}

pub fn challenge(orchestrator: &ActionOrchestrator) -> SDResult<PromptView> {
    orchestrator.render_prompt()
}

/// Per-keystroke check a form client uses to enable its submit control.
/// False when no challenge is outstanding.
pub fn check(orchestrator: &ActionOrchestrator, input: &CheckInput) -> CheckOutput {
    CheckOutput {
        submit_enabled: orchestrator
            .outstanding_prompt()
            .is_some_and(|view| view.submit_enabled(&input.submitted_code)),
    }
}

pub fn status(orchestrator: &ActionOrchestrator) -> StatusOutput {
    StatusOutput {
        site: orchestrator.site().to_string(),
        state: orchestrator.state().as_str().to_string(),
    }
}

/// Checks the caller's token before any confirmation logic runs.
pub async fn submit(
    orchestrator: Arc<ActionOrchestrator>,
    expected_token: &str,
    input: SubmitInput,
) -> SDResult<SubmitOutput> {
    if !ExactMatchGate.validate(&input.auth_token, expected_token) {
        tracing::warn!("Rejected submission with invalid auth token");
        return Err(SDError::Unauthorized);
    }

    let request = DestructionRequest::new(input.submitted_code, input.generated_code);

    let report = tokio::task::spawn_blocking(move || orchestrator.attempt_destruction(&request))
        .await
        .map_err(|e| {
            tracing::error!("Destruction task did not complete: {e}");
            SDError::TaskFailed(e.to_string())
        })??;

    Ok(SubmitOutput {
        destroyed: true,
        report,
    })
}
