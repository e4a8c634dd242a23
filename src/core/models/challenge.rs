use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A one-time code shown to the operator, valid until the next prompt render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationChallenge {
    pub generated_code: String,
    pub issued_at: DateTime<Utc>,
}

impl ConfirmationChallenge {
    pub fn new(generated_code: impl Into<String>) -> Self {
        Self {
            generated_code: generated_code.into(),
            issued_at: Utc::now(),
        }
    }
}

/// A submission against an issued challenge. `generated_code` is the code the
/// client was shown, echoed back so it can be checked against the one still
/// outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestructionRequest {
    pub submitted_code: String,
    pub generated_code: String,
}

impl DestructionRequest {
    pub fn new(submitted_code: impl Into<String>, generated_code: impl Into<String>) -> Self {
        Self {
            submitted_code: submitted_code.into(),
            generated_code: generated_code.into(),
        }
    }
}
