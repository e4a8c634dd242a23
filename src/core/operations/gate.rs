use subtle::ConstantTimeEq;

pub trait ConfirmationGate: Send + Sync {
    fn validate(&self, submitted: &str, generated: &str) -> bool;
}

/// Byte-exact, case-sensitive match. Either side being empty is a denial.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatchGate;

impl ConfirmationGate for ExactMatchGate {
    fn validate(&self, submitted: &str, generated: &str) -> bool {
        if submitted.is_empty() || generated.is_empty() {
            return false;
        }
        // Lengths leak, contents do not.
        bool::from(submitted.as_bytes().ct_eq(generated.as_bytes()))
    }
}
