use rand::Rng;

pub const DEFAULT_CODE_LENGTH: usize = 5;
pub const MAX_CODE_LENGTH: usize = 32;

const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub trait CodeGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

/// Draws every character from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..length.max(1))
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
pub(crate) struct FixedCodeGenerator(pub &'static str);

#[cfg(test)]
impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self, _length: usize) -> String {
        self.0.to_string()
    }
}
