pub mod challenge;
pub mod prompt;
pub mod target;
