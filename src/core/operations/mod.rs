pub mod deleter;
pub mod gate;
pub mod generator;
pub mod orchestrator;
