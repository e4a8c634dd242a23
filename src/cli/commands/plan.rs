use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::core::errors::SDResult;
use crate::core::operations::orchestrator::ActionOrchestrator;

pub fn run(orchestrator: &ActionOrchestrator, format: OutputFormat) -> SDResult<()> {
    let formatter = OutputFormatter::new(format);
    print!("{}", formatter.format_prompt(&orchestrator.plan()));
    Ok(())
}
