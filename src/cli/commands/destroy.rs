use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::core::errors::SDResult;
use crate::core::operations::orchestrator::ActionOrchestrator;
use std::io::{BufRead, Write};

/// Warns, confirms unless `yes`, then destroys. Under JSON output the warning
/// and prompt go to `notice` so `out` carries only the report.
pub fn run(
    orchestrator: &ActionOrchestrator,
    yes: bool,
    format: OutputFormat,
    input: &mut impl BufRead,
    out: &mut impl Write,
    notice: &mut impl Write,
) -> SDResult<()> {
    let confirmed = match format {
        OutputFormat::Human => confirm(orchestrator, yes, input, out)?,
        OutputFormat::Json => confirm(orchestrator, yes, input, notice)?,
    };
    if !confirmed {
        return Ok(());
    }

    let report = orchestrator.attempt_destruction_unconditional()?;
    write!(out, "{}", OutputFormatter::new(format).format_report(&report))?;

    Ok(())
}

fn confirm(
    orchestrator: &ActionOrchestrator,
    yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> SDResult<bool> {
    writeln!(
        out,
        "Warning: This will permanently destroy site {} and its data store:",
        orchestrator.site()
    )?;
    for op in orchestrator.planned_operations() {
        writeln!(out, "  - {op}")?;
    }

    if yes {
        return Ok(true);
    }

    write!(out, "Proceed? [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    let answer = answer.trim().to_lowercase();
    if answer != "y" && answer != "yes" {
        writeln!(out, "Aborted.")?;
        return Ok(false);
    }

    Ok(true)
}
