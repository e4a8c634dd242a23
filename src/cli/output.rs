use crate::core::models::prompt::PromptView;
use crate::core::operations::orchestrator::DestructionReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_prompt(&self, view: &PromptView) -> String {
        match self.format {
            OutputFormat::Human => self.format_prompt_human(view),
            OutputFormat::Json => {
                serde_json::to_string_pretty(view).unwrap_or_else(|_| "{}".to_string()) + "\n"
            }
        }
    }

    fn format_prompt_human(&self, view: &PromptView) -> String {
        let mut lines = vec![
            format!("Site: {}", view.site),
            format!("WARNING: {}", view.warning),
            "The following operations will run:".to_string(),
        ];

        for op in &view.operations {
            lines.push(format!("  - {op}"));
        }

        if let Some(code) = &view.code {
            lines.push(String::new());
            lines.push(format!("Enter the security code to confirm: {code}"));
        }

        lines.join("\n") + "\n"
    }

    pub fn format_report(&self, report: &DestructionReport) -> String {
        match self.format {
            OutputFormat::Human => format!(
                "Destroyed site {} (store {}, {} entries removed from {})\n",
                report.site,
                report.store,
                report.entries_removed,
                report.root_path.display()
            ),
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string()) + "\n"
            }
        }
    }
}
