//! Typst report generation.
//!
//! Reads a Typst template (either the built-in default or a custom file via
//! `template_path`), resolves all `{{PLACEHOLDER}}` markers by calling
//! helpers from `chart` and `tables`, and writes the final `.typ` file.

pub mod chart;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::AccrueError;
use crate::ports::report_port::{ProjectionReport, ReportPort};

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup.
pub fn resolve(template: &str, report: &ProjectionReport<'_>) -> String {
    let title = match report.preset {
        Some(preset) => format!("Quarterly Projection ({})", preset.name()),
        None => "Quarterly Projection".to_string(),
    };

    template
        .replace("{{TITLE}}", &title)
        .replace("{{PARAMETER_TABLE}}", &tables::render_parameter_table(report))
        .replace(
            "{{SUMMARY_TABLE}}",
            &tables::render_summary_table(report.summary),
        )
        .replace("{{GROWTH_CHART}}", &chart::format_growth_chart(report.states))
        .replace(
            "{{PERIOD_TABLE}}",
            &tables::render_period_table(report.states, report.config.initial_capital),
        )
}

/// Writes `.typ` reports from the default or a user-supplied template.
pub struct TypstReportAdapter {
    template_path: Option<PathBuf>,
}

impl TypstReportAdapter {
    pub fn new(template_path: Option<PathBuf>) -> Self {
        Self { template_path }
    }

    fn load_template(&self) -> Result<String, AccrueError> {
        match &self.template_path {
            Some(path) => fs::read_to_string(path).map_err(|e| AccrueError::Report {
                reason: format!("failed to read template {}: {}", path.display(), e),
            }),
            None => Ok(default_template::template().to_string()),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(&self, report: &ProjectionReport<'_>, output_path: &Path) -> Result<(), AccrueError> {
        let template = self.load_template()?;
        let content = resolve(&template, report);
        fs::write(output_path, content).map_err(|e| AccrueError::Report {
            reason: format!("failed to write report {}: {}", output_path.display(), e),
        })
    }
}
