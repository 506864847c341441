//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::Term;
use mlprobe_types::{ColorChoice, RunSummary, ScenarioOutcome, ScenarioReport};
use std::io;

use crate::ops::{HostInfo, OperationResult, PackageStatus};

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::Run(summary) => self.render_summary(summary),
            OperationResult::HostInfo(info) => self.render_host_info(info),
            OperationResult::Status(status) => self.render_status(status),
        }
    }

    fn render_summary(&self, summary: &RunSummary) -> io::Result<()> {
        let mut table = self.new_table();
        table.set_header(vec![
            Cell::new("Scenario").add_attribute(Attribute::Bold),
            Cell::new("Outcome").add_attribute(Attribute::Bold),
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Host").add_attribute(Attribute::Bold),
            Cell::new("Session").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
        ]);

        for report in &summary.reports {
            table.add_row(vec![
                Cell::new(report.kind.to_string()),
                self.outcome_cell(&report.outcome),
                Cell::new(
                    report
                        .package
                        .as_ref()
                        .map_or_else(|| "-".to_string(), ToString::to_string),
                ),
                Cell::new(
                    report
                        .host
                        .as_ref()
                        .map_or_else(|| "-".to_string(), ToString::to_string),
                ),
                Cell::new(report.session_name.as_deref().unwrap_or("-")),
                Cell::new(format!("{}ms", report.duration_ms)),
            ]);
        }

        self.term.write_line(&table.to_string())?;

        for report in &summary.reports {
            self.render_report_details(report)?;
        }

        self.term.write_line(&format!(
            "{} passed, {} failed, {} skipped",
            summary.passed, summary.failed, summary.skipped
        ))
    }

    /// Failure details and skip reasons, command output verbatim
    fn render_report_details(&self, report: &ScenarioReport) -> io::Result<()> {
        if let ScenarioOutcome::Skipped { reason } = &report.outcome {
            self.term
                .write_line(&format!("{}: skipped, {reason}", report.kind))?;
        }
        for (index, failure) in report.failures.iter().enumerate() {
            self.term.write_line(&format!(
                "{} failure {}/{} [{}]",
                report.kind,
                index + 1,
                report.failures.len(),
                failure.label()
            ))?;
            self.term.write_line(&failure.to_string())?;
        }
        Ok(())
    }

    fn render_host_info(&self, info: &HostInfo) -> io::Result<()> {
        let mut table = self.new_table();
        table.add_row(vec![Cell::new("Version"), Cell::new(&info.host.version)]);
        table.add_row(vec![
            Cell::new("Release"),
            Cell::new(info.host.release.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Version pin"),
            Cell::new(info.constraint.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Expected release"),
            Cell::new(info.expected_release.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("no-version scenario"),
            if info.no_version_runs {
                self.colored("runs", Color::Green)
            } else {
                self.colored("skipped", Color::Yellow)
            },
        ]);
        self.term.write_line(&table.to_string())
    }

    fn render_status(&self, status: &PackageStatus) -> io::Result<()> {
        let line = match &status.version {
            Some(version) => format!("{} {version} is installed", status.package),
            None => format!("{} is not installed", status.package),
        };
        self.term.write_line(&line)
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors_enabled() {
            table.force_no_tty();
        }
        table
    }

    fn outcome_cell(&self, outcome: &ScenarioOutcome) -> Cell {
        let color = match outcome {
            ScenarioOutcome::Passed => Color::Green,
            ScenarioOutcome::Failed => Color::Red,
            ScenarioOutcome::Skipped { .. } => Color::Yellow,
        };
        self.colored(&outcome.to_string(), color)
    }

    fn colored(&self, text: &str, color: Color) -> Cell {
        let cell = Cell::new(text);
        if self.colors_enabled() {
            cell.fg(color)
        } else {
            cell
        }
    }

    fn colors_enabled(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}
