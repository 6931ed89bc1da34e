//! Output and reporting of batch results.

use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::error::Result;
use crate::loader::{FileLoadResult, LoadResults, LoadStatus};

/// Renders [`LoadResults`] in the selected format
pub struct Output {
    format: OutputFormat,
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbosity: VerbosityLevel) -> Self {
        Self {
            format,
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn render(&self, results: &LoadResults) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(self.format_results(results)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
            OutputFormat::Summary => Ok(self.format_summary(results)),
        }
    }

    pub fn format_results(&self, results: &LoadResults) -> String {
        let mut output = String::new();

        match self.verbosity {
            VerbosityLevel::Quiet => {
                for file_result in &results.file_results {
                    if !file_result.status.is_loaded() && !file_result.status.is_skipped() {
                        output.push_str(&self.format_file_result(file_result));
                        output.push('\n');
                    }
                }
            }
            VerbosityLevel::Normal | VerbosityLevel::Verbose | VerbosityLevel::Debug => {
                for file_result in &results.file_results {
                    output.push_str(&self.format_file_result(file_result));
                    output.push('\n');
                }
                output.push('\n');
                output.push_str(&self.format_summary(results));
            }
        }

        output
    }

    pub fn format_file_result(&self, result: &FileLoadResult) -> String {
        let path_display = result.path.display();
        let duration_str = format_duration(result.duration);

        match &result.status {
            LoadStatus::Loaded => {
                let mut output = format!(
                    "{}  {} ({})",
                    self.colorize("✓ LOADED", "32"),
                    path_display,
                    duration_str
                );
                if self.verbosity >= VerbosityLevel::Verbose
                    && let Some(message) = &result.message
                {
                    output.push_str(&format!(
                        "\n    robot: {}, sensors: {}, parameters: {}",
                        message.name.as_deref().unwrap_or("<unnamed>"),
                        message.sensors.len(),
                        message.parameters.len()
                    ));
                }
                output
            }
            LoadStatus::Invalid { message } => {
                format!(
                    "{}  {} ({}) - {}",
                    self.colorize("✗ INVALID", "31"),
                    path_display,
                    duration_str,
                    message
                )
            }
            LoadStatus::Error { message } => {
                format!(
                    "{}  {} ({}) - {}",
                    self.colorize("⚠ ERROR", "33"),
                    path_display,
                    duration_str,
                    message
                )
            }
            LoadStatus::Skipped { reason } => {
                format!(
                    "{}  {} - {}",
                    self.colorize("- SKIPPED", "36"),
                    path_display,
                    reason
                )
            }
        }
    }

    pub fn format_summary(&self, results: &LoadResults) -> String {
        let mut output = String::new();
        output.push_str("Load Summary:\n");
        output.push_str(&format!("  Total files: {}\n", results.total));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Loaded:", "32"),
            results.loaded
        ));

        if results.failed > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Failed:", "31"),
                results.failed
            ));
        }
        if results.skipped > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Skipped:", "36"),
                results.skipped
            ));
        }

        output.push_str(&format!("  Success rate: {:.1}%\n", results.success_rate()));
        output.push_str(&format!("  Duration: {}\n", format_duration(results.duration)));
        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
