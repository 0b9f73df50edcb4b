use colored::*;

use crate::cli::cli_runner::RunOutcome;
use crate::utils::error::ReportError;

/// Formats terminal messages that sit outside the log stream
pub struct OutputFormatter;

impl OutputFormatter {
    /// Format error message for CLI display
    pub fn format_error(error: &ReportError) -> String {
        format!("{} {}", "Error:".red().bold(), error.to_string().red())
    }

    /// Format success message for CLI display
    pub fn format_success(message: &str) -> String {
        format!("{} {}", "Success:".green().bold(), message)
    }

    /// One-line result for stdout, only for runs that produced a report
    pub fn format_outcome(outcome: &RunOutcome) -> Option<String> {
        match outcome {
            RunOutcome::Rendered { path, rows, columns, pages } => Some(Self::format_success(&format!(
                "{} ({} rows, {} columns, {} {})",
                path.display(),
                rows,
                columns,
                pages,
                if *pages == 1 { "page" } else { "pages" }
            ))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_error_mentions_message() {
        colored::control::set_override(false);
        let message = OutputFormatter::format_error(&ReportError::Configuration("bad layout".to_string()));
        assert_eq!(message, "Error: Configuration error: bad layout");
    }

    #[test]
    fn test_format_outcome() {
        colored::control::set_override(false);
        let outcome = RunOutcome::Rendered {
            path: PathBuf::from("out.pdf"),
            rows: 3,
            columns: 2,
            pages: 1,
        };

        assert_eq!(
            OutputFormatter::format_outcome(&outcome).as_deref(),
            Some("Success: out.pdf (3 rows, 2 columns, 1 page)")
        );
        assert!(OutputFormatter::format_outcome(&RunOutcome::NoData).is_none());
    }
}
