use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner counting rows read from a source. Hidden when progress is disabled;
/// indicatif also hides it when stderr is not a terminal.
pub fn row_spinner(label: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}: {pos} rows")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.set_message(label.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
