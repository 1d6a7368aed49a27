//! Terminal progress for the export command.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown next to a timeline file while its export runs, place
/// lookups included. Clear it before printing the file's result line.
pub fn export_spinner(file: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    // Last tick string is what a finished spinner shows
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/", "✓"])
        .template("{msg} {spinner} {elapsed:.dim}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(file.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
