//! Colored terminal rendering for export results.

use owo_colors::OwoColorize;
use timeline_ics_core::{ExportReport, ExportWarning};

use crate::commands::export::ExportSummary;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for ExportWarning {
    fn render(&self) -> String {
        format!("{} {}", "!".yellow(), self.to_string().dimmed())
    }
}

impl Render for ExportReport {
    fn render(&self) -> String {
        let events = format!("{} {}", self.events.len(), pluralize("event", self.events.len()));
        let mut line = format!("{} {}", "✓".green(), events);

        if self.lookups > 0 {
            line.push_str(&format!(", {} {}", self.lookups, pluralize("lookup", self.lookups)));
        }
        if !self.warnings.is_empty() {
            let warnings = format!("{} {}", self.warnings.len(), pluralize("warning", self.warnings.len()));
            line.push_str(&format!(", {}", warnings.yellow()));
        }

        line
    }
}

impl Render for ExportSummary {
    fn render(&self) -> String {
        let files = format!("{} {}", self.exported, pluralize("file", self.exported));
        let events = format!("{} {}", self.events, pluralize("event", self.events));
        let mut line = format!("Exported {files}, {events}");

        if self.warnings > 0 {
            line.push_str(&format!(
                ", {}",
                format!("{} {}", self.warnings, pluralize("warning", self.warnings)).yellow()
            ));
        }
        if self.failed > 0 {
            line.push_str(&format!(", {}", format!("{} failed", self.failed).red()));
        }
        if self.cancelled {
            line.push_str(&format!(" ({})", "cancelled".red()));
        }

        line
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("event", 1), "event");
        assert_eq!(pluralize("event", 0), "events");
        assert_eq!(pluralize("file", 3), "files");
    }

    #[test]
    fn test_summary_mentions_failures() {
        let summary = ExportSummary {
            exported: 2,
            failed: 1,
            events: 40,
            warnings: 0,
            cancelled: false,
        };
        let line = summary.render();
        assert!(line.starts_with("Exported 2 files, 40 events"), "{line}");
        assert!(line.contains("1 failed"), "{line}");
        assert!(!line.contains("warning"), "{line}");
    }
}
