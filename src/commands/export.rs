use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;
use timeline_ics_core::filename::derive_output_path;
use timeline_ics_core::{ExportConfig, Exporter, TimelineError};
use tokio::sync::watch;
use tracing::info;

use crate::render::Render;
use crate::utils::files::find_timelines;
use crate::utils::tui::export_spinner;

/// Command-line overrides on top of the config file.
#[derive(Debug, Default)]
pub struct ExportOptions {
    pub source: Option<PathBuf>,
    pub dest: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub no_places: bool,
    pub no_activities: bool,
    pub lookup: Option<bool>,
}

impl ExportOptions {
    fn apply(&self, config: &mut ExportConfig) {
        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(dest) = &self.dest {
            config.dest_dir = dest.clone();
        }
        if self.no_places {
            config.export_places = false;
        }
        if self.no_activities {
            config.export_activities = false;
        }
        if let Some(lookup) = self.lookup {
            config.enable_places_api_lookup = lookup;
        }
    }
}

/// Totals across all files of one run.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub exported: usize,
    pub failed: usize,
    pub events: usize,
    pub warnings: usize,
    pub cancelled: bool,
}

pub async fn run(config_path: Option<&Path>, options: ExportOptions) -> Result<()> {
    let mut config = ExportConfig::load(config_path)?;
    options.apply(&mut config);

    if !config.export_places && !config.export_activities {
        anyhow::bail!("Nothing to export: both places and activities are turned off");
    }

    let config = Arc::new(config);
    let source_root = config.source_dir();
    let dest_root = config.dest_dir();

    let sources = match &options.file {
        Some(file) => vec![file.clone()],
        None => find_timelines(&source_root)?,
    };

    if sources.is_empty() {
        println!("No timeline files found in {}", source_root.display());
        return Ok(());
    }

    let exporter = Exporter::from_config(Arc::clone(&config))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("interrupt received; cancelling export");
        let _ = shutdown_tx.send(true);
    });

    let summary = export_all(&exporter, &sources, &source_root, &dest_root, shutdown_rx).await;

    println!();
    println!("{}", summary.render());

    if summary.cancelled {
        anyhow::bail!("Export cancelled");
    }
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} files failed to export",
            summary.failed,
            summary.failed + summary.exported
        );
    }

    Ok(())
}

/// Export files one after another. A failed file is reported and skipped;
/// cancellation stops the run.
async fn export_all(
    exporter: &Exporter,
    sources: &[PathBuf],
    source_root: &Path,
    dest_root: &Path,
    shutdown: watch::Receiver<bool>,
) -> ExportSummary {
    let config = exporter.config();
    let mut summary = ExportSummary::default();

    for source in sources {
        let dest = derive_output_path(
            source,
            source_root,
            dest_root,
            config.export_places,
            config.export_activities,
        );
        let name = source
            .strip_prefix(source_root)
            .unwrap_or(source)
            .display()
            .to_string();

        let spinner = export_spinner(&name);
        let result = exporter.export_file(source, &dest, shutdown.clone()).await;
        spinner.finish_and_clear();

        match result {
            Ok(report) => {
                println!("{} {}", name, report.render());
                for warning in &report.warnings {
                    println!("   {}", warning.render());
                }
                summary.exported += 1;
                summary.events += report.events.len();
                summary.warnings += report.warnings.len();
            }
            Err(TimelineError::Cancelled) => {
                println!("{} {}", name, "cancelled".red());
                summary.cancelled = true;
                break;
            }
            Err(e) => {
                println!("{} {}", name, e.to_string().red());
                summary.failed += 1;
            }
        }
    }

    summary
}
