use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use timeline_ics_core::ExportConfig;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => ExportConfig::config_path()?,
    };

    if path.exists() {
        println!("Config already exists at {}", path.display().dimmed());
        return Ok(());
    }

    ExportConfig::create_default_config(&path)?;
    println!("{} Created {}", "✓".green(), path.display());
    println!("Edit it to point source_dir at your Semantic Location History folder.");

    Ok(())
}
