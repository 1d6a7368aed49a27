use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use timeline_ics_core::ExportConfig;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => ExportConfig::config_path()?,
    };
    let config = ExportConfig::load(Some(&path))?;

    println!("{}", "Paths".bold());
    println!(
        "  Config:         {}{}",
        path.display(),
        if path.exists() { "" } else { " (not created yet)" }
    );
    println!("  Source:         {}", config.source_dir().display());
    println!("  Destination:    {}", config.dest_dir().display());
    println!("  Time zones:     {}", config.timezone_data().display());

    println!();
    println!("{}", "Export".bold());
    println!("  Places:         {}", yes_no(config.export_places));
    println!("  Activities:     {}", yes_no(config.export_activities));
    println!("  Ignored types:  {}", list(config.ignored_activity_types.iter().map(|t| t.as_str())));
    println!("  Ignored places: {}", list(config.ignored_place_ids.iter().map(String::as_str)));

    println!();
    println!("{}", "Place lookup".bold());
    let lookup = if config.lookup_enabled() {
        "on".green().to_string()
    } else if config.lookup_missing_key() {
        "off (no API key)".yellow().to_string()
    } else {
        "off".to_string()
    };
    println!("  Enabled:        {lookup}");
    println!("  Concurrency:    {}", config.max_concurrent_lookups);
    println!("  Timeout:        {}s", config.lookup_timeout_secs);

    let mut languages: Vec<_> = config.language_overrides.iter().collect();
    languages.sort();
    for (zone, language) in languages {
        println!("  Language:       {zone} → {language}");
    }

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<_> = items.collect();
    if items.is_empty() {
        "none".dimmed().to_string()
    } else {
        items.join(", ")
    }
}
