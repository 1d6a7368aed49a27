use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Every `*.json` file under `root`, recursively, in sorted path order.
pub fn find_timelines(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect(root, &mut found)
        .with_context(|| format!("Could not read source directory {}", root.display()))?;
    found.sort();
    Ok(found)
}

fn collect(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, found)?;
        } else if is_timeline(&path) {
            found.push(path);
        }
    }
    Ok(())
}

fn is_timeline(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
