//! Destination names for exported calendars.
//!
//! Pure string work: nothing here touches the filesystem.

use std::path::{Path, PathBuf};

const SOURCE_EXTENSION: &str = ".json";
const OUTPUT_EXTENSION: &str = ".ics";

/// Which entry kinds an export contains, as encoded in the file name.
pub fn discriminator(export_places: bool, export_activities: bool) -> &'static str {
    match (export_places, export_activities) {
        (true, true) => "_all",
        (true, false) => "_places",
        _ => "_activities",
    }
}

/// Map `source_root/…/name.json` to `dest_root/…/name_<kind>.ics`.
///
/// A path outside `source_root` keeps its directory; a name without a
/// `.json` suffix simply gains the `.ics` one.
pub fn derive_name(
    original: &str,
    source_root: &str,
    dest_root: &str,
    export_places: bool,
    export_activities: bool,
) -> String {
    let source_root = trim_separator(source_root);
    let dest_root = trim_separator(dest_root);

    let relocated = match original.strip_prefix(source_root) {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => {
            format!("{dest_root}{rest}")
        }
        _ => original.to_string(),
    };

    let split = relocated.len().saturating_sub(SOURCE_EXTENSION.len());
    let stem = match relocated.get(split..) {
        Some(suffix) if suffix.eq_ignore_ascii_case(SOURCE_EXTENSION) => &relocated[..split],
        _ => relocated.as_str(),
    };

    format!(
        "{stem}{}{OUTPUT_EXTENSION}",
        discriminator(export_places, export_activities)
    )
}

/// [`derive_name`] for paths.
pub fn derive_output_path(
    original: &Path,
    source_root: &Path,
    dest_root: &Path,
    export_places: bool,
    export_activities: bool,
) -> PathBuf {
    PathBuf::from(derive_name(
        &original.to_string_lossy(),
        &source_root.to_string_lossy(),
        &dest_root.to_string_lossy(),
        export_places,
        export_activities,
    ))
}

fn trim_separator(root: &str) -> &str {
    let trimmed = root.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() { root } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_kinds() {
        assert_eq!(
            derive_name("/home/me/data/2020_JANUARY.json", "/home/me/data", "/home/me/out", true, true),
            "/home/me/out/2020_JANUARY_all.ics"
        );
    }

    #[test]
    fn test_places_only() {
        assert_eq!(
            derive_name("/data/2020/2020_JANUARY.json", "/data", "/out", true, false),
            "/out/2020/2020_JANUARY_places.ics"
        );
    }

    #[test]
    fn test_activities_otherwise() {
        assert_eq!(derive_name("/data/a.json", "/data", "/out", false, true), "/out/a_activities.ics");
        assert_eq!(derive_name("/data/a.json", "/data", "/out", false, false), "/out/a_activities.ics");
    }

    #[test]
    fn test_trailing_separators_on_roots() {
        assert_eq!(derive_name("/data/a.json", "/data/", "/out/", true, true), "/out/a_all.ics");
    }

    #[test]
    fn test_prefix_must_end_at_a_separator() {
        assert_eq!(
            derive_name("/database/a.json", "/data", "/out", true, true),
            "/database/a_all.ics"
        );
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(derive_name("/data/A.JSON", "/data", "/out", true, true), "/out/A_all.ics");
        assert_eq!(derive_name("/data/notes", "/data", "/out", true, true), "/out/notes_all.ics");
    }

    #[test]
    fn test_windows_separators() {
        assert_eq!(
            derive_name("C:\\takeout\\2019_MAY.json", "C:\\takeout", "D:\\cal", true, false),
            "D:\\cal\\2019_MAY_places.ics"
        );
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            derive_output_path(Path::new("/data/x.json"), Path::new("/data"), Path::new("/out"), true, true),
            PathBuf::from("/out/x_all.ics")
        );
    }
}
