use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Base name of `path` with directory and extension removed.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Header document belonging to an image: the same path with `extension`.
pub fn header_path(image: &Path, extension: &str) -> PathBuf {
    image.with_extension(extension)
}

/// Rewrite a Windows image path recorded by the annotator onto a local root.
///
/// `C:\scans\a.mhd` with `C` mapped to `/data` becomes `/data/scans/a.mhd`.
/// Paths whose drive is not mapped, and non-Windows paths, are returned unchanged.
pub fn resolve_image_path(raw: &str, drive_map: &BTreeMap<String, String>) -> PathBuf {
    let mut chars = raw.chars();
    if let (Some(drive), Some(':')) = (chars.next(), chars.next()) {
        if drive.is_ascii_alphabetic() {
            let root = drive_map
                .get(&drive.to_ascii_uppercase().to_string())
                .or_else(|| drive_map.get(&drive.to_ascii_lowercase().to_string()));
            if let Some(root) = root {
                let rest = raw[2..].replace('\\', "/");
                return PathBuf::from(format!(
                    "{}/{}",
                    root.trim_end_matches('/'),
                    rest.trim_start_matches('/')
                ));
            }
        }
    }
    PathBuf::from(raw)
}
