//! On-disk photo store.
//!
//! Photos are named after the report's coordinates, so two reports at the
//! exact same position share a file and the later one overwrites it.

use std::path::{Path, PathBuf};

use ecoroad_report_models::Coordinates;

/// File extension every stored photo gets.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Returns the file name for a photo taken at `coordinates`.
#[must_use]
pub fn image_file_name(coordinates: Coordinates) -> String {
    format!(
        "{}-{}.{IMAGE_EXTENSION}",
        coordinates.latitude, coordinates.longitude
    )
}

/// Writes `bytes` to `dir`, creating the directory if needed, and returns
/// the written path.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be written.
pub fn write_image(dir: &Path, coordinates: Coordinates, bytes: &[u8]) -> std::io::Result<PathBuf> {
    crate::paths::ensure_dir(dir)?;
    let path = dir.join(image_file_name(coordinates));
    std::fs::write(&path, bytes)?;
    log::debug!("Wrote {} byte image to {}", bytes.len(), path.display());
    Ok(path)
}
