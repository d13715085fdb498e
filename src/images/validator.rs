use anyhow::{Result, anyhow};
use image::{ImageFormat, ImageReader};
use log::{debug, warn};
use std::fs;
use std::path::Path;

// @module: Image cache validation

/// Open, identify and fully decode an image file
///
/// Returns the detected format. A full decode is the integrity check: a
/// truncated or corrupted file fails here even when its header is intact.
pub fn inspect(path: &Path) -> Result<ImageFormat> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| anyhow!("unrecognized image format"))?;
    reader.decode()?;
    Ok(format)
}

/// Whether `path` holds a usable image; invalid files are deleted
///
/// Never fails: any error while opening or decoding counts as invalid. Calling
/// it on a missing path returns false and does nothing.
pub fn is_valid(path: &Path) -> bool {
    match inspect(path) {
        Ok(_) => true,
        Err(e) => {
            if !path.exists() {
                debug!("No image at {:?}", path);
                return false;
            }

            warn!("Error validating image {:?}: {}", path, e);
            if let Err(rm) = fs::remove_file(path) {
                warn!("Could not remove invalid image {:?}: {}", path, rm);
            }
            false
        }
    }
}
