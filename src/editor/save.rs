//! Persisting a picture to disk in a target format.
//!
//! The destination must end up either as the complete new file or untouched,
//! so the encode goes to a temp file in the destination directory first and
//! is atomically renamed into place.

use super::EditError;
use crate::picture::Picture;
use image::ImageFormat;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encodes `picture` to the format implied by `path`'s extension and writes
/// it atomically. Unknown extensions and unwritable destinations fail with
/// `SaveFailed`.
pub fn convert_and_save(picture: &Picture, path: &Path) -> Result<(), EditError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| EditError::SaveFailed(format!("no file extension: {}", path.display())))?;

    let format = ImageFormat::from_extension(ext)
        .ok_or_else(|| EditError::SaveFailed(format!("unsupported format: .{ext}")))?;

    let decoded = picture.decode()?;
    // JPEG has no alpha channel; flatten instead of letting the encoder fail.
    let decoded = if format == ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(decoded.to_rgb8())
    } else {
        decoded
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new(),
    }
    .map_err(|e| EditError::SaveFailed(e.to_string()))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        decoded
            .write_to(&mut writer, format)
            .map_err(|e| EditError::SaveFailed(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| EditError::SaveFailed(e.to_string()))?;
    }

    tmp.persist(path)
        .map_err(|e| EditError::SaveFailed(e.to_string()))?;

    log::info!("[EDIT] Saved {} as {:?}", path.display(), format);
    Ok(())
}
