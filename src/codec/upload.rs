/// Upload ingestion
///
/// Reads a user-chosen file and turns it into a `PortableImage`.
/// Non-image content is rejected before anything reaches the session.

use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{info, warn};

use super::CodecError;
use crate::state::data::PortableImage;

/// File extensions offered by the open dialog
pub const UPLOAD_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Load an uploaded file
///
/// Spawns blocking because reading and base64-encoding large photos is CPU/IO bound.
///
/// # Returns
/// * `Ok(image)` - The file as a portable image
/// * `Err(CodecError::UnsupportedMediaType)` - The file is not a PNG/JPEG/WebP image
pub async fn load_upload(path: PathBuf) -> Result<PortableImage, CodecError> {
    task::spawn_blocking(move || load_upload_blocking(&path))
        .await
        .map_err(|e| CodecError::Join(e.to_string()))?
}

/// Blocking implementation of upload loading
fn load_upload_blocking(path: &Path) -> Result<PortableImage, CodecError> {
    let bytes = std::fs::read(path)?;

    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    match PortableImage::from_bytes(name, &bytes) {
        Ok(image) => {
            info!(
                "📷 Loaded upload {} ({}, {:.1}KB)",
                image.name,
                image.media_type,
                bytes.len() as f64 / 1024.0
            );
            Ok(image)
        }
        Err(e) => {
            warn!("⚠️  Rejected upload {}: {}", path.display(), e);
            Err(e)
        }
    }
}
