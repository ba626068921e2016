/// Download support
///
/// Derives the download file name and writes the selected variation
/// to disk as a PNG, re-encoding payloads that arrived in another format.

use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{CodecError, PNG_MEDIA_TYPE};
use crate::state::data::PortableImage;

const DOWNLOAD_PREFIX: &str = "nano-banana-edit-";

/// File name offered in the save dialog for a result derived from `original_name`.
///
/// The last extension is dropped; a name without one is used whole.
pub fn download_file_name(original_name: &str) -> String {
    let base = match original_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => original_name,
    };
    format!("{}{}.png", DOWNLOAD_PREFIX, base)
}

/// PNG bytes for an image, re-encoding when the payload is another format.
pub fn png_bytes(image: &PortableImage) -> Result<Vec<u8>, CodecError> {
    if image.media_type == PNG_MEDIA_TYPE {
        return image.bytes();
    }

    let decoded = image.decode()?;
    let mut buf = Vec::new();
    decoded.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Write an image to `path` as PNG on a blocking task.
pub async fn save_png(path: PathBuf, image: PortableImage) -> Result<PathBuf, CodecError> {
    tokio::task::spawn_blocking(move || save_png_blocking(&path, &image).map(|_| path))
        .await
        .map_err(|e| CodecError::Join(e.to_string()))?
}

fn save_png_blocking(path: &Path, image: &PortableImage) -> Result<(), CodecError> {
    let bytes = png_bytes(image)?;
    std::fs::write(path, &bytes)?;
    info!("💾 Saved {} ({:.1}KB)", path.display(), bytes.len() as f64 / 1024.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::sample_image;
    use image::{DynamicImage, Rgb, RgbImage};

    #[test]
    fn test_download_name_strips_last_extension() {
        assert_eq!(download_file_name("cat.jpg"), "nano-banana-edit-cat.png");
        assert_eq!(
            download_file_name("my.holiday.photo.webp"),
            "nano-banana-edit-my.holiday.photo.png"
        );
    }

    #[test]
    fn test_download_name_without_extension() {
        assert_eq!(download_file_name("scan"), "nano-banana-edit-scan.png");
    }

    #[test]
    fn test_png_bytes_reencodes_jpeg() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([200, 10, 10])));
        let mut jpeg = Vec::new();
        img.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();
        let portable = PortableImage::from_bytes("red.jpg", &jpeg).unwrap();

        let png = png_bytes(&portable).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(download_file_name("photo.png"));

        let written = save_png(path.clone(), sample_image(3, 3)).await.unwrap();
        assert_eq!(written, path);

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 3));
    }
}
