/// Image codec helpers
///
/// This module handles:
/// - Turning uploaded files into portable images (upload.rs)
/// - Parsing and building `data:` URIs
/// - Encoding masks and downloads as PNG (export.rs)

pub mod export;
pub mod upload;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

use crate::state::data::PortableImage;

/// Media type used for masks and downloads
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Errors raised while reading, decoding or encoding images
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Please upload an image file.")]
    UnsupportedMediaType,
    #[error("Malformed data URI")]
    MalformedDataUri,
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    Join(String),
}

/// Split a `data:<type>;base64,<payload>` URI into media type and payload.
pub fn parse_data_uri(uri: &str) -> Result<(&str, &str), CodecError> {
    let rest = uri.strip_prefix("data:").ok_or(CodecError::MalformedDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(CodecError::MalformedDataUri)?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or(CodecError::MalformedDataUri)?;

    if media_type.is_empty() {
        return Err(CodecError::MalformedDataUri);
    }

    Ok((media_type, payload))
}

/// Sniff the content and return its media type if it is an accepted upload format.
///
/// Only PNG, JPEG and WebP are accepted.
pub fn accepted_media_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

impl PortableImage {
    /// Build a portable image from raw file bytes, rejecting non-image content.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, CodecError> {
        let media_type = accepted_media_type(bytes).ok_or(CodecError::UnsupportedMediaType)?;
        Ok(Self::from_base64(name, media_type, &STANDARD.encode(bytes)))
    }

    /// Encode an RGBA buffer as a PNG portable image.
    pub fn from_png(name: impl Into<String>, pixels: &RgbaImage) -> Result<Self, CodecError> {
        let mut buf = Vec::new();
        pixels.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(Self::from_base64(name, PNG_MEDIA_TYPE, &STANDARD.encode(&buf)))
    }

    /// Decoded payload bytes (still in the image's own format).
    pub fn bytes(&self) -> Result<Vec<u8>, CodecError> {
        let (_, payload) = parse_data_uri(&self.encoded_data)?;
        Ok(STANDARD.decode(payload)?)
    }

    /// Decode into pixels.
    pub fn decode(&self) -> Result<DynamicImage, CodecError> {
        let bytes = self.bytes()?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgba;

    /// Small PNG used across the crate's tests
    pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    pub(crate) fn sample_image(width: u32, height: u32) -> PortableImage {
        PortableImage::from_bytes("photo.png", &sample_png(width, height)).unwrap()
    }

    #[test]
    fn test_parse_data_uri() {
        let (media, payload) = parse_data_uri("data:image/jpeg;base64,AAAA").unwrap();
        assert_eq!(media, "image/jpeg");
        assert_eq!(payload, "AAAA");
    }

    #[test]
    fn test_parse_data_uri_rejects_garbage() {
        assert!(parse_data_uri("image/png;base64,AAAA").is_err());
        assert!(parse_data_uri("data:image/png,AAAA").is_err());
        assert!(parse_data_uri("data:;base64,AAAA").is_err());
        assert!(parse_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn test_from_bytes_sniffs_png() {
        let img = PortableImage::from_bytes("x.bin", &sample_png(4, 3)).unwrap();
        assert_eq!(img.media_type, "image/png");
        assert_eq!(img.name, "x.bin");
        assert!(img.encoded_data.starts_with("data:image/png;base64,"));

        let decoded = img.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_from_bytes_rejects_non_image() {
        let result = PortableImage::from_bytes("notes.txt", b"just some text");
        assert!(matches!(result, Err(CodecError::UnsupportedMediaType)));
    }

    #[test]
    fn test_from_bytes_rejects_unaccepted_format() {
        // BMP decodes fine but isn't an accepted upload type
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Bmp)
            .unwrap();

        assert!(matches!(
            PortableImage::from_bytes("a.bmp", &buf),
            Err(CodecError::UnsupportedMediaType)
        ));
    }
}
