//! The canonical in-memory image representation.
//!
//! A `Picture` is the single unit of exchange between intake, the editor,
//! the history stack and the session: encoded bytes plus a content-type tag.
//! Every consumer can decode it with the `image` crate without further
//! metadata. Edits never mutate a `Picture` — they produce a new one, since
//! the history stack and the frontend may still hold the prior value.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    bytes: Vec<u8>,
    mime: String,
}

impl Picture {
    /// Wraps an already-encoded byte buffer. The bytes are not validated
    /// here — decoding is deferred to first use, where a codec failure
    /// surfaces as a typed error.
    pub fn from_encoded(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Encodes a decoded image as PNG. This is how edit results and
    /// screenshot frames become canonical.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self, image::ImageError> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(Self::from_encoded(bytes, "image/png"))
    }

    pub fn decode(&self) -> Result<DynamicImage, image::ImageError> {
        image::load_from_memory(&self.bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Renders the payload the frontend displays: `data:<mime>;base64,...`.
    pub fn data_uri(&self) -> String {
        let encoded = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            &self.bytes,
        );
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn png_round_trip_preserves_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(12, 7));
        let pic = Picture::from_dynamic(&img).unwrap();
        assert_eq!(pic.mime(), "image/png");
        let decoded = pic.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }

    #[test]
    fn data_uri_has_mime_prefix() {
        let pic = Picture::from_encoded(vec![1, 2, 3], "image/jpeg");
        assert!(pic.data_uri().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn garbage_bytes_fail_on_decode_not_construction() {
        let pic = Picture::from_encoded(vec![0xde, 0xad], "image/png");
        assert!(pic.decode().is_err());
    }
}
