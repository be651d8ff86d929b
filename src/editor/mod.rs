//! Image editing domain — public API.
//!
//! Every operation takes a `Picture`, decodes it, transforms it with the
//! `image` crate and returns a *new* `Picture`. Nothing in here mutates its
//! input or holds state between calls; the session owns the current image
//! and the undo stack.

mod palette;
mod save;
mod transform;

pub use palette::{extract_palette, PaletteColor};
pub use save::convert_and_save;
pub use transform::{crop, flip, rotate, Rect};

use crate::picture::Picture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One edit request from the frontend, tagged the way the toolbar names it.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditOp {
    RotateLeft,
    RotateRight,
    FlipHorizontal,
    FlipVertical,
    Crop { x: u32, y: u32, w: u32, h: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error(
        "crop rectangle ({},{} {}x{}) exceeds image bounds ({width}x{height})",
        .rect.x, .rect.y, .rect.w, .rect.h
    )]
    InvalidRegion {
        rect: Rect,
        width: u32,
        height: u32,
    },

    #[error("failed to save image: {0}")]
    SaveFailed(String),

    #[error("image codec failed: {0}")]
    Codec(String),
}

impl From<image::ImageError> for EditError {
    fn from(err: image::ImageError) -> Self {
        EditError::Codec(err.to_string())
    }
}

/// Applies exactly one named transformation, producing a new `Picture`.
pub fn apply(picture: &Picture, op: &EditOp) -> Result<Picture, EditError> {
    let decoded = picture.decode()?;
    let edited = match op {
        EditOp::RotateLeft => rotate(&decoded, Direction::Left),
        EditOp::RotateRight => rotate(&decoded, Direction::Right),
        EditOp::FlipHorizontal => flip(&decoded, Axis::Horizontal),
        EditOp::FlipVertical => flip(&decoded, Axis::Vertical),
        EditOp::Crop { x, y, w, h } => crop(
            &decoded,
            Rect {
                x: *x,
                y: *y,
                w: *w,
                h: *h,
            },
        )?,
    };
    Ok(Picture::from_dynamic(&edited)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    fn picture(w: u32, h: u32) -> Picture {
        Picture::from_dynamic(&DynamicImage::ImageRgba8(RgbaImage::new(w, h))).unwrap()
    }

    #[test]
    fn apply_rotate_swaps_dimensions() {
        let out = apply(&picture(100, 50), &EditOp::RotateRight).unwrap();
        let decoded = out.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 100));
    }

    #[test]
    fn apply_surfaces_codec_failure_as_typed_error() {
        let corrupt = Picture::from_encoded(vec![0, 1, 2, 3], "image/png");
        assert!(matches!(
            apply(&corrupt, &EditOp::FlipVertical),
            Err(EditError::Codec(_))
        ));
    }

    #[test]
    fn apply_crop_rejects_bad_region() {
        let result = apply(
            &picture(10, 10),
            &EditOp::Crop {
                x: 8,
                y: 8,
                w: 5,
                h: 5,
            },
        );
        assert!(matches!(result, Err(EditError::InvalidRegion { .. })));
    }

    #[test]
    fn edit_op_deserializes_from_frontend_tags() {
        let op: EditOp = serde_json::from_str(r#"{"op":"rotateLeft"}"#).unwrap();
        assert!(matches!(op, EditOp::RotateLeft));
        let op: EditOp =
            serde_json::from_str(r#"{"op":"crop","x":1,"y":2,"w":3,"h":4}"#).unwrap();
        assert!(matches!(op, EditOp::Crop { w: 3, h: 4, .. }));
    }
}
