//! Pure raster transformations — functional core, no I/O.

use super::{Axis, Direction, EditError};
use image::DynamicImage;

/// Crop rectangle in pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Rotates by 90 degrees. Right-then-left restores the original
/// orientation and dimensions.
pub fn rotate(image: &DynamicImage, direction: Direction) -> DynamicImage {
    match direction {
        Direction::Right => image.rotate90(),
        Direction::Left => image.rotate270(),
    }
}

/// Mirrors along the given axis. Applying the same flip twice restores the
/// original pixel content.
pub fn flip(image: &DynamicImage, axis: Axis) -> DynamicImage {
    match axis {
        Axis::Horizontal => image.fliph(),
        Axis::Vertical => image.flipv(),
    }
}

/// Extracts a sub-region. The rectangle must be non-empty and fully
/// contained within the image bounds.
pub fn crop(image: &DynamicImage, rect: Rect) -> Result<DynamicImage, EditError> {
    let (width, height) = (image.width(), image.height());

    let out_of_bounds = rect
        .x
        .checked_add(rect.w)
        .map_or(true, |right| right > width)
        || rect
            .y
            .checked_add(rect.h)
            .map_or(true, |bottom| bottom > height);

    if rect.w == 0 || rect.h == 0 || out_of_bounds {
        return Err(EditError::InvalidRegion {
            rect,
            width,
            height,
        });
    }

    Ok(image.crop_imm(rect.x, rect.y, rect.w, rect.h))
}
