//! Dominant color extraction.
//!
//! Downscale, then bucket pixels into a coarse RGB histogram (4 bits per
//! channel) and average each bucket. Cheap compared to a proper clustering
//! pass but stable enough for a swatch strip. The session caches the result
//! per loaded image — recomputing on every request is the expensive part.

use image::DynamicImage;
use std::collections::HashMap;

/// Number of swatches returned.
const PALETTE_SIZE: usize = 6;
/// Thumbnail edge used for sampling.
const SAMPLE_EDGE: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PaletteColor {
    pub hex: String,
    pub rgb: [u8; 3],
    /// Sampled pixels that fell into this color's bucket.
    pub population: u32,
}

/// Returns up to six dominant colors, most common first.
pub fn extract_palette(image: &DynamicImage) -> Vec<PaletteColor> {
    let thumb = image.thumbnail(SAMPLE_EDGE, SAMPLE_EDGE).to_rgb8();

    // bucket key -> (count, r sum, g sum, b sum)
    let mut buckets: HashMap<(u8, u8, u8), (u32, u64, u64, u64)> = HashMap::new();
    for pixel in thumb.pixels() {
        let [r, g, b] = pixel.0;
        let key = (r >> 4, g >> 4, b >> 4);
        let entry = buckets.entry(key).or_default();
        entry.0 += 1;
        entry.1 += u64::from(r);
        entry.2 += u64::from(g);
        entry.3 += u64::from(b);
    }

    let mut ranked: Vec<(u32, [u8; 3])> = buckets
        .into_values()
        .map(|(count, r, g, b)| {
            let n = u64::from(count);
            (
                count,
                [(r / n) as u8, (g / n) as u8, (b / n) as u8],
            )
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    ranked
        .into_iter()
        .take(PALETTE_SIZE)
        .map(|(population, rgb)| PaletteColor {
            hex: format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]),
            rgb,
            population,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn solid_image_yields_one_swatch() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([200, 16, 32])));
        let palette = extract_palette(&img);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].rgb, [200, 16, 32]);
        assert_eq!(palette[0].hex, "#c81020");
    }

    #[test]
    fn majority_color_ranks_first() {
        // Left three quarters red, right quarter blue.
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, _| {
            if x < 48 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        }));
        let palette = extract_palette(&img);
        assert!(palette.len() >= 2);
        assert_eq!(palette[0].rgb, [255, 0, 0]);
        assert!(palette[0].population > palette[1].population);
    }

    #[test]
    fn never_returns_more_than_the_swatch_limit() {
        // Noisy gradient hits many buckets.
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, ((x * y) % 256) as u8])
        }));
        assert!(extract_palette(&img).len() <= PALETTE_SIZE);
    }
}
