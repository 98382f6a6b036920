//! Key bitmap rendering: icon scaling, compositing and label overlay.
//!
//! [`KeyRenderer`] is the seam the page controller draws through; the
//! production implementation decodes the icon with the `image` crate and
//! rasterizes the label with `ab_glyph`/`imageproc`. The device layer
//! converts the returned bitmap to the deck's native key format.

use crate::error::{Error, Result};
use ab_glyph::{FontVec, PxScale};
use image::{imageops, DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fs;
use std::path::{Path, PathBuf};

/// Font file expected inside the assets root.
pub const FONT_FILE: &str = "Roboto-Regular.ttf";

/// Label point size.
const LABEL_SCALE: f32 = 14.0;

/// Bottom margin reserved for the label, in pixels.
const LABEL_MARGIN: u32 = 20;

/// Gap between the label baseline and the bottom edge, in pixels.
const LABEL_BOTTOM_GAP: u32 = 5;

/// Renders one key's bitmap from an icon path and a label.
pub trait KeyRenderer: Send {
    /// Produce a `size`-sized bitmap for the given icon and label.
    fn render(&mut self, icon: &Path, label: &str, size: (u32, u32)) -> Result<DynamicImage>;
}

/// Production renderer: scaled icon over a black canvas, white label near the
/// bottom edge. The font loads lazily from the assets root on the first
/// labeled render and is cached after that.
pub struct IconLabelRenderer {
    font_path: PathBuf,
    font: Option<FontVec>,
}

impl IconLabelRenderer {
    pub fn new(assets_root: &Path) -> Self {
        Self {
            font_path: assets_root.join(FONT_FILE),
            font: None,
        }
    }

    fn font(&mut self) -> Result<&FontVec> {
        if self.font.is_none() {
            let bytes = fs::read(&self.font_path).map_err(|e| Error::AssetLoadFailed {
                path: self.font_path.clone(),
                reason: e.to_string(),
            })?;
            let font = FontVec::try_from_vec(bytes).map_err(|e| Error::AssetLoadFailed {
                path: self.font_path.clone(),
                reason: e.to_string(),
            })?;
            self.font = Some(font);
        }
        Ok(self.font.as_ref().unwrap())
    }
}

impl KeyRenderer for IconLabelRenderer {
    fn render(&mut self, icon: &Path, label: &str, size: (u32, u32)) -> Result<DynamicImage> {
        let (width, height) = size;
        let source = image::open(icon).map_err(|e| Error::AssetLoadFailed {
            path: icon.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Leave room at the bottom for the label, if there is one.
        let margin = if label.is_empty() { 0 } else { LABEL_MARGIN };
        let avail = (width, height.saturating_sub(margin));

        let (icon_w, icon_h) = fit_within((source.width(), source.height()), avail);
        let scaled = source
            .resize_exact(icon_w, icon_h, imageops::FilterType::Lanczos3)
            .to_rgb8();

        let mut canvas = RgbImage::new(width, height);
        let x = (width.saturating_sub(icon_w)) / 2;
        let y = (avail.1.saturating_sub(icon_h)) / 2;
        imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);

        if !label.is_empty() {
            let scale = PxScale::from(LABEL_SCALE);
            let font = self.font()?;
            let (text_w, text_h) = text_size(scale, font, label);
            let x = width.saturating_sub(text_w) / 2;
            let y = height
                .saturating_sub(LABEL_BOTTOM_GAP)
                .saturating_sub(text_h);
            draw_text_mut(
                &mut canvas,
                Rgb([255u8, 255, 255]),
                x as i32,
                y as i32,
                scale,
                font,
                label,
            );
        }

        Ok(DynamicImage::ImageRgb8(canvas))
    }
}

/// Largest (w, h) preserving `source`'s aspect ratio that fits in `bounds`.
fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = source;
    let (bw, bh) = bounds;
    if sw == 0 || sh == 0 || bw == 0 || bh == 0 {
        return (1, 1);
    }
    // Pick the tighter of the two scale factors.
    if sw as u64 * bh as u64 >= sh as u64 * bw as u64 {
        let h = ((sh as u64 * bw as u64) / sw as u64).max(1) as u32;
        (bw, h)
    } else {
        let w = ((sw as u64 * bh as u64) / sh as u64).max(1) as u32;
        (w, bh)
    }
}
