//! CPU rendering of a view for screenshots.
//!
//! The image has one pixel per voxel of the view plane, oriented the way the
//! view shows it on screen. Pan and zoom are not applied.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use nalgebra::Point2;

use crate::annotation::{AnnotationVolume, Layer};
use crate::constants::OVERLAY_ALPHA;
use crate::data::Volume;
use crate::error::Result;
use crate::view::{Channel, TransformChain, ViewController};

/// Apply brightness and contrast to a normalised intensity.
///
/// Contrast scales about mid-grey, brightness shifts; the result is clamped
/// to [0, 1]. Brightness 0 with contrast 1 is the identity.
pub fn adjust(v: f32, brightness: f32, contrast: f32) -> f32 {
    ((v - 0.5) * contrast + 0.5 + brightness).clamp(0.0, 1.0)
}

fn blend(base: [f32; 3], color: [u8; 3], alpha: f32) -> [f32; 3] {
    let mut out = base;
    for (o, &c) in out.iter_mut().zip(color.iter()) {
        *o = *o * (1.0 - alpha) + c as f32 * alpha;
    }
    out
}

/// Compose the view's current slice, colour maps and visible overlays.
///
/// Returns `None` when the slice cannot be extracted (no data, or the
/// cursor lies outside the volume).
pub fn render_view_rgba(
    view: &ViewController,
    fat: &Volume,
    water: &Volume,
    annotations: &AnnotationVolume,
) -> Option<RgbaImage> {
    let images = view.slice_images(fat, water)?;
    let state = view.state();
    let (width, height) = view.binding().plane_dims(view.dims());
    if width == 0 || height == 0 {
        return None;
    }

    let overlays: Vec<_> = Layer::ALL
        .iter()
        .filter(|&&layer| state.layer_visible(layer))
        .filter_map(|&layer| view.overlay_image(layer, annotations).map(|o| (layer.color(), o)))
        .collect();

    // Unit zoom, no pan, one window pixel per voxel
    let chain = TransformChain::new(*view.binding(), view.dims(), (width as u32, height as u32));
    let channels = [Channel::Primary, Channel::Secondary];

    let mut out = RgbaImage::new(width as u32, height as u32);
    for (px, py, pixel) in out.enumerate_pixels_mut() {
        let plane = chain.window_to_voxel(Point2::new(px as f64 + 0.5, py as f64 + 0.5), true);
        let col = (plane.x.floor().max(0.0) as usize).min(width - 1);
        let row = (plane.y.floor().max(0.0) as usize).min(height - 1);

        let mut rgb = [0.0_f32; 3];
        for (image, &channel) in images.iter().zip(channels.iter()) {
            let v = adjust(image[[row, col]], state.brightness(), state.contrast());
            rgb = blend(rgb, state.color_map(channel).lookup(v), state.opacity(channel));
        }
        for (color, overlay) in &overlays {
            if overlay[[row, col]] != 0 {
                rgb = blend(rgb, *color, OVERLAY_ALPHA);
            }
        }

        *pixel = Rgba([
            rgb[0].round() as u8,
            rgb[1].round() as u8,
            rgb[2].round() as u8,
            255,
        ]);
    }
    Some(out)
}

/// Write an image as PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    log::info!("Exported {}x{} image to {:?}", image.width(), image.height(), path);
    Ok(())
}
