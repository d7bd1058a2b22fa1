use image::{imageops, imageops::FilterType, Rgb, RgbImage};

use super::InferenceError;
use super::detector::BoundingBox;

/// Grey used by the detector's letterbox padding.
const LETTERBOX_FILL: u8 = 114;

/// Decodes any supported format to RGB8. Images with a zero dimension are
/// rejected.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, InferenceError> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(InferenceError::EmptyImage { width, height });
    }
    Ok(image)
}

/// Crops `image` to the pixel-rounded, clamped rectangle of `bbox`. The result
/// is never smaller than 1x1 unless `image` itself has no pixels, in which
/// case it is returned unchanged.
pub fn crop_to_box(image: &RgbImage, bbox: &BoundingBox) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let clamp_axis = |start: f32, end: f32, limit: u32| -> (u32, u32) {
        let lo = (start.round().max(0.0) as u32).min(limit.saturating_sub(1));
        let hi = (end.round().max(0.0) as u32).clamp(lo + 1, limit);
        (lo, hi)
    };
    let (x0, x1) = clamp_axis(bbox.x1, bbox.x2, width);
    let (y0, y1) = clamp_axis(bbox.y1, bbox.y2, height);

    imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image()
}

/// Lays the pixels out channel-first, scaled to [0, 1] then standardised
/// per channel.
fn to_chw(image: &RgbImage, mean: [f32; 3], std: [f32; 3]) -> Vec<f32> {
    let (width, height) = image.dimensions();
    let num_pixels = (width * height) as usize;
    let mut data = vec![0.0f32; 3 * num_pixels];

    for (i, pixel) in image.pixels().enumerate() {
        for channel in 0..3 {
            let value = pixel[channel] as f32 / 255.0;
            data[channel * num_pixels + i] = (value - mean[channel]) / std[channel];
        }
    }

    data
}

/// Classifier input: square bilinear resize then mean/std normalization.
pub fn normalize_chw(image: &RgbImage, size: u32, mean: [f32; 3], std: [f32; 3]) -> Vec<f32> {
    let resized = imageops::resize(image, size, size, FilterType::Triangle);
    to_chw(&resized, mean, std)
}

/// Scale and padding applied by [`letterbox`], needed to map detections back
/// onto the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    pub fn restore(&self, bbox: BoundingBox, width: u32, height: u32) -> BoundingBox {
        let unmap_x = |x: f32| ((x - self.pad_x) / self.scale).clamp(0.0, width as f32);
        let unmap_y = |y: f32| ((y - self.pad_y) / self.scale).clamp(0.0, height as f32);
        BoundingBox {
            x1: unmap_x(bbox.x1),
            y1: unmap_y(bbox.y1),
            x2: unmap_x(bbox.x2),
            y2: unmap_y(bbox.y2),
            ..bbox
        }
    }
}

/// Detector input: aspect-preserving resize into a grey `size`x`size` canvas,
/// values in [0, 1].
pub fn letterbox(image: &RgbImage, size: u32) -> (Vec<f32>, Letterbox) {
    let (width, height) = image.dimensions();
    let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
    let new_width = ((width as f32 * scale).round() as u32).clamp(1, size);
    let new_height = ((height as f32 * scale).round() as u32).clamp(1, size);
    let resized = imageops::resize(image, new_width, new_height, FilterType::Triangle);

    let left = (size - new_width) / 2;
    let top = (size - new_height) / 2;
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([LETTERBOX_FILL; 3]));
    imageops::replace(&mut canvas, &resized, left as i64, top as i64);

    let data = to_chw(&canvas, [0.0; 3], [1.0; 3]);
    (
        data,
        Letterbox {
            scale,
            pad_x: left as f32,
            pad_y: top as f32,
        },
    )
}
