//! Image decoding, centre-cropping and resampling.
//!
//! Decoding failures are not errors here: `decode` returns `None` and the
//! caller reports the image as skipped.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageResult};
use tracing::debug;

/// Formats probed explicitly when signature sniffing fails.
const FALLBACK_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
];

/// Decodes `bytes` into a bitmap, or `None` if no supported decoder accepts them.
pub fn decode(bytes: &[u8]) -> Option<DynamicImage> {
    if bytes.is_empty() {
        return None;
    }
    match image::load_from_memory(bytes) {
        Ok(img) => Some(img),
        Err(e) => {
            debug!(error = %e, "Format sniffing failed, probing decoders one by one");
            FALLBACK_FORMATS
                .iter()
                .find_map(|&format| image::load_from_memory_with_format(bytes, format).ok())
        }
    }
}

/// Centre-crops `img` to `aspect` (width / height). Crop sides never drop below 1px.
pub fn crop_to_aspect(img: &DynamicImage, aspect: f32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 || !aspect.is_finite() || aspect <= 0.0 {
        return img.clone();
    }

    let source = width as f32 / height as f32;
    let (crop_w, crop_h) = if source > aspect {
        let w = (height as f32 * aspect).round() as u32;
        (w.clamp(1, width), height)
    } else if source < aspect {
        let h = (width as f32 / aspect).round() as u32;
        (width, h.clamp(1, height))
    } else {
        return img.clone();
    };

    let x = (width - crop_w) / 2;
    let y = (height - crop_h) / 2;
    img.crop_imm(x, y, crop_w, crop_h)
}

/// Resizes to exactly `width × height` with Catmull-Rom (bicubic) filtering.
pub fn resample(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    img.resize_exact(width.max(1), height.max(1), FilterType::CatmullRom)
}

/// Encodes as 8-bit RGBA PNG.
pub fn encode_png(img: &DynamicImage) -> ImageResult<Vec<u8>> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let mut buf = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
