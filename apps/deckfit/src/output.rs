//! Plan export: cropped PNGs plus a `plan.json` manifest for the renderer.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::DeckError;
use crate::images::decode::{encode_png, resample};
use crate::layout::{Arrangement, LayoutBox, WrapResult};
use crate::pipeline::{SkippedImage, SlidePlan};

pub const MANIFEST_FILE: &str = "plan.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckManifest {
    pub generated_at: DateTime<Utc>,
    pub slide_count: usize,
    pub slides: Vec<SlideManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideManifest {
    pub number: usize,
    pub footer: String,
    pub arrangement: Arrangement,
    pub title_box: LayoutBox,
    pub title: WrapResult,
    pub body_box: LayoutBox,
    pub body: Option<WrapResult>,
    pub images: Vec<PlacedImage>,
    pub skipped_images: Vec<SkippedImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedImage {
    pub slot: usize,
    pub source_url: String,
    pub target: LayoutBox,
    /// File name relative to the manifest.
    pub file: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

pub fn image_file_name(slide: usize, slot: usize) -> String {
    format!("slide-{slide:02}-image-{:02}.png", slot + 1)
}

/// Writes every placed image and the manifest into `out_dir`, creating it if needed.
/// Returns the manifest path.
pub fn write_plan(plans: &[SlidePlan], out_dir: &Path) -> Result<PathBuf, DeckError> {
    fs::create_dir_all(out_dir).map_err(|e| DeckError::io(out_dir, e))?;

    let mut slides = Vec::with_capacity(plans.len());
    for plan in plans {
        let mut images = Vec::with_capacity(plan.images.len());
        for image in &plan.images {
            let (pixel_width, pixel_height) = image.target.pixel_size();
            let file = image_file_name(plan.number, image.slot);
            let path = out_dir.join(&file);

            let png = encode_png(&resample(&image.bitmap, pixel_width, pixel_height))?;
            fs::write(&path, png).map_err(|e| DeckError::io(&path, e))?;
            debug!(path = %path.display(), pixel_width, pixel_height, "Wrote image");

            images.push(PlacedImage {
                slot: image.slot,
                source_url: image.source_url.clone(),
                target: image.target,
                file,
                pixel_width,
                pixel_height,
            });
        }

        slides.push(SlideManifest {
            number: plan.number,
            footer: plan.footer.clone(),
            arrangement: plan.layout.arrangement,
            title_box: plan.layout.title_box,
            title: plan.layout.title.clone(),
            body_box: plan.layout.body_box,
            body: plan.layout.body.clone(),
            images,
            skipped_images: plan.skipped.clone(),
        });
    }

    let manifest = DeckManifest {
        generated_at: Utc::now(),
        slide_count: slides.len(),
        slides,
    };
    let path = out_dir.join(MANIFEST_FILE);
    let json = serde_json::to_vec_pretty(&manifest)?;
    fs::write(&path, json).map_err(|e| DeckError::io(&path, e))?;

    info!(path = %path.display(), slides = manifest.slide_count, "Wrote deck manifest");
    Ok(path)
}
