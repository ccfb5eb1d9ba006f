//! Deck Builder: turns parsed slides into placement plans.
//!
//! Flow per slide: plan regions (title fit, body fit, image slots) → fetch each
//! image in order → decode → crop to its slot's aspect → collect.
//!
//! Slides and images are processed strictly one at a time, so image N always
//! lands in slot N. A failing image is recorded as skipped and the rest of the
//! slide carries on.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::DeckError;
use crate::images::decode::{crop_to_aspect, decode};
use crate::images::{FetchOutcome, ImageCache, ImageFetcher};
use crate::layout::{LayoutBox, LayoutPlanner, SlideLayout};
use crate::models::SlideSpec;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A decoded, cropped picture ready to be placed at `target`.
#[derive(Debug, Clone)]
pub struct ImagePlan {
    /// Position of the URL in the slide's image list.
    pub slot: usize,
    pub source_url: String,
    pub bitmap: DynamicImage,
    pub target: LayoutBox,
}

/// An image that could not be placed, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedImage {
    pub slot: usize,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct SlidePlan {
    /// 1-based slide number.
    pub number: usize,
    /// `"N / total"`.
    pub footer: String,
    pub layout: SlideLayout,
    pub images: Vec<ImagePlan>,
    pub skipped: Vec<SkippedImage>,
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

pub struct DeckBuilder {
    planner: LayoutPlanner,
    fetcher: ImageFetcher,
}

impl DeckBuilder {
    pub fn new(planner: LayoutPlanner, fetcher: ImageFetcher) -> Self {
        Self { planner, fetcher }
    }

    /// Wires the planner and fetcher from application configuration.
    pub fn from_config(config: &Config, cache: Option<ImageCache>) -> Result<Self, DeckError> {
        let fetcher = ImageFetcher::new(config.fetch_config(), cache)?;
        Ok(Self::new(LayoutPlanner::new(config.planner_config()), fetcher))
    }

    pub async fn build_deck(&self, slides: &[SlideSpec]) -> Vec<SlidePlan> {
        let total = slides.len();
        let mut plans = Vec::with_capacity(total);
        for (idx, slide) in slides.iter().enumerate() {
            plans.push(self.build_slide(idx + 1, total, slide).await);
        }
        plans
    }

    pub async fn build_slide(&self, number: usize, total: usize, slide: &SlideSpec) -> SlidePlan {
        // Step 1: Geometry and text fitting
        let layout = self.planner.plan(slide);
        info!(
            slide = number,
            arrangement = ?layout.arrangement,
            title_pt = layout.title.font_size,
            body_pt = layout.body.as_ref().map(|b| b.font_size),
            body_lines = layout.body.as_ref().map(|b| b.line_count()),
            body_height = layout.body.as_ref().map(|b| b.height()),
            images = slide.image_urls.len(),
            "Planned slide"
        );

        // Step 2: Images, in order
        let mut images = Vec::new();
        let mut skipped = Vec::new();
        for (slot, url) in slide.image_urls.iter().enumerate() {
            let Some(&target) = layout.image_slots.get(slot) else {
                skipped.push(skip(number, slot, url, "no room left on the slide".to_string()));
                continue;
            };
            match self.prepare_image(url, &target).await {
                Ok(bitmap) => {
                    debug!(slide = number, slot, url = %url, "Image placed");
                    images.push(ImagePlan {
                        slot,
                        source_url: url.clone(),
                        bitmap,
                        target,
                    });
                }
                Err(reason) => skipped.push(skip(number, slot, url, reason)),
            }
        }

        SlidePlan {
            number,
            footer: format!("{number} / {total}"),
            layout,
            images,
            skipped,
        }
    }

    /// Fetches, decodes and crops one image. `Err` carries the skip reason.
    async fn prepare_image(&self, url: &str, target: &LayoutBox) -> Result<DynamicImage, String> {
        let bytes = match self.fetcher.fetch(url).await {
            Ok(FetchOutcome::Bytes(bytes)) => bytes,
            Ok(FetchOutcome::Skipped(reason)) => return Err(reason.to_string()),
            Ok(FetchOutcome::TransientFailure {
                attempts,
                last_status,
            }) => {
                return Err(format!(
                    "server kept failing (HTTP {last_status}) after {attempts} attempts"
                ))
            }
            Err(e) => return Err(e.to_string()),
        };

        // Decoding a multi-megabyte payload is CPU-bound.
        let aspect = target.width / target.height;
        let prepared = tokio::task::spawn_blocking(move || {
            decode(&bytes).map(|bitmap| crop_to_aspect(&bitmap, aspect))
        })
        .await
        .map_err(|e| format!("image decode task failed: {e}"))?;
        prepared.ok_or_else(|| "could not decode image data".to_string())
    }
}

fn skip(slide: usize, slot: usize, url: &str, reason: String) -> SkippedImage {
    warn!(slide, slot, url = %url, %reason, "Image skipped");
    SkippedImage {
        slot,
        url: url.to_string(),
        reason,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
