//! Layout Planner: picks a slide arrangement and computes every region on it.
//!
//! # Arrangements
//! - **Stacked**: 1..=`stack_threshold` images. A text band runs across the top of
//!   the content area; the images sit below it in centred rows.
//! - **Side-by-side**: no images, or more than the threshold. Text takes a left
//!   column (or a centred column when there are no images), images the rest.
//!
//! A slide without paragraphs or bullets gets a zero-size body box and the whole
//! content area goes to images.

use serde::{Deserialize, Serialize};

use crate::layout::fitter::{FitProfile, WrapResult, BODY_PROFILE, TITLE_PROFILE};
use crate::layout::geometry::{Insets, LayoutBox};
use crate::models::{SlideSpec, TextBlock};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Image cells are always 16:9; pictures are cropped to match, never stretched.
pub const IMAGE_ASPECT: f32 = 16.0 / 9.0;

/// Page geometry and arrangement policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub slide_width: f32,
    pub slide_height: f32,
    pub margin: f32,
    pub title_height: f32,
    pub title_insets: Insets,
    pub body_insets: Insets,
    /// Gap between title band and content (applied twice) and between columns.
    pub gap: f32,
    /// Horizontal padding used when a region spans the full slide width.
    pub side_padding: f32,
    /// Largest image count that still uses the stacked arrangement.
    pub stack_threshold: usize,
    /// Share of the content height given to the text band when stacked.
    pub stacked_text_ratio: f32,
    pub text_ratio_with_images: f32,
    pub text_ratio_without_images: f32,
    pub image_gap: f32,
    /// Cap on image height as a share of the image area height.
    pub image_height_ratio: f32,
    pub stacked_images_per_row: usize,
    pub column_images_per_row: usize,
    pub title_profile: FitProfile,
    pub body_profile: FitProfile,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            slide_width: 1920.0,
            slide_height: 1080.0,
            margin: 0.0,
            title_height: 124.0,
            title_insets: Insets::new(14.0, 8.0, 14.0, 8.0),
            body_insets: Insets::new(14.0, 10.0, 14.0, 10.0),
            gap: 40.0,
            side_padding: 32.0,
            stack_threshold: 3,
            stacked_text_ratio: 0.22,
            text_ratio_with_images: 0.40,
            text_ratio_without_images: 0.92,
            image_gap: 20.0,
            image_height_ratio: 0.45,
            stacked_images_per_row: 3,
            column_images_per_row: 2,
            title_profile: TITLE_PROFILE,
            body_profile: BODY_PROFILE,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    Stacked,
    SideBySide,
}

/// Geometry and fitted text for one slide. Image slots are in URL order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideLayout {
    pub arrangement: Arrangement,
    pub title_box: LayoutBox,
    pub title: WrapResult,
    /// Zero-size when the slide has no body text.
    pub body_box: LayoutBox,
    pub body: Option<WrapResult>,
    pub image_area: LayoutBox,
    pub image_slots: Vec<LayoutBox>,
}

// ────────────────────────────────────────────────────────────────────────────
// Planner
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LayoutPlanner {
    config: PlannerConfig,
}

impl LayoutPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn arrangement_for(&self, image_count: usize) -> Arrangement {
        if image_count > 0 && image_count <= self.config.stack_threshold {
            Arrangement::Stacked
        } else {
            Arrangement::SideBySide
        }
    }

    pub fn plan(&self, slide: &SlideSpec) -> SlideLayout {
        let c = &self.config;
        let left = c.margin;
        let top = c.margin;
        let width = c.slide_width - 2.0 * c.margin;

        let title_box = LayoutBox::new(left, top, width, c.title_height);
        let title = fit_region(
            &c.title_profile,
            &TextBlock::from_text(&slide.title),
            &title_box,
            &c.title_insets,
        );

        let content_top = top + c.title_height + c.gap * 2.0;
        let content_height = (c.slide_height - content_top - c.margin).max(0.0);

        let image_count = slide.image_urls.len();
        let has_text = !slide.text.is_empty();
        let arrangement = self.arrangement_for(image_count);

        let (body_box, image_area) = match arrangement {
            Arrangement::Stacked => {
                let padded_left = left + c.side_padding;
                let padded_width = width - 2.0 * c.side_padding;
                if has_text {
                    let text_height = content_height * c.stacked_text_ratio;
                    (
                        LayoutBox::new(
                            padded_left,
                            content_top,
                            padded_width,
                            text_height - c.gap * 0.5,
                        ),
                        LayoutBox::new(
                            padded_left,
                            content_top + text_height + c.gap * 0.5,
                            padded_width,
                            content_height - text_height - c.gap * 0.5,
                        ),
                    )
                } else {
                    (
                        LayoutBox::zero(),
                        LayoutBox::new(padded_left, content_top, padded_width, content_height),
                    )
                }
            }
            Arrangement::SideBySide if image_count == 0 => {
                let text_width = width * c.text_ratio_without_images;
                let text_left = left + (width - text_width) / 2.0;
                let body_box = if has_text {
                    LayoutBox::new(text_left, content_top, text_width, content_height)
                } else {
                    LayoutBox::zero()
                };
                (body_box, LayoutBox::zero())
            }
            Arrangement::SideBySide => {
                if has_text {
                    let text_width = width * c.text_ratio_with_images;
                    (
                        LayoutBox::new(left, content_top, text_width, content_height),
                        LayoutBox::new(
                            left + text_width + c.gap,
                            content_top,
                            width - text_width - c.gap,
                            content_height,
                        ),
                    )
                } else {
                    (
                        LayoutBox::zero(),
                        LayoutBox::new(left, content_top, width, content_height),
                    )
                }
            }
        };

        let body = (!body_box.is_empty())
            .then(|| fit_region(&c.body_profile, &slide.text, &body_box, &c.body_insets));

        let per_row = match arrangement {
            Arrangement::Stacked => c.stacked_images_per_row,
            Arrangement::SideBySide => c.column_images_per_row,
        };
        let image_slots = image_grid(&image_area, image_count, per_row, c);

        SlideLayout {
            arrangement,
            title_box,
            title,
            body_box,
            body,
            image_area,
            image_slots,
        }
    }
}

fn fit_region(profile: &FitProfile, block: &TextBlock, region: &LayoutBox, insets: &Insets) -> WrapResult {
    let (w, h) = region.usable_size(insets);
    profile.layout(block, w, h)
}

/// Uniform 16:9 cells for `count` images, row-major, each row centred and the
/// whole grid centred vertically inside `area`.
fn image_grid(area: &LayoutBox, count: usize, per_row: usize, c: &PlannerConfig) -> Vec<LayoutBox> {
    if count == 0 || area.is_empty() {
        return Vec::new();
    }

    let cols = count.min(per_row.max(1));
    let rows = count.div_ceil(cols);
    let gap = c.image_gap;

    let by_ratio = area.height * c.image_height_ratio;
    let by_width = (area.width - gap * (cols - 1) as f32) / cols as f32 / IMAGE_ASPECT;
    let by_height = (area.height - gap * (rows - 1) as f32) / rows as f32;
    let cell_height = by_ratio.min(by_width).min(by_height).max(1.0);
    let cell_width = cell_height * IMAGE_ASPECT;

    let grid_height = rows as f32 * cell_height + (rows - 1) as f32 * gap;
    let grid_top = area.y + (area.height - grid_height) / 2.0;

    let mut slots = Vec::with_capacity(count);
    for row in 0..rows {
        let in_row = cols.min(count - row * cols);
        let row_width = in_row as f32 * cell_width + (in_row - 1) as f32 * gap;
        let row_left = area.x + (area.width - row_width) / 2.0;
        let y = grid_top + row as f32 * (cell_height + gap);
        for col in 0..in_row {
            let x = row_left + col as f32 * (cell_width + gap);
            slots.push(LayoutBox::new(x, y, cell_width, cell_height));
        }
    }
    slots
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
