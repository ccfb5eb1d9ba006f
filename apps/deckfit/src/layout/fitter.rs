//! Font Fitter: finds the largest point size whose wrapped text fits a box.
//!
//! Glyph widths are approximated by a single average advance (`0.52 × pt`), the
//! same estimate for every character. The wrapped line count times the line
//! height must fit the box height, and no line may exceed the character budget.
//!
//! `fits` is non-increasing in the point size (a larger size gives a smaller
//! budget, hence at least as many lines, each taller), which is what makes the
//! binary search in `FitProfile::fit` valid.

use serde::{Deserialize, Serialize};

use crate::layout::wrap::{longest_line, wrap};
use crate::models::TextBlock;

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// Average glyph advance as a fraction of the point size.
const AVG_GLYPH_WIDTH_RATIO: f32 = 0.52;

/// Lower bound on the per-character advance, so tiny sizes don't inflate the budget.
const MIN_GLYPH_ADVANCE: f32 = 5.5;

/// Horizontal slack subtracted from the box before dividing by the advance.
const WIDTH_SLACK: f32 = 10.0;

/// No budget below this is ever produced; it keeps forced hyphenation sane.
pub const MIN_CHARS_PER_LINE: usize = 12;

/// Bullets lose this many characters to the bullet glyph and its indent.
pub const BULLET_INDENT_CHARS: usize = 2;

/// Upper bound on binary-search steps. Each step halves the interval, so 18 steps
/// resolve any realistic range well below `SEARCH_TOLERANCE_PT`; the cap only
/// bounds the worst case.
pub const MAX_SEARCH_STEPS: u32 = 18;

/// The search stops once the bracketing interval is narrower than this.
pub const SEARCH_TOLERANCE_PT: f32 = 0.25;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Bullet,
}

/// One paragraph or bullet after wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedBlock {
    pub kind: BlockKind,
    pub lines: Vec<String>,
}

/// Fitted text: the chosen size plus the wrapped lines, grouped by source block.
///
/// When the text fits at all, every line is within the budget for `font_size`
/// and the total height is within the box that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapResult {
    pub font_size: f32,
    pub line_height: f32,
    pub blocks: Vec<WrappedBlock>,
}

impl WrapResult {
    /// All display lines in order, across blocks.
    #[cfg(test)]
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter().map(String::as_str))
    }

    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lines.len()).sum()
    }

    /// Rendered height: lines × size × line-height factor.
    pub fn height(&self) -> f32 {
        self.line_count() as f32 * self.font_size * self.line_height
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fit profiles
// ────────────────────────────────────────────────────────────────────────────

/// Size bounds and line-height multiplier for one kind of text region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitProfile {
    pub min_pt: f32,
    pub max_pt: f32,
    /// Line height as a multiple of the point size.
    pub line_height: f32,
}

/// Slide titles: large, tightly leaded.
pub const TITLE_PROFILE: FitProfile = FitProfile {
    min_pt: 26.0,
    max_pt: 56.0,
    line_height: 1.18,
};

/// Slide body text.
pub const BODY_PROFILE: FitProfile = FitProfile {
    min_pt: 15.0,
    max_pt: 30.0,
    line_height: 1.35,
};

impl FitProfile {
    /// Largest size in `[min_pt, max_pt]` (within tolerance) at which `block` fits.
    ///
    /// Falls back to `min_pt` when nothing fits; an empty block returns `max_pt`.
    pub fn fit(&self, block: &TextBlock, box_width: f32, box_height: f32) -> f32 {
        if block.is_empty() {
            return self.max_pt;
        }

        let (mut lo, mut hi) = (self.min_pt, self.max_pt);
        let mut best = self.min_pt;
        for _ in 0..MAX_SEARCH_STEPS {
            let mid = (lo + hi) * 0.5;
            if self.fits(block, box_width, box_height, mid) {
                best = mid;
                lo = mid;
            } else {
                hi = mid;
            }
            if (hi - lo).abs() < SEARCH_TOLERANCE_PT {
                break;
            }
        }
        best.clamp(self.min_pt, self.max_pt)
    }

    /// Fit test: total wrapped height within `box_height` and every line within budget.
    pub fn fits(&self, block: &TextBlock, box_width: f32, box_height: f32, font_size: f32) -> bool {
        let cpl = chars_per_line(box_width, font_size);
        let wrapped = wrap_block(block, cpl);

        let line_count: usize = wrapped.iter().map(|b| b.lines.len()).sum();
        let total_height = line_count as f32 * font_size * self.line_height;
        let longest = wrapped
            .iter()
            .map(|b| longest_line(&b.lines))
            .max()
            .unwrap_or(0);

        total_height <= box_height && longest <= cpl
    }

    /// Fits `block` and wraps it at the chosen size.
    pub fn layout(&self, block: &TextBlock, box_width: f32, box_height: f32) -> WrapResult {
        let font_size = self.fit(block, box_width, box_height);
        WrapResult {
            font_size,
            line_height: self.line_height,
            blocks: wrap_block(block, chars_per_line(box_width, font_size)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Estimated character capacity of a line `box_width` wide at `font_size`.
pub fn chars_per_line(box_width: f32, font_size: f32) -> usize {
    let advance = (font_size * AVG_GLYPH_WIDTH_RATIO).max(MIN_GLYPH_ADVANCE);
    let estimate = ((box_width - WIDTH_SLACK) / advance).floor();
    if estimate.is_finite() && estimate > 0.0 {
        (estimate as usize).max(MIN_CHARS_PER_LINE)
    } else {
        MIN_CHARS_PER_LINE
    }
}

/// Budget for bullet lines given the paragraph budget.
pub fn bullet_chars_per_line(cpl: usize) -> usize {
    cpl.saturating_sub(BULLET_INDENT_CHARS).max(MIN_CHARS_PER_LINE)
}

/// Wraps every paragraph and bullet independently.
pub fn wrap_block(block: &TextBlock, cpl: usize) -> Vec<WrappedBlock> {
    let paragraphs = block.paragraphs.iter().map(|p| WrappedBlock {
        kind: BlockKind::Paragraph,
        lines: wrap(p, cpl),
    });
    let bullets = block.bullets.iter().map(|b| WrappedBlock {
        kind: BlockKind::Bullet,
        lines: wrap(b, bullet_chars_per_line(cpl)),
    });
    paragraphs.chain(bullets).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
