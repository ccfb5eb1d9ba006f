//! Rectangles and insets shared by the fitter, the planner and the exporter.
//!
//! Units are caller-defined (the default slide uses pixels of a 1920×1080 page).

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle. A zero-size box marks an omitted region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Inner padding applied to a text box before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Insets {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl LayoutBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The zero-size box used for regions that are left out of a slide.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Width and height left for content once `insets` are removed, floored at zero.
    pub fn usable_size(&self, insets: &Insets) -> (f32, f32) {
        (
            (self.width - insets.horizontal()).max(0.0),
            (self.height - insets.vertical()).max(0.0),
        )
    }

    /// True if `other` lies inside `self`, allowing for float rounding.
    #[cfg(test)]
    pub fn contains(&self, other: &LayoutBox) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }

    /// Rounded pixel size of the box, at least 1×1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_box_is_empty() {
        assert!(LayoutBox::zero().is_empty());
        assert!(!LayoutBox::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_usable_size_subtracts_insets() {
        let b = LayoutBox::new(0.0, 0.0, 1920.0, 124.0);
        let (w, h) = b.usable_size(&Insets::new(14.0, 8.0, 14.0, 8.0));
        assert_eq!(w, 1892.0);
        assert_eq!(h, 108.0);
    }

    #[test]
    fn test_usable_size_never_negative() {
        let b = LayoutBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(b.usable_size(&Insets::new(20.0, 20.0, 20.0, 20.0)), (0.0, 0.0));
    }

    #[test]
    fn test_pixel_size_has_floor_of_one() {
        assert_eq!(LayoutBox::new(0.0, 0.0, 0.2, 0.1).pixel_size(), (1, 1));
        assert_eq!(LayoutBox::new(0.0, 0.0, 699.6, 393.5).pixel_size(), (700, 394));
    }

    #[test]
    fn test_contains() {
        let outer = LayoutBox::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains(&LayoutBox::new(10.0, 10.0, 90.0, 90.0)));
        assert!(!outer.contains(&LayoutBox::new(10.0, 10.0, 91.0, 10.0)));
    }
}
