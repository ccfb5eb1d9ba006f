// Text layout and slide geometry.
// Everything here is pure and synchronous: wrapping, font fitting and region planning.

pub mod fitter;
pub mod geometry;
pub mod planner;
pub mod wrap;

pub use fitter::WrapResult;
pub use geometry::LayoutBox;
pub use planner::{Arrangement, LayoutPlanner, PlannerConfig, SlideLayout};
