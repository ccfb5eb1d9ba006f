pub mod slide;

pub use slide::{SlideSpec, TextBlock};
