use serde::{Deserialize, Serialize};

/// One slide as read from the script: a title, body text and image references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    pub title: String,
    pub text: TextBlock,
    /// Image URLs in script order; image N is placed in slot N.
    pub image_urls: Vec<String>,
}

impl SlideSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Body text of a slide. Paragraphs are laid out before bullets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub paragraphs: Vec<String>,
    pub bullets: Vec<String>,
}

impl TextBlock {
    /// Treats every `\n`-separated line of `text` as its own paragraph.
    pub fn from_text(text: &str) -> Self {
        Self {
            paragraphs: text.split('\n').map(str::to_string).collect(),
            bullets: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.bullets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_splits_on_newlines() {
        let block = TextBlock::from_text("first\nsecond");
        assert_eq!(block.paragraphs, vec!["first", "second"]);
        assert!(block.bullets.is_empty());
    }

    #[test]
    fn test_is_empty_requires_no_paragraphs_and_no_bullets() {
        assert!(TextBlock::default().is_empty());
        let block = TextBlock {
            paragraphs: vec![],
            bullets: vec!["one".to_string()],
        };
        assert!(!block.is_empty());
    }
}
