//! Slide script parser.
//!
//! One item per line, blank lines ignored:
//!
//! ```text
//! # Slide 1: Why Rust
//! Memory safety without a garbage collector.
//! - Ownership
//! - Borrowing
//! https://example.com/ferris.png
//! ```
//!
//! `# ` opens a slide, `- ` is a bullet, an `http(s)://` line is an image and
//! anything else is a paragraph.

use crate::errors::DeckError;
use crate::models::SlideSpec;

const HEADING_MARKER: &str = "# ";
const BULLET_MARKER: &str = "- ";

pub fn parse_script(input: &str) -> Result<Vec<SlideSpec>, DeckError> {
    let mut slides = Vec::new();
    let mut current: Option<SlideSpec> = None;

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(HEADING_MARKER) {
            slides.extend(current.take());
            current = Some(SlideSpec::new(heading_title(line)));
            continue;
        }

        let slide = current.as_mut().ok_or_else(|| {
            DeckError::script(idx + 1, "content before the first '# ' slide heading")
        })?;

        if let Some(bullet) = line.strip_prefix(BULLET_MARKER) {
            slide.text.bullets.push(bullet.trim().to_string());
        } else if is_image_url(line) {
            slide.image_urls.push(normalize_image_url(line));
        } else {
            slide.text.paragraphs.push(line.to_string());
        }
    }

    slides.extend(current);
    Ok(slides)
}

/// `# Slide 3: Title` → `Title`; `# Title` → `Title`.
fn heading_title(line: &str) -> String {
    match line.split_once(':') {
        Some((_, rest)) if !rest.trim().is_empty() => rest.trim().to_string(),
        _ => line.trim_start_matches('#').trim().to_string(),
    }
}

/// `http://` or `https://` with something after it; the scheme is case-insensitive.
fn is_image_url(line: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        line.len() > scheme.len()
            && line
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Cloudinary's `f_auto` may negotiate formats we cannot decode; pin it to JPEG.
pub fn normalize_image_url(url: &str) -> String {
    if url.contains("cloudinary.com") && url.contains("f_auto") {
        url.replace("f_auto", "f_jpg")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_slide() {
        let script = "\
# Слайд 1: Why Rust
Memory safety without a garbage collector.

- Ownership
-   Borrowing
https://example.com/ferris.png
";
        let slides = parse_script(script).unwrap();
        assert_eq!(slides.len(), 1);
        let slide = &slides[0];
        assert_eq!(slide.title, "Why Rust");
        assert_eq!(
            slide.text.paragraphs,
            vec!["Memory safety without a garbage collector."]
        );
        assert_eq!(slide.text.bullets, vec!["Ownership", "Borrowing"]);
        assert_eq!(slide.image_urls, vec!["https://example.com/ferris.png"]);
    }

    #[test]
    fn test_multiple_slides_keep_order() {
        let script = "# Slide 1: One\ntext\n# Slide 2: Two\n# Slide 3: Three\n- b";
        let titles: Vec<String> = parse_script(script)
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_heading_without_colon_uses_whole_line() {
        let slides = parse_script("# Closing thoughts").unwrap();
        assert_eq!(slides[0].title, "Closing thoughts");

        let slides = parse_script("# Slide 4:").unwrap();
        assert_eq!(slides[0].title, "Slide 4:");
    }

    #[test]
    fn test_content_before_heading_reports_line() {
        let err = parse_script("\n\nstray paragraph\n# Slide 1: Late").unwrap_err();
        assert!(matches!(err, DeckError::Script { line: 3, .. }));
    }

    #[test]
    fn test_url_scheme_is_case_insensitive() {
        let slides = parse_script("# S\nHTTPS://EXAMPLE.COM/A.PNG\nhttp:// \nhttp://").unwrap();
        assert_eq!(slides[0].image_urls, vec!["HTTPS://EXAMPLE.COM/A.PNG"]);
        // "http://" alone is not a URL; "http:// " trims to the same thing.
        assert_eq!(slides[0].text.paragraphs, vec!["http://", "http://"]);
    }

    #[test]
    fn test_non_http_links_are_paragraphs() {
        let slides = parse_script("# S\nftp://example.com/a.png\nsee https://example.com").unwrap();
        assert!(slides[0].image_urls.is_empty());
        assert_eq!(slides[0].text.paragraphs.len(), 2);
    }

    #[test]
    fn test_cloudinary_auto_format_is_pinned_to_jpeg() {
        assert_eq!(
            normalize_image_url("https://res.cloudinary.com/demo/image/upload/f_auto,q_auto/sample"),
            "https://res.cloudinary.com/demo/image/upload/f_jpg,q_auto/sample"
        );
        let other = "https://cdn.example.com/f_auto/sample.png";
        assert_eq!(normalize_image_url(other), other);
    }

    #[test]
    fn test_empty_input_yields_no_slides() {
        assert!(parse_script("").unwrap().is_empty());
        assert!(parse_script("\n   \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn test_hash_without_space_is_paragraph() {
        let slides = parse_script("# S\n#hashtag").unwrap();
        assert_eq!(slides[0].text.paragraphs, vec!["#hashtag"]);
    }
}
