//! Word Wrapper: greedy character-budget wrapping for slide text.
//!
//! Widths are counted in characters, not glyph advances. `fitter::chars_per_line`
//! converts a box width and point size into the budget used here.
//!
//! # Rules
//! - Words are packed greedily: a word joins the current line while
//!   `line + 1 + word <= max_chars`.
//! - A word longer than the budget is broken after the rightmost `-`, `/` or `.`
//!   that keeps the left part within budget; failing that it is force-hyphenated
//!   near its midpoint and the remainder is wrapped again.
//! - Orphan control runs once: a too-short last line pulls the final word of the
//!   line above down to it, provided the result still fits.

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// Characters after which an overlong token may break without an inserted hyphen.
const BREAK_CHARS: [char; 3] = ['-', '/', '.'];

/// Smallest budget that still makes progress on forced hyphenation.
const MIN_LINE_CHARS: usize = 4;

/// Forced hyphenation never cuts before this character index.
const MIN_HYPHEN_CUT: usize = 3;

/// A last line shorter than `max(ORPHAN_MIN_CHARS, budget × ORPHAN_MIN_FRACTION)` is an orphan.
const ORPHAN_MIN_CHARS: usize = 6;
const ORPHAN_MIN_FRACTION: f32 = 0.25;

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Wraps `text` into display lines of at most `max_chars` characters.
///
/// Blank input yields a single empty line, never an empty vector.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(MIN_LINE_CHARS);
    if text.trim().is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = char_len(word);

        if line_len > 0 && line_len + 1 + word_len <= max_chars {
            line.push(' ');
            line.push_str(word);
            line_len += 1 + word_len;
            continue;
        }

        if line_len > 0 {
            lines.push(std::mem::take(&mut line));
        }
        let (completed, rest) = split_word(word, max_chars);
        lines.extend(completed);
        line_len = char_len(&rest);
        line = rest;
    }
    if line_len > 0 {
        lines.push(line);
    }

    fix_orphan(&mut lines, max_chars);
    lines
}

/// Length of the longest line, in characters.
pub fn longest_line(lines: &[String]) -> usize {
    lines.iter().map(|l| char_len(l)).max().unwrap_or(0)
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ────────────────────────────────────────────────────────────────────────────
// Overlong tokens
// ────────────────────────────────────────────────────────────────────────────

/// Breaks a single token into completed lines plus the fragment that opens the
/// next line. Tokens within budget come back untouched as the fragment.
fn split_word(word: &str, max_chars: usize) -> (Vec<String>, String) {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= max_chars {
        return (Vec::new(), word.to_string());
    }

    let (head, tail): (String, &[char]) = match natural_break(&chars, max_chars) {
        Some(cut) => (chars[..=cut].iter().collect(), &chars[cut + 1..]),
        None => {
            let cut = (chars.len() / 2).max(MIN_HYPHEN_CUT).min(max_chars - 1);
            let mut head: String = chars[..cut].iter().collect();
            head.push('-');
            (head, &chars[cut..])
        }
    };

    let tail: String = tail.iter().collect();
    let (mut completed, rest) = split_word(&tail, max_chars);
    completed.insert(0, head);
    (completed, rest)
}

/// Index of the rightmost break character whose left part (inclusive) fits the
/// budget and which leaves a non-empty right part.
fn natural_break(chars: &[char], max_chars: usize) -> Option<usize> {
    let limit = max_chars.min(chars.len() - 1);
    (1..limit).rev().find(|&i| BREAK_CHARS.contains(&chars[i]))
}

// ────────────────────────────────────────────────────────────────────────────
// Orphan control
// ────────────────────────────────────────────────────────────────────────────

fn fix_orphan(lines: &mut [String], max_chars: usize) {
    let n = lines.len();
    if n < 2 {
        return;
    }

    let threshold = (ORPHAN_MIN_CHARS as f32).max(max_chars as f32 * ORPHAN_MIN_FRACTION);
    let last_len = char_len(&lines[n - 1]);
    if last_len as f32 >= threshold {
        return;
    }

    let Some(cut) = lines[n - 2].rfind(' ') else {
        return;
    };
    if cut == 0 {
        return;
    }
    let moved_len = char_len(&lines[n - 2][cut + 1..]);
    if moved_len + 1 + last_len > max_chars {
        return;
    }

    let moved = lines[n - 2].split_off(cut + 1);
    lines[n - 2].truncate(cut);
    lines[n - 1] = format!("{moved} {}", lines[n - 1]);
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
