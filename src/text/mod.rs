//! # Text Layout
//!
//! Greedy line breaking against the Helvetica metrics. The PDF sink uses
//! it to wrap descriptions, and the measured-height layout mode uses the
//! same routine so a measured entry is exactly as tall as what gets drawn.

use std::borrow::Cow;

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::StandardFont;

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width without trailing spaces.
    pub width: f64,
}

/// Break `text` into lines no wider than `max_width`.
///
/// Lines break at UAX#14 opportunities. A word wider than the whole line is
/// split at the last character that fits. Explicit newlines always break.
/// Empty text yields no lines.
pub fn break_into_lines(
    font: StandardFont,
    text: &str,
    font_size: f64,
    max_width: f64,
) -> Vec<BrokenLine> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    let mut line = String::new();
    let mut segment_start = 0;
    for (end, opportunity) in linebreaks(text) {
        let segment = &text[segment_start..end];
        segment_start = end;

        let candidate_width = font.measure_string(line.trim_end(), font_size)
            + font.measure_string(segment.trim_end(), font_size)
            + trailing_space_width(font, &line, font_size);
        if !line.is_empty() && candidate_width > max_width {
            push_line(&mut lines, font, &line, font_size);
            line.clear();
        }

        line.push_str(segment);
        split_overlong(&mut lines, &mut line, font, font_size, max_width);

        if opportunity == BreakOpportunity::Mandatory {
            push_line(&mut lines, font, &line, font_size);
            line.clear();
        }
    }
    if !line.is_empty() {
        push_line(&mut lines, font, &line, font_size);
    }
    lines
}

/// Shorten a description to `max_chars` characters plus an ellipsis.
pub fn truncate_description(text: &str, max_chars: Option<usize>) -> Cow<'_, str> {
    match max_chars {
        Some(max) if text.chars().count() > max => {
            let cut: String = text.chars().take(max).collect();
            Cow::Owned(format!("{cut}..."))
        }
        _ => Cow::Borrowed(text),
    }
}

fn trailing_space_width(font: StandardFont, line: &str, font_size: f64) -> f64 {
    let trimmed = line.trim_end();
    font.measure_string(&line[trimmed.len()..], font_size)
}

fn push_line(lines: &mut Vec<BrokenLine>, font: StandardFont, line: &str, font_size: f64) {
    let text = line.trim_end_matches(['\n', '\r', '\u{2028}', '\u{2029}']);
    let trimmed = text.trim_end();
    lines.push(BrokenLine {
        text: text.to_string(),
        width: font.measure_string(trimmed, font_size),
    });
}

/// Hard-split the pending line while it alone is wider than `max_width`.
fn split_overlong(
    lines: &mut Vec<BrokenLine>,
    line: &mut String,
    font: StandardFont,
    font_size: f64,
    max_width: f64,
) {
    while font.measure_string(line.trim_end(), font_size) > max_width {
        let mut width = 0.0;
        let mut cut = 0;
        for (idx, ch) in line.char_indices() {
            let w = font.char_width(ch, font_size);
            if width + w > max_width && idx > 0 {
                cut = idx;
                break;
            }
            width += w;
        }
        if cut == 0 {
            // A single character wider than the line; keep it alone.
            cut = line.chars().next().map(char::len_utf8).unwrap_or(line.len());
            if cut >= line.len() {
                return;
            }
        }
        let rest = line.split_off(cut);
        push_line(lines, font, line, font_size);
        *line = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const F: StandardFont = StandardFont::Helvetica;

    #[test]
    fn single_line_when_it_fits() {
        let lines = break_into_lines(F, "Filtro de óleo", 9.0, 500.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Filtro de óleo");
    }

    #[test]
    fn breaks_at_spaces() {
        let text = "alpha beta gamma delta epsilon";
        let width = F.measure_string("alpha beta ", 10.0);
        let lines = break_into_lines(F, text, 10.0, width);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(line.width <= width + 1e-9, "{:?} too wide", line.text);
        }
        let joined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn explicit_newline_breaks() {
        let lines = break_into_lines(F, "um\ndois", 9.0, 500.0);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["um", "dois"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(break_into_lines(F, "", 9.0, 100.0).is_empty());
    }

    #[test]
    fn overlong_word_is_split() {
        let lines = break_into_lines(F, "ABCDEFGHIJKLMNOPQRSTUVWXYZ", 10.0, 40.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= 40.0 + 1e-9));
    }

    #[test]
    fn truncation_adds_ellipsis() {
        let long = "x".repeat(120);
        let cut = truncate_description(&long, Some(100));
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_description("curto", Some(100)), "curto");
        assert_eq!(truncate_description(&long, None).len(), 120);
    }
}
