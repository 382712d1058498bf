//! Display-width helpers for terminal text.

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

pub fn display_width(s: &str) -> usize {
    s.width()
}

pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Cuts `s` to at most `max_width` columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }

    if max_width == 0 {
        return String::new();
    }

    let target_width = max_width - 1;
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = char_width(ch);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result.push('…');
    result
}

/// Number of leading chars of `line` to skip so the cursor stays on screen.
///
/// `cursor` is a char index. One cell at the cursor is reserved for the caret.
pub fn cursor_window_start(line: &str, cursor: usize, max_width: usize) -> usize {
    let mut skip = 0;
    while skip < cursor
        && line
            .chars()
            .skip(skip)
            .take(cursor - skip)
            .map(char_width)
            .sum::<usize>()
            >= max_width
    {
        skip += 1;
    }
    skip
}
