//! Word wrapping for the chat pane.
//!
//! Messages are styled first and wrapped afterwards, before they reach
//! ratatui, so the scroll math and the rendered rows always agree on the
//! line count.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// One display character with the style it is drawn in.
pub type StyledChar = (char, Style);

fn row_width(chars: &[StyledChar]) -> usize {
    chars.iter().map(|(c, _)| c.width().unwrap_or(0)).sum()
}

/// Splits on spaces the way `str::split(' ')` does, keeping the space that
/// preceded each word so its style survives.
fn split_words(line: &[StyledChar]) -> Vec<(Option<StyledChar>, &[StyledChar])> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut sep = None;
    for (index, &(c, style)) in line.iter().enumerate() {
        if c == ' ' {
            words.push((sep, &line[start..index]));
            sep = Some((c, style));
            start = index + 1;
        }
    }
    words.push((sep, &line[start..]));
    words
}

/// Wraps one logical line (no newlines) to `width` display columns.
///
/// Words move to the next row when they do not fit, and words wider than a
/// full row are broken by character. Leading indentation is preserved; the
/// space at a wrap point is dropped.
pub fn wrap_styled(line: &[StyledChar], width: usize) -> Vec<Vec<StyledChar>> {
    if width == 0 || row_width(line) <= width {
        return vec![line.to_vec()];
    }

    let mut rows = Vec::new();
    let mut current: Vec<StyledChar> = Vec::new();
    let mut current_width = 0usize;
    let mut wrapped = false;

    for (index, (sep, word)) in split_words(line).into_iter().enumerate() {
        let at_wrap_start = wrapped && current.is_empty();
        if at_wrap_start && word.is_empty() {
            continue;
        }

        let word_width = row_width(word);
        let sep_width = usize::from(index > 0 && !at_wrap_start);
        if current_width + sep_width + word_width <= width {
            if sep_width == 1 {
                current.extend(sep);
            }
            current.extend_from_slice(word);
            current_width += sep_width + word_width;
            continue;
        }

        if !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        wrapped = true;

        if word_width <= width {
            current.extend_from_slice(word);
            current_width = word_width;
            continue;
        }

        for &(c, style) in word {
            let c_width = c.width().unwrap_or(0);
            if current_width + c_width > width && !current.is_empty() {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push((c, style));
            current_width += c_width;
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }

    rows
}

/// Groups runs of equally styled characters into spans.
pub fn to_line(row: Vec<StyledChar>) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut text = String::new();
    let mut style: Option<Style> = None;

    for (c, c_style) in row {
        if style.is_some_and(|s| s != c_style) {
            spans.push(Span::styled(std::mem::take(&mut text), style.unwrap_or_default()));
        }
        style = Some(c_style);
        text.push(c);
    }
    if let Some(style) = style {
        spans.push(Span::styled(text, style));
    }

    Line::from(spans)
}

/// The rightmost part of `text` that fits in `width` columns, with its width.
pub fn visible_tail(text: &str, width: usize) -> (&str, usize) {
    let mut used = 0usize;
    let mut start = text.len();
    for (index, ch) in text.char_indices().rev() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        used += ch_width;
        start = index;
    }
    (&text[start..], used)
}
