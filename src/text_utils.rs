use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Split content into logical lines. Empty content is a single empty line.
pub(crate) fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        vec![""]
    } else {
        content.split('\n').collect()
    }
}

/// Display width of a string in terminal cells.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Clip to at most `width` cells, then pad with spaces to exactly `width`.
///
/// Clipping walks grapheme clusters; a wide cluster that would straddle the
/// boundary is dropped and its cells padded instead.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0usize;
    for grapheme in text.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if used + w > width {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}

/// Center text in `width` cells; extra cell goes to the right.
pub(crate) fn center_in_width(text: &str, width: usize) -> String {
    let w = display_width(text);
    if w >= width {
        return fit_to_width(text, width);
    }
    let left = (width - w) / 2;
    let mut out = " ".repeat(left);
    out.push_str(text);
    fit_to_width(&out, width)
}
