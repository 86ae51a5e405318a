//! Translation of intra-segment word boundaries into original-text offsets

use serde::{Deserialize, Serialize};

use crate::text::Segment;

/// A highlighted character range in original-text coordinates
///
/// Transient: recomputed on every boundary event, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
}

/// Map a backend-reported boundary within `segment` onto the full text
///
/// `char_index`/`char_length` come from the backend and are untrusted:
/// a zero length is replaced by the distance from `char_index` to the
/// next whitespace in the segment (minimum 1), and the resulting range
/// is clamped to `[0, total_chars]`.
pub fn translate(
    segment: &Segment,
    char_index: usize,
    char_length: usize,
    total_chars: usize,
) -> HighlightRange {
    let global_start = segment.source_offset + char_index;

    let effective_length = if char_length > 0 {
        char_length
    } else {
        distance_to_whitespace(&segment.text, char_index).max(1)
    };

    let start = global_start.min(total_chars);
    let end = global_start
        .saturating_add(effective_length)
        .min(total_chars)
        .max(start);

    HighlightRange { start, end }
}

/// Character distance from `from` to the next whitespace in `text`,
/// or to the end of `text` if none follows
fn distance_to_whitespace(text: &str, from: usize) -> usize {
    text.chars()
        .skip(from)
        .position(|c| c.is_whitespace())
        .unwrap_or_else(|| text.chars().count().saturating_sub(from))
}
