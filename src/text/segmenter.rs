//! Sentence segmentation with source-offset tracking
//!
//! Splits raw input text into speakable sentence units while recording
//! where each unit begins in the original text. The recorded offsets are
//! what lets word-boundary events reported against a single sentence be
//! mapped back onto the full text for highlighting and progress.
//!
//! All offsets are character indices (not byte indices) into the
//! original string, so they stay meaningful for texts containing
//! full-width punctuation or other multi-byte characters.

/// Sentence-ending punctuation characters
const SENTENCE_ENDINGS: &[char] = &['.', '!', '?', '。', '！', '？'];

/// A sentence-level unit of text submitted as one atomic synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Trimmed, non-empty sentence text
    pub text: String,
    /// Character index where `text` begins in the original input
    pub source_offset: usize,
}

impl Segment {
    /// Create a segment from text and its offset in the source
    pub fn new(text: impl Into<String>, source_offset: usize) -> Self {
        Self {
            text: text.into(),
            source_offset,
        }
    }

    /// Character length of the segment text
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split text into sentences, tracking each sentence's offset in the input
///
/// A sentence ends at sentence-ending punctuation followed by whitespace;
/// trailing text without such punctuation forms the final sentence.
/// Fragments are trimmed and empty fragments dropped, so empty or
/// all-whitespace input produces an empty vector.
///
/// Offsets are computed by a monotonic forward scan: each fragment is
/// located at its first occurrence at or after the end of the previous
/// match. If a fragment cannot be located (pathological whitespace
/// collapse), its offset falls back to the running search cursor rather
/// than failing. This is a best-effort policy; highlighting may drift
/// for such inputs but segmentation itself never errors.
pub fn segment(text: &str) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let fragments = split_sentences(&chars);

    let mut segments = Vec::with_capacity(fragments.len());
    let mut search_from = 0usize;
    for fragment in fragments {
        let needle: Vec<char> = fragment.chars().collect();
        match find_chars(&chars, &needle, search_from) {
            Some(pos) => {
                segments.push(Segment::new(fragment, pos));
                search_from = pos + needle.len();
            }
            None => {
                // Best-effort fallback: reuse the cursor as the offset.
                segments.push(Segment::new(fragment, search_from));
                search_from += needle.len();
            }
        }
    }

    segments
}

/// Split at sentence-ending punctuation followed by whitespace,
/// returning trimmed non-empty fragments in order
fn split_sentences(chars: &[char]) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        current.push(c);

        let ends_sentence = SENTENCE_ENDINGS.contains(&c)
            && chars.get(i + 1).is_some_and(|next| next.is_whitespace());
        if ends_sentence {
            push_trimmed(&mut fragments, &current);
            current.clear();
        }

        i += 1;
    }
    push_trimmed(&mut fragments, &current);

    fragments
}

fn push_trimmed(fragments: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        fragments.push(trimmed.to_string());
    }
}

/// Find the first occurrence of `needle` in `haystack` at or after `from`,
/// returning its character index
fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }

    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}
