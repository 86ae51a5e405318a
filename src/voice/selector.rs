//! Best-effort voice selection from a host-supplied catalog
//!
//! Selection is a cascading fallback: language-filtered candidates, then
//! the full catalog, then an exact preferred-name match, then a
//! quality-keyword match, then the first candidate. Absence of any voice
//! is not an error; synthesis proceeds with the backend's own default.

use super::VoiceInfo;

/// Name keywords that usually indicate a higher-quality voice
pub const PREFERRED_KEYWORDS: &[&str] = &[
    "natural", "enhanced", "neural", "premium", "google", "microsoft",
];

/// Choose the best available voice for a language and optional preferred name
///
/// Candidates are catalog entries whose language tag's primary subtag
/// (first two letters, case-insensitive) matches the requested tag's; if
/// none match, the full catalog is used instead. Within the candidates,
/// an exact `preferred_name` match wins, then the first candidate whose
/// name contains a preference keyword, then the first candidate in
/// catalog order. Returns `None` only for an empty catalog.
///
/// Deterministic: a fixed catalog and fixed inputs always yield the
/// same entry.
pub fn select_voice<'a>(
    catalog: &'a [VoiceInfo],
    language: &str,
    preferred_name: &str,
) -> Option<&'a VoiceInfo> {
    let lang_code: String = language.chars().take(2).collect::<String>().to_lowercase();

    let lang_matches: Vec<&VoiceInfo> = catalog
        .iter()
        .filter(|v| v.language.to_lowercase().starts_with(&lang_code))
        .collect();
    let candidates: Vec<&VoiceInfo> = if lang_matches.is_empty() {
        catalog.iter().collect()
    } else {
        lang_matches
    };

    if !preferred_name.is_empty() {
        if let Some(exact) = candidates.iter().find(|v| v.name == preferred_name).copied() {
            return Some(exact);
        }
    }

    candidates
        .iter()
        .find(|v| {
            let name = v.name.to_lowercase();
            PREFERRED_KEYWORDS.iter().any(|kw| name.contains(kw))
        })
        .or_else(|| candidates.first())
        .copied()
}
