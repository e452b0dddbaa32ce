//! Keyword predicates over free text typed by the player or returned by narration.
use once_cell::sync::Lazy;
use regex::Regex;

static CHIME: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)(チャイム|ピロン|エリアメール|警報音|通知音|\bchimes?\b|\bsirens?\b|\balarm\b|alert tone|emergency alert|area mail)",
    )
    .ok()
});

static CONTACT_INTENT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)(連絡|電話|安否|確認|\bcall(ed|ing)?\b|\bphone\b|\btext(ed)?\b|\bmessage\b|\bcontact\b|\breach\b|check(ed)? on|\bwhere\b|\bsafe\b)",
    )
    .ok()
});

/// True when the text mentions hearing an alert chime or receiving an area mail.
#[must_use]
pub fn heard_chime(text: &str) -> bool {
    CHIME.as_ref().is_some_and(|pattern| pattern.is_match(text))
}

/// True when the text names `name` together with a contact or status-check intent.
#[must_use]
pub fn mentions_contact(text: &str, name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }
    names_word(&text.to_lowercase(), &name.to_lowercase())
        && CONTACT_INTENT
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
}

/// Substring match that refuses to split an ASCII word ("cat" in "location").
fn names_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, found)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + found.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}
