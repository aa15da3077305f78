use html_escape::{decode_html_entities, encode_quoted_attribute};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WS_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Decode entities, drop markup tags and trim.
///
/// Model output occasionally carries stray `<span>` tags or encoded
/// apostrophes (`Chef John&#39;s`); both are cleaned here.
pub fn normalize_for_display(raw: &str) -> String {
    let decoded = decode_html_entities(raw);
    TAG_RE.replace_all(&decoded, "").trim().to_string()
}

/// Canonical form used for comparisons: lowercase ASCII words separated by
/// single spaces.
pub fn normalize_for_match(raw: &str) -> String {
    let folded: String = normalize_for_display(raw)
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '®' | '™' | '℠'))
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    WS_RE.replace_all(&folded, " ").trim().to_string()
}

/// Escape `& < > " '` so the text is inert inside markup and quoted
/// attributes.
pub fn escape_html(text: &str) -> String {
    encode_quoted_attribute(text).into_owned()
}

/// Whole-word test on a match-normalized string.
pub fn contains_word(normalized: &str, word: &str) -> bool {
    normalized.split(' ').any(|w| w == word)
}
