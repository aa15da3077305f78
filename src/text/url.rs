use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"https?://\S+").unwrap();
    static ref WS_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// First `http(s)://` token in the line.
pub fn extract_url(line: &str) -> Option<&str> {
    URL_RE.find(line).map(|m| m.as_str())
}

/// The line without its first URL token, whitespace collapsed.
///
/// Highlighting runs on this result only, so link paths never receive markup.
pub fn strip_url(line: &str) -> String {
    match URL_RE.find(line) {
        Some(m) => {
            let rest = format!("{}{}", &line[..m.start()], &line[m.end()..]);
            WS_RE.replace_all(&rest, " ").trim().to_string()
        }
        None => line.trim().to_string(),
    }
}
