use log::debug;
use regex::{Captures, RegexBuilder};

use super::escape_html;

/// Semantic wrapper applied to highlighted terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Flagged ingredient, rendered red
    Problem,
    /// Suggested replacement, rendered green
    Fix,
}

impl Marker {
    pub fn class(&self) -> &'static str {
        match self {
            Marker::Problem => "rr-bad",
            Marker::Fix => "rr-good",
        }
    }

    /// Wrap already-escaped markup in this marker's span
    pub fn wrap(&self, html: &str) -> String {
        format!("<span class=\"{}\">{}</span>", self.class(), html)
    }
}

/// Escape `text` and wrap whole-word, case-insensitive matches of each term.
///
/// Word boundaries are Unicode-aware: a letter such as `ñ` or `ú` continues
/// the word.
///
/// Terms are applied one after another against the growing markup, so a later
/// term can match inside an earlier term's output. Put the most specific terms
/// first.
pub fn highlight<S: AsRef<str>>(text: &str, terms: &[S], marker: Marker) -> String {
    let mut html = escape_html(text);

    for raw in terms {
        let term = raw.as_ref().trim();
        if term.is_empty() {
            continue;
        }

        // The haystack is escaped, so the needle must be too
        let pattern = format!(r"\b({})\b", regex::escape(&escape_html(term)));
        let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(e) => {
                debug!("Skipping term {:?}: {}", term, e);
                continue;
            }
        };

        html = re
            .replace_all(&html, |caps: &Captures| marker.wrap(&caps[1]))
            .into_owned();
    }

    html
}
