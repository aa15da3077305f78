//! Text handling shared by the renderer and the sweetener picker.
//!
//! Everything taken from a rehab payload goes through [`normalize_for_display`]
//! before it is shown and through [`normalize_for_match`] before it is compared.

mod highlight;
mod normalize;
mod url;

pub use highlight::{highlight, Marker};
pub use normalize::{contains_word, escape_html, normalize_for_display, normalize_for_match};
pub use url::{extract_url, strip_url};
