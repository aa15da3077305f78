//! Sweetener product catalog and the heuristic that picks one entry for a
//! sugar-bearing ingredient line.

use lazy_static::lazy_static;
use regex::Regex;

use crate::text::normalize_for_match;

/// Domain every catalog product lives on
pub const CATALOG_DOMAIN: &str = "monkvee.com";

/// One recommendable product
#[derive(Debug, PartialEq, Eq)]
pub struct ProductCatalogEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub url: &'static str,
}

pub static ORIGINAL_1_1: ProductCatalogEntry = ProductCatalogEntry {
    key: "original_11",
    label: "MonkVee Original Monk Fruit Sweetener (1:1 sugar equivalent)",
    url: "https://monkvee.com/products/monk-fruit-sweetener-original",
};

pub static GOLDEN_1_1: ProductCatalogEntry = ProductCatalogEntry {
    key: "golden_11",
    label: "MonkVee Golden Monk Fruit Sweetener (1:1 sugar equivalent)",
    url: "https://monkvee.com/products/monk-fruit-sugar-golden",
};

pub static MONK_EXTRACT_150X: ProductCatalogEntry = ProductCatalogEntry {
    key: "monk_extract_150x",
    label: "MonkVee Pure Monk Fruit Extract (150x sweeter than sugar)",
    url: "https://monkvee.com/products/monk-fruit-extract",
};

pub static STEVIA_EXTRACT_300X: ProductCatalogEntry = ProductCatalogEntry {
    key: "stevia_extract_300x",
    label: "MonkVee Pure Stevia Extract (300x sweeter than sugar)",
    url: "https://monkvee.com/products/stevia-extract",
};

/// The whole catalog, in display order
pub static CATALOG: [&ProductCatalogEntry; 4] = [
    &ORIGINAL_1_1,
    &GOLDEN_1_1,
    &MONK_EXTRACT_150X,
    &STEVIA_EXTRACT_300X,
];

/// Look up a catalog entry by its key
pub fn catalog_entry(key: &str) -> Option<&'static ProductCatalogEntry> {
    CATALOG.iter().copied().find(|entry| entry.key == key)
}

/// Whether a URL points at the catalog's product domain
pub fn is_catalog_url(url: &str) -> bool {
    url.contains(CATALOG_DOMAIN)
}

lazy_static! {
    static ref BULK_RE: Regex = Regex::new(
        r"(?i)(\d+/\d+|\d+(\.\d+)?)\s*(cup|cups|tbsp|tablespoon|tablespoons|tsp|teaspoon|teaspoons)\b"
    )
    .unwrap();
    static ref TSP_RE: Regex =
        Regex::new(r"(?i)(\d+/\d+|\d+(?:\.\d+)?)\s*(?:tsp|teaspoon|teaspoons)\b").unwrap();
}

const BROWN_CUES: [&str; 4] = [
    "brown sugar",
    "dark brown sugar",
    "light brown sugar",
    "molasses",
];

const WHITE_CUES: [&str; 4] = [
    "white sugar",
    "granulated sugar",
    "caster sugar",
    "superfine sugar",
];

/// Choose the catalog product that best replaces the sweetener in `line`.
///
/// Bulk amounts (cups, tablespoons, teaspoons) get a 1:1 product, golden for
/// brown sugar and molasses. A lone sub-teaspoon amount gets the concentrated
/// extract.
pub fn pick_sweetener(line: &str) -> &'static ProductCatalogEntry {
    let normalized = normalize_for_match(line);
    let is_brown = BROWN_CUES.iter().any(|cue| normalized.contains(cue));
    let is_white = WHITE_CUES.iter().any(|cue| normalized.contains(cue));
    let mentions_sugar = normalized.contains("sugar");

    let bulk = BULK_RE.is_match(line);

    if bulk && is_brown {
        return &GOLDEN_1_1;
    }
    if bulk && (is_white || mentions_sugar) {
        return &ORIGINAL_1_1;
    }
    if is_trace_teaspoon(line) {
        return &MONK_EXTRACT_150X;
    }

    if is_brown {
        &GOLDEN_1_1
    } else {
        &ORIGINAL_1_1
    }
}

/// The first teaspoon amount in the line lies strictly between 0 and 1
fn is_trace_teaspoon(line: &str) -> bool {
    TSP_RE
        .captures(line)
        .and_then(|caps| parse_quantity(&caps[1]))
        .is_some_and(|n| n > 0.0 && n < 1.0)
}

/// Parse `3`, `0.5` or `1/4`. Zero denominators yield `None`.
fn parse_quantity(token: &str) -> Option<f64> {
    match token.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => token.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_brown_sugar_gets_golden() {
        assert_eq!(pick_sweetener("2 cups brown sugar"), &GOLDEN_1_1);
        assert_eq!(pick_sweetener("1 Tbsp dark brown sugar, packed"), &GOLDEN_1_1);
        assert_eq!(pick_sweetener("2 tablespoons molasses"), &GOLDEN_1_1);
    }

    #[test]
    fn test_bulk_white_sugar_gets_original() {
        assert_eq!(pick_sweetener("1 cup white sugar"), &ORIGINAL_1_1);
        assert_eq!(pick_sweetener("3 tbsp sugar"), &ORIGINAL_1_1);
        assert_eq!(pick_sweetener("1/2 cup granulated sugar"), &ORIGINAL_1_1);
    }

    #[test]
    fn test_sub_teaspoon_gets_extract() {
        assert_eq!(pick_sweetener("1/4 tsp stevia"), &MONK_EXTRACT_150X);
        assert_eq!(pick_sweetener("0.5 teaspoon sweetener"), &MONK_EXTRACT_150X);
    }

    #[test]
    fn test_teaspoon_of_sugar_is_still_bulk() {
        assert_eq!(pick_sweetener("1/4 tsp sugar"), &ORIGINAL_1_1);
        assert_eq!(pick_sweetener("2 tsp brown sugar"), &GOLDEN_1_1);
    }

    #[test]
    fn test_no_quantity_uses_default() {
        assert_eq!(pick_sweetener("pinch of sugar"), &ORIGINAL_1_1);
        assert_eq!(pick_sweetener("light brown sugar, to taste"), &GOLDEN_1_1);
    }

    #[test]
    fn test_unparsable_fraction_is_not_trace() {
        assert_eq!(pick_sweetener("1/0 tsp stevia"), &ORIGINAL_1_1);
        assert_eq!(pick_sweetener("2 tsp stevia"), &ORIGINAL_1_1);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("1/4"), Some(0.25));
        assert_eq!(parse_quantity("0.75"), Some(0.75));
        assert_eq!(parse_quantity("3"), Some(3.0));
        assert_eq!(parse_quantity("1/0"), None);
    }

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(catalog_entry("golden_11"), Some(&GOLDEN_1_1));
        assert_eq!(catalog_entry("stevia_extract_300x").unwrap().url, STEVIA_EXTRACT_300X.url);
        assert!(catalog_entry("honey").is_none());
        assert!(CATALOG.iter().all(|entry| is_catalog_url(entry.url)));
    }
}
