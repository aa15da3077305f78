use std::collections::HashSet;

use super::{muted_box, placeholder_item, RequestContext};
use crate::model::{RecipeText, RehabResponse, RewrittenRecipe};
use crate::sweetener::{is_catalog_url, pick_sweetener};
use crate::text::{
    contains_word, escape_html, extract_url, highlight, normalize_for_display,
    normalize_for_match, strip_url, Marker,
};

const MAX_SUMMARY_LINES: usize = 10;
const MAX_AI_ISSUES: usize = 30;
const MAX_DB_ISSUES: usize = 40;
const MAX_SWAPS: usize = 40;
const MAX_ORIGINAL_LINES: usize = 80;
const MAX_REWRITTEN_LINES: usize = 120;
const MAX_NOTES: usize = 80;
const MAX_CHANGE_LOG: usize = 30;

pub(super) struct RecipeFragments {
    pub title: String,
    pub meta: String,
    pub ingredients: String,
    pub instructions: String,
}

pub(super) struct RewrittenFragments {
    pub title: String,
    pub meta: String,
    pub ingredients: String,
    pub instructions: String,
    pub notes: String,
}

struct MetaPill {
    label: &'static str,
    value: String,
    href: Option<String>,
}

fn clean(field: &Option<String>) -> String {
    field.as_deref().map(normalize_for_display).unwrap_or_default()
}

fn clean_or(field: &Option<String>, fallback: &str) -> String {
    let text = clean(field);
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn external_link(href: &str, class: &str, text: &str) -> String {
    format!(
        "<a class=\"{}\" href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
        class,
        escape_html(href),
        escape_html(text)
    )
}

fn note_line(class: &str, prefix: &str, text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("<div class=\"{}\">{}{}</div>", class, prefix, escape_html(text))
    }
}

fn meta(pills: &[MetaPill]) -> String {
    let body: String = pills
        .iter()
        .map(|pill| match &pill.href {
            Some(href) => format!(
                "<div class=\"rr-pill\">{}</div>",
                external_link(href, "rr-link", &format!("{}: {}", pill.label, pill.value))
            ),
            None => format!(
                "<div class=\"rr-pill\">{}: <span class=\"muted\">{}</span></div>",
                escape_html(pill.label),
                escape_html(&pill.value)
            ),
        })
        .collect();
    format!("<div class=\"rr-pills\">{}</div>", body)
}

fn plain_items(lines: &[String], cap: usize) -> String {
    if lines.is_empty() {
        return placeholder_item();
    }
    lines
        .iter()
        .take(cap)
        .map(|line| format!("<li>{}</li>", escape_html(&normalize_for_display(line))))
        .collect()
}

/// Display-cleaned names of the database issues, used as highlight terms
pub(super) fn bad_terms(response: &RehabResponse) -> Vec<String> {
    response
        .db_issues
        .iter()
        .map(|issue| clean(&issue.name))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Lines of the "swaps applied" block: change-log changes first, then
/// `trigger → replacement` pairs, deduplicated on their match form and capped
/// at ten.
pub fn swap_summary_lines(response: &RehabResponse) -> Vec<String> {
    let changes = response.change_log().iter().map(|entry| clean(&entry.change));
    let pairs = response.swap_suggestions.iter().map(|swap| {
        let trigger = clean(&swap.trigger);
        let swap_to = clean(&swap.swap_to);
        if trigger.is_empty() || swap_to.is_empty() {
            String::new()
        } else {
            format!("{} → {}", trigger, swap_to)
        }
    });

    let mut seen = HashSet::new();
    changes
        .chain(pairs)
        .filter(|line| {
            let key = normalize_for_match(line);
            !key.is_empty() && seen.insert(key)
        })
        .take(MAX_SUMMARY_LINES)
        .collect()
}

pub(super) fn swap_summary(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let items: String = lines
        .iter()
        .map(|line| format!("<li>{}</li>", escape_html(line)))
        .collect();
    format!(
        "<h3>Swaps applied (fast)</h3>\
         <div class=\"muted rr-small\">The main changes we made so you see the swaps immediately.</div>\
         <ul>{}</ul>",
        items
    )
}

pub(super) fn issues(response: &RehabResponse) -> String {
    let ai_issues = response.ai_issues();
    if !ai_issues.is_empty() {
        return ai_issues
            .iter()
            .take(MAX_AI_ISSUES)
            .map(|issue| {
                let severity = clean_or(&issue.severity, "low").to_lowercase();
                let level = match severity.as_str() {
                    "high" | "medium" => severity.as_str(),
                    _ => "low",
                };
                let category = clean_or(&issue.category, "other");
                let finding = clean(&issue.finding);
                let fix = clean(&issue.recommended_fix);

                let mut card = format!(
                    "<div class=\"rr-box\"><div><span class=\"rr-pill {}\">{} / {}</span></div>",
                    level,
                    escape_html(&category),
                    escape_html(&severity)
                );
                if !finding.is_empty() {
                    card.push_str(&format!("<div>{}</div>", Marker::Problem.wrap(&escape_html(&finding))));
                }
                card.push_str(&note_line("muted", "", &clean(&issue.why)));
                card.push_str(&note_line("muted rr-small", "Evidence: ", &clean(&issue.evidence)));
                if !fix.is_empty() {
                    card.push_str(&format!("<div>Fix: {}</div>", Marker::Fix.wrap(&escape_html(&fix))));
                }
                card.push_str("</div>");
                card
            })
            .collect();
    }

    if response.db_issues.is_empty() {
        return muted_box("No matches found from your database.");
    }

    response
        .db_issues
        .iter()
        .take(MAX_DB_ISSUES)
        .map(|issue| {
            format!(
                "<div class=\"rr-box\"><div>{} <span class=\"muted rr-small\">({})</span></div>{}</div>",
                Marker::Problem.wrap(&escape_html(&clean(&issue.name))),
                escape_html(&clean_or(&issue.category, "other")),
                note_line("muted rr-small", "", &clean(&issue.notes))
            )
        })
        .collect()
}

pub(super) fn swaps(response: &RehabResponse) -> String {
    if response.swap_suggestions.is_empty() {
        return muted_box("No swap rules matched.");
    }

    response
        .swap_suggestions
        .iter()
        .take(MAX_SWAPS)
        .map(|swap| {
            let link = clean(&swap.link);
            let product = if link.is_empty() {
                String::new()
            } else {
                format!("<div>{}</div>", external_link(&link, "rr-link", "Product link"))
            };
            format!(
                "<div class=\"rr-box\"><div>{}</div><div>Suggested: {}</div>{}{}{}{}{}</div>",
                Marker::Problem.wrap(&escape_html(&clean(&swap.trigger))),
                Marker::Fix.wrap(&escape_html(&clean(&swap.swap_to))),
                note_line("muted rr-small", "Constraint: ", &clean(&swap.constraint)),
                note_line("muted rr-small", "", &clean(&swap.ratio_note)),
                note_line("muted rr-small", "", &clean(&swap.taste_note)),
                note_line("muted rr-small", "Avoid if: ", &clean(&swap.avoid_if)),
                product
            )
        })
        .collect()
}

/// One ingredient line with its URL split off and bad terms marked.
/// Returns the highlighted text, the stripped text and the URL.
fn ingredient_line(raw: &str, bad_terms: &[String]) -> (String, String, Option<String>) {
    let line = normalize_for_display(raw);
    let url = extract_url(&line).map(str::to_string);
    let text = normalize_for_display(&strip_url(&line));
    (highlight(&text, bad_terms, Marker::Problem), text, url)
}

pub(super) fn original_recipe(response: &RehabResponse, bad_terms: &[String]) -> RecipeFragments {
    let original: Option<&RecipeText> = response.original_recipe();
    let extracted = response.extracted.clone().unwrap_or_default();

    let title = [
        original.and_then(|o| o.title.as_ref()),
        extracted.title.as_ref(),
    ]
    .into_iter()
    .flatten()
    .map(|t| normalize_for_display(t))
    .find(|t| !t.is_empty())
    .unwrap_or_else(|| "Original recipe".to_string());

    let mut pills = Vec::new();
    let source_url = clean(&extracted.source_url);
    if !source_url.is_empty() {
        pills.push(MetaPill {
            label: "Source",
            value: "open link".to_string(),
            href: Some(source_url),
        });
    }
    pills.push(MetaPill {
        label: "JSON-LD",
        value: if extracted.used_json_ld { "yes" } else { "no" }.to_string(),
        href: None,
    });

    let ingredients = match original {
        Some(recipe) if !recipe.ingredients.is_empty() => recipe
            .ingredients
            .iter()
            .take(MAX_ORIGINAL_LINES)
            .map(|raw| {
                let (html, _, url) = ingredient_line(raw, bad_terms);
                let link = url
                    .map(|u| format!(" {}", external_link(&u, "rr-link", "link")))
                    .unwrap_or_default();
                format!("<li>{}{}</li>", html, link)
            })
            .collect(),
        _ => placeholder_item(),
    };

    let instructions = match original {
        Some(recipe) => plain_items(&recipe.instructions, MAX_ORIGINAL_LINES),
        None => placeholder_item(),
    };

    RecipeFragments {
        title: escape_html(&format!("Original: {}", title)),
        meta: meta(&pills),
        ingredients,
        instructions,
    }
}

fn rewritten_ingredient(raw: &str, bad_terms: &[String]) -> String {
    let (html, text, url) = ingredient_line(raw, bad_terms);

    let product_link = url.filter(|u| is_catalog_url(u));
    let link = product_link
        .as_ref()
        .map(|u| format!(" {}", external_link(u, "rr-link", "MonkVee link")))
        .unwrap_or_default();

    let suggestion = if product_link.is_none() && contains_word(&normalize_for_match(&text), "sugar") {
        let pick = pick_sweetener(&text);
        format!(
            "<div class=\"rr-small\">Suggested: {}</div>",
            external_link(pick.url, "rr-link rr-good", pick.label)
        )
    } else {
        String::new()
    };

    format!("<li>{}{}{}</li>", html, link, suggestion)
}

pub(super) fn rewritten_recipe(
    response: &RehabResponse,
    bad_terms: &[String],
    context: RequestContext,
) -> Option<RewrittenFragments> {
    let rewritten: &RewrittenRecipe = response.rewritten()?;

    let title = clean_or(&rewritten.title, "Rewritten recipe");
    let servings = clean(&rewritten.servings);
    let echoed_strictness = response.prefs.as_ref().map(|p| clean(&p.strictness)).unwrap_or_default();

    let mut pills = Vec::new();
    if !servings.is_empty() {
        pills.push(MetaPill {
            label: "Servings",
            value: servings,
            href: None,
        });
    }
    pills.push(MetaPill {
        label: "Mode",
        value: clean_or(&response.mode, context.mode.as_str()),
        href: None,
    });
    pills.push(MetaPill {
        label: "Strictness",
        value: if echoed_strictness.is_empty() {
            context.strictness.as_str().to_string()
        } else {
            echoed_strictness
        },
        href: None,
    });

    let ingredients = if rewritten.ingredients.is_empty() {
        placeholder_item()
    } else {
        rewritten
            .ingredients
            .iter()
            .take(MAX_REWRITTEN_LINES)
            .map(|raw| rewritten_ingredient(raw, bad_terms))
            .collect()
    };

    Some(RewrittenFragments {
        title: escape_html(&format!("Rewritten: {}", title)),
        meta: meta(&pills),
        ingredients,
        instructions: plain_items(&rewritten.instructions, MAX_REWRITTEN_LINES),
        notes: plain_items(&rewritten.notes, MAX_NOTES),
    })
}

pub(super) fn change_log(response: &RehabResponse) -> String {
    let entries = response.change_log();
    if entries.is_empty() {
        return placeholder_item();
    }

    entries
        .iter()
        .take(MAX_CHANGE_LOG)
        .map(|entry| {
            format!(
                "<li><div><strong>{}</strong></div>{}{}{}</li>",
                escape_html(&clean(&entry.change)),
                note_line("muted rr-small", "Reason: ", &clean(&entry.reason)),
                note_line("muted rr-small", "Taste: ", &clean(&entry.taste_impact)),
                note_line("muted rr-small", "Function: ", &clean(&entry.function_impact))
            )
        })
        .collect()
}
