//! Turns a rehab payload into HTML fragments for the page's fixed mount
//! points.

mod sections;

pub use sections::swap_summary_lines;

use std::collections::BTreeMap;

use crate::model::{Mode, RehabResponse, Strictness};
use crate::text::escape_html;

/// Named element of the host page that receives a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MountPoint {
    IssuesList,
    SwapsList,
    OrigTitle,
    OrigMeta,
    OrigIngredients,
    OrigInstructions,
    NewTitle,
    NewMeta,
    SwapSummary,
    NewIngredients,
    NewInstructions,
    NewNotes,
    ChangeLog,
}

impl MountPoint {
    pub const ALL: [MountPoint; 13] = [
        MountPoint::IssuesList,
        MountPoint::SwapsList,
        MountPoint::OrigTitle,
        MountPoint::OrigMeta,
        MountPoint::OrigIngredients,
        MountPoint::OrigInstructions,
        MountPoint::NewTitle,
        MountPoint::NewMeta,
        MountPoint::SwapSummary,
        MountPoint::NewIngredients,
        MountPoint::NewInstructions,
        MountPoint::NewNotes,
        MountPoint::ChangeLog,
    ];

    /// Element id on the host page
    pub fn id(&self) -> &'static str {
        match self {
            MountPoint::IssuesList => "issuesList",
            MountPoint::SwapsList => "swapsList",
            MountPoint::OrigTitle => "origTitle",
            MountPoint::OrigMeta => "origMeta",
            MountPoint::OrigIngredients => "origIngredients",
            MountPoint::OrigInstructions => "origInstructions",
            MountPoint::NewTitle => "newTitle",
            MountPoint::NewMeta => "newMeta",
            MountPoint::SwapSummary => "rrSwapFast",
            MountPoint::NewIngredients => "newIngredients",
            MountPoint::NewInstructions => "newInstructions",
            MountPoint::NewNotes => "newNotes",
            MountPoint::ChangeLog => "changeLog",
        }
    }

    /// Fragment shown when there is nothing to display
    pub fn placeholder(&self) -> String {
        match self {
            MountPoint::IssuesList | MountPoint::SwapsList => muted_box("—"),
            MountPoint::OrigTitle => "Original recipe".to_string(),
            MountPoint::NewTitle => "Rewritten recipe".to_string(),
            MountPoint::OrigMeta | MountPoint::NewMeta | MountPoint::SwapSummary => String::new(),
            MountPoint::OrigIngredients
            | MountPoint::OrigInstructions
            | MountPoint::NewIngredients
            | MountPoint::NewInstructions
            | MountPoint::NewNotes
            | MountPoint::ChangeLog => placeholder_item(),
        }
    }
}

/// What the request asked for, used where the payload does not echo it
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    pub mode: Mode,
    pub strictness: Strictness,
}

/// Rendered state of the rehab page: one fragment per mount point plus the
/// enabled state of the submit controls
#[derive(Debug, Clone)]
pub struct Page {
    fragments: BTreeMap<MountPoint, String>,
    controls_disabled: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        let fragments = MountPoint::ALL
            .iter()
            .map(|point| (*point, point.placeholder()))
            .collect();
        Self {
            fragments,
            controls_disabled: false,
        }
    }

    pub fn get(&self, point: MountPoint) -> &str {
        self.fragments.get(&point).map_or("", String::as_str)
    }

    pub fn set(&mut self, point: MountPoint, html: String) {
        self.fragments.insert(point, html);
    }

    pub fn reset(&mut self, point: MountPoint) {
        self.set(point, point.placeholder());
    }

    pub fn controls_disabled(&self) -> bool {
        self.controls_disabled
    }

    pub fn set_controls_disabled(&mut self, disabled: bool) {
        self.controls_disabled = disabled;
    }

    /// Standalone document exposing every mount point under its fixed id
    pub fn to_html(&self) -> String {
        let disabled = if self.controls_disabled { " disabled" } else { "" };
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n<title>Recipe rehab</title>\n</head>\n<body>\n");
        html.push_str(&format!(
            "<div class=\"controls\"><button id=\"go\" class=\"btn\"{d}>Rehab recipe</button> \
             <button id=\"scanOnly\" class=\"btn\"{d}>Scan only</button></div>\n",
            d = disabled
        ));

        html.push_str("<section class=\"card\">\n<h2>Detected issues</h2>\n");
        html.push_str(&self.mount("div", MountPoint::IssuesList, "stack"));
        html.push_str("<h2>Swap suggestions</h2>\n");
        html.push_str(&self.mount("div", MountPoint::SwapsList, "stack"));
        html.push_str("</section>\n");

        html.push_str("<section class=\"card\">\n");
        html.push_str(&self.mount("h2", MountPoint::OrigTitle, "recipeTitle"));
        html.push_str(&self.mount("div", MountPoint::OrigMeta, "subhead"));
        html.push_str("<h3>Ingredients</h3>\n");
        html.push_str(&self.mount("ul", MountPoint::OrigIngredients, "ingList"));
        html.push_str("<h3>Instructions</h3>\n");
        html.push_str(&self.mount("ol", MountPoint::OrigInstructions, "stepList"));
        html.push_str("</section>\n");

        html.push_str("<section class=\"card\">\n");
        html.push_str(&self.mount("h2", MountPoint::NewTitle, "recipeTitle"));
        html.push_str(&self.mount("div", MountPoint::NewMeta, "subhead"));
        html.push_str(&self.mount("div", MountPoint::SwapSummary, "rr-swapfast"));
        html.push_str("<h3>Ingredients</h3>\n");
        html.push_str(&self.mount("ul", MountPoint::NewIngredients, "ingList"));
        html.push_str("<h3>Instructions</h3>\n");
        html.push_str(&self.mount("ol", MountPoint::NewInstructions, "stepList"));
        html.push_str("<h3>Notes</h3>\n");
        html.push_str(&self.mount("ul", MountPoint::NewNotes, "noteList"));
        html.push_str("</section>\n");

        html.push_str("<section class=\"card\">\n<h2>Change log</h2>\n");
        html.push_str(&self.mount("ul", MountPoint::ChangeLog, "noteList"));
        html.push_str("</section>\n</body>\n</html>\n");
        html
    }

    fn mount(&self, tag: &str, point: MountPoint, class: &str) -> String {
        format!(
            "<{tag} id=\"{id}\" class=\"{class}\">{body}</{tag}>\n",
            tag = tag,
            id = point.id(),
            class = class,
            body = self.get(point)
        )
    }
}

/// Show the in-flight state and lock the submit controls
pub fn render_loading(page: &mut Page) {
    page.set_controls_disabled(true);
    page.set(MountPoint::IssuesList, muted_box("Working…"));
    page.set(MountPoint::SwapsList, muted_box("—"));
}

/// Show a single error message and return every other panel to neutral
pub fn render_error(page: &mut Page, message: &str) {
    for point in MountPoint::ALL {
        page.reset(point);
    }
    page.set(MountPoint::IssuesList, error_box(message));
}

/// Show a local validation message; no request was made, so the other
/// panels keep their content
pub fn render_input_error(page: &mut Page, message: &str) {
    page.set(MountPoint::IssuesList, error_box(message));
}

/// Render a successful payload into every panel
pub fn render_response(page: &mut Page, response: &RehabResponse, context: RequestContext) {
    let bad_terms = sections::bad_terms(response);

    match response.rewritten() {
        Some(_) => page.set(
            MountPoint::SwapSummary,
            sections::swap_summary(&swap_summary_lines(response)),
        ),
        None => page.reset(MountPoint::SwapSummary),
    }

    page.set(MountPoint::IssuesList, sections::issues(response));
    page.set(MountPoint::SwapsList, sections::swaps(response));

    let original = sections::original_recipe(response, &bad_terms);
    page.set(MountPoint::OrigTitle, original.title);
    page.set(MountPoint::OrigMeta, original.meta);
    page.set(MountPoint::OrigIngredients, original.ingredients);
    page.set(MountPoint::OrigInstructions, original.instructions);

    match sections::rewritten_recipe(response, &bad_terms, context) {
        Some(rewritten) => {
            page.set(MountPoint::NewTitle, rewritten.title);
            page.set(MountPoint::NewMeta, rewritten.meta);
            page.set(MountPoint::NewIngredients, rewritten.ingredients);
            page.set(MountPoint::NewInstructions, rewritten.instructions);
            page.set(MountPoint::NewNotes, rewritten.notes);
        }
        None => {
            for point in [
                MountPoint::NewTitle,
                MountPoint::NewMeta,
                MountPoint::NewIngredients,
                MountPoint::NewInstructions,
                MountPoint::NewNotes,
            ] {
                page.reset(point);
            }
        }
    }

    page.set(MountPoint::ChangeLog, sections::change_log(response));
}

fn muted_box(text: &str) -> String {
    format!("<div class=\"muted\">{}</div>", escape_html(text))
}

fn error_box(text: &str) -> String {
    format!("<div class=\"rr-error\">Error: {}</div>", escape_html(text))
}

fn placeholder_item() -> String {
    "<li class=\"muted\">—</li>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_page_is_neutral() {
        let page = Page::new();
        assert_eq!(page.get(MountPoint::IssuesList), "<div class=\"muted\">—</div>");
        assert_eq!(page.get(MountPoint::ChangeLog), "<li class=\"muted\">—</li>");
        assert_eq!(page.get(MountPoint::SwapSummary), "");
        assert!(!page.controls_disabled());
    }

    #[test]
    fn test_loading_disables_controls() {
        let mut page = Page::new();
        render_loading(&mut page);
        assert!(page.controls_disabled());
        assert!(page.get(MountPoint::IssuesList).contains("Working…"));
        assert!(page.to_html().contains("<button id=\"go\" class=\"btn\" disabled>"));
    }

    #[test]
    fn test_error_resets_other_panels() {
        let mut page = Page::new();
        let response = RehabResponse::from_value(json!({
            "ok": true,
            "dbIssues": [{"name": "canola oil", "category": "seed_oil"}],
            "original": {"title": "Cake", "ingredients": ["1 cup canola oil"]}
        }));
        render_response(&mut page, &response, RequestContext::default());
        assert!(page.get(MountPoint::OrigIngredients).contains("rr-bad"));

        render_error(&mut page, "Recipe <blocked>");
        assert_eq!(
            page.get(MountPoint::IssuesList),
            "<div class=\"rr-error\">Error: Recipe &lt;blocked&gt;</div>"
        );
        for point in MountPoint::ALL.into_iter().skip(1) {
            assert_eq!(page.get(point), point.placeholder(), "{:?}", point);
        }
    }

    #[test]
    fn test_every_mount_point_appears_once_in_document() {
        let html = Page::new().to_html();
        for point in MountPoint::ALL {
            let needle = format!("id=\"{}\"", point.id());
            assert_eq!(html.matches(&needle).count(), 1, "{}", point.id());
        }
    }
}
