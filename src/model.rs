use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::text::normalize_for_display;

/// How hard the service should push when flagging ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Lenient,
    #[default]
    Balanced,
    Strict,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Lenient => "lenient",
            Strictness::Balanced => "balanced",
            Strictness::Strict => "strict",
        }
    }
}

/// User toggles sent with every rehab request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub avoid_seed_oils: bool,
    pub lower_added_sugar: bool,
    pub avoid_artificial_dyes: bool,
    pub avoid_ultra_processed: bool,
    pub strictness: Strictness,
}

/// Whether the service should rewrite the recipe or only scan it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Rewrite,
    Scan,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Rewrite => "rewrite",
            Mode::Scan => "scan",
        }
    }
}

/// Payload returned by the rehab service for one request.
///
/// Every field is optional on the wire. Fields of the wrong JSON type are
/// treated as absent, and malformed list elements are dropped, so parsing an
/// object never fails.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RehabResponse {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub ok: bool,
    #[serde(default, deserialize_with = "lenient_object")]
    pub error: Option<ServiceError>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub db_issues: Vec<DbIssue>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub result: Option<RehabResult>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub swap_suggestions: Vec<SwapSuggestion>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub extracted: Option<ExtractedSource>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub original: Option<RecipeText>,
    /// Older deployments send the original recipe under `recipe`
    #[serde(default, deserialize_with = "lenient_object")]
    pub recipe: Option<RecipeText>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub prefs: Option<EchoedPrefs>,
    /// Records returned by admin list calls
    #[serde(default, deserialize_with = "lenient_values")]
    pub items: Vec<Value>,
}

impl RehabResponse {
    /// Interpret an arbitrary JSON value as a response. Non-objects yield a
    /// response with `ok == false`.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            warn!("Rehab payload is not a JSON object");
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Failed to read rehab payload: {}", e);
            Self::default()
        })
    }

    /// Display-normalized failure message for an `ok: false` payload
    pub fn error_message(&self, fallback: &str) -> String {
        let message = self
            .error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .map(normalize_for_display)
            .unwrap_or_default();
        if message.is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }

    pub fn original_recipe(&self) -> Option<&RecipeText> {
        self.original.as_ref().or(self.recipe.as_ref())
    }

    pub fn ai_issues(&self) -> &[AiIssue] {
        self.result.as_ref().map_or(&[], |r| r.issues.as_slice())
    }

    pub fn rewritten(&self) -> Option<&RewrittenRecipe> {
        self.result.as_ref().and_then(|r| r.rewritten.as_ref())
    }

    pub fn change_log(&self) -> &[ChangeLogEntry] {
        self.result.as_ref().map_or(&[], |r| r.change_log.as_slice())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
}

/// An ingredient matched against the curated bad-ingredient table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbIssue {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub match_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RehabResult {
    #[serde(default, deserialize_with = "lenient_list")]
    pub issues: Vec<AiIssue>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub rewritten: Option<RewrittenRecipe>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub change_log: Vec<ChangeLogEntry>,
}

/// An issue found by the model rather than the curated table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiIssue {
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub finding: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub why: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub evidence: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub recommended_fix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSuggestion {
    #[serde(default, deserialize_with = "lenient_text")]
    pub trigger: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub swap_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ratio_note: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub constraint: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub avoid_if: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub taste_note: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSource {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub used_json_ld: bool,
}

/// Recipe as scraped from the source page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeText {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewrittenRecipe {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub servings: Option<String>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub instructions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub change: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub taste_impact: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub function_impact: Option<String>,
}

/// Preferences as echoed back by the service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EchoedPrefs {
    #[serde(default, deserialize_with = "lenient_text")]
    pub strictness: Option<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().filter_map(scalar_text).collect()),
        _ => Ok(Vec::new()),
    }
}

fn lenient_values<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}
