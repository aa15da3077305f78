//! Curated-table maintenance calls: add a bad ingredient, add a swap rule,
//! list either table.

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::error::RehabError;
use crate::model::RehabResponse;
use crate::text::normalize_for_display;
use crate::transport::{Params, RehabTransport};

/// A row for the bad-ingredient table
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadIngredient {
    pub name: String,
    pub category: String,
    pub notes: String,
    pub match_type: String,
}

/// A row for the swap-rule table
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRule {
    /// Comma separated trigger terms
    pub triggers: String,
    pub swap_to: String,
    pub constraint: String,
    pub ratio_note: String,
    pub avoid_if: String,
    pub taste_note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bad,
    Swaps,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Bad => "bad",
            ListKind::Swaps => "swaps",
        }
    }
}

impl std::str::FromStr for ListKind {
    type Err = RehabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bad" => Ok(ListKind::Bad),
            "swaps" => Ok(ListKind::Swaps),
            other => Err(RehabError::BuilderError(format!(
                "Unknown list type '{}', expected 'bad' or 'swaps'",
                other
            ))),
        }
    }
}

#[derive(Serialize)]
struct ListPayload {
    #[serde(rename = "type")]
    kind: &'static str,
    limit: u32,
}

/// Admin operations over any transport
pub struct AdminClient<'a> {
    transport: &'a dyn RehabTransport,
}

impl<'a> AdminClient<'a> {
    pub fn new(transport: &'a dyn RehabTransport) -> Self {
        Self { transport }
    }

    pub async fn add_bad_ingredient(
        &self,
        token: &str,
        row: &BadIngredient,
    ) -> Result<RehabResponse, RehabError> {
        let response = self.call(token, "admin_addBad", row).await?;
        info!("Added bad ingredient '{}'", row.name);
        Ok(response)
    }

    pub async fn add_swap_rule(
        &self,
        token: &str,
        rule: &SwapRule,
    ) -> Result<RehabResponse, RehabError> {
        let response = self.call(token, "admin_addSwap", rule).await?;
        info!("Added swap rule '{}' -> '{}'", rule.triggers, rule.swap_to);
        Ok(response)
    }

    pub async fn list(
        &self,
        token: &str,
        kind: ListKind,
        limit: u32,
    ) -> Result<Vec<Value>, RehabError> {
        let payload = ListPayload {
            kind: kind.as_str(),
            limit,
        };
        let response = self.call(token, "admin_list", &payload).await?;
        Ok(response.items)
    }

    async fn call<P: Serialize + Sync>(
        &self,
        token: &str,
        action: &str,
        payload: &P,
    ) -> Result<RehabResponse, RehabError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(RehabError::MissingAdminToken);
        }

        let params: Params = vec![
            ("action".to_string(), action.to_string()),
            ("token".to_string(), token.to_string()),
            ("payload".to_string(), serde_json::to_string(payload)?),
        ];
        let value = self.transport.call(params).await?;
        let response = RehabResponse::from_value(value);
        if !response.ok {
            let message = response.error_message("Failed.");
            warn!("Admin call {} rejected: {}", action, message);
            return Err(RehabError::Service(message));
        }
        Ok(response)
    }
}

/// Status line for an add-bad-ingredient control
pub fn bad_ingredient_status(row: &BadIngredient, result: &Result<RehabResponse, RehabError>) -> String {
    match result {
        Ok(_) => format!("✅ Added: {}", row.name.trim()),
        Err(e) => format!("❌ {}", normalize_for_display(&e.to_string())),
    }
}

/// Status line for an add-swap-rule control
pub fn swap_rule_status(rule: &SwapRule, result: &Result<RehabResponse, RehabError>) -> String {
    match result {
        Ok(_) => format!(
            "✅ Added swap: {} → {}",
            rule.triggers.trim(),
            rule.swap_to.trim()
        ),
        Err(e) => format!("❌ {}", normalize_for_display(&e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recorder {
        reply: Value,
        seen: Mutex<Vec<Params>>,
    }

    #[async_trait]
    impl RehabTransport for Recorder {
        fn transport_name(&self) -> &str {
            "recorder"
        }

        async fn call(&self, params: Params) -> Result<Value, TransportError> {
            self.seen.lock().unwrap().push(params);
            Ok(self.reply.clone())
        }
    }

    fn recorder(reply: Value) -> Recorder {
        Recorder {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn param<'p>(params: &'p Params, key: &str) -> &'p str {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_bad_ingredient_sends_payload() {
        let transport = recorder(json!({"ok": true}));
        let row = BadIngredient {
            name: "canola oil".to_string(),
            category: "seed_oil".to_string(),
            notes: String::new(),
            match_type: "contains".to_string(),
        };

        let result = AdminClient::new(&transport).add_bad_ingredient(" tok ", &row).await;
        assert_eq!(bad_ingredient_status(&row, &result), "✅ Added: canola oil");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(param(&seen[0], "action"), "admin_addBad");
        assert_eq!(param(&seen[0], "token"), "tok");
        let payload: Value = serde_json::from_str(param(&seen[0], "payload")).unwrap();
        assert_eq!(payload["matchType"], "contains");
        assert_eq!(payload["name"], "canola oil");
    }

    #[tokio::test]
    async fn test_missing_token_skips_request() {
        let transport = recorder(json!({"ok": true}));
        let rule = SwapRule {
            triggers: "sugar".to_string(),
            swap_to: "monk fruit".to_string(),
            ..Default::default()
        };

        let result = AdminClient::new(&transport).add_swap_rule("  ", &rule).await;
        assert!(matches!(result, Err(RehabError::MissingAdminToken)));
        assert_eq!(swap_rule_status(&rule, &result), "❌ Missing admin token.");
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_service_rejection_message() {
        let transport = recorder(json!({"ok": false, "error": {"message": "Bad token"}}));
        let rule = SwapRule::default();
        let result = AdminClient::new(&transport).add_swap_rule("tok", &rule).await;
        assert_eq!(swap_rule_status(&rule, &result), "❌ Bad token");

        let transport = recorder(json!({"ok": false}));
        let result = AdminClient::new(&transport).add_swap_rule("tok", &rule).await;
        assert_eq!(swap_rule_status(&rule, &result), "❌ Failed.");
    }

    #[tokio::test]
    async fn test_list_returns_items() {
        let transport = recorder(json!({"ok": true, "items": [{"name": "Red 40"}]}));
        let items = AdminClient::new(&transport)
            .list("tok", ListKind::Swaps, 100)
            .await
            .unwrap();
        assert_eq!(items, vec![json!({"name": "Red 40"})]);

        let seen = transport.seen.lock().unwrap();
        assert_eq!(param(&seen[0], "payload"), r#"{"type":"swaps","limit":100}"#);
    }

    #[test]
    fn test_list_kind_from_str() {
        assert_eq!("bad".parse::<ListKind>().unwrap(), ListKind::Bad);
        assert!("rules".parse::<ListKind>().is_err());
    }
}
