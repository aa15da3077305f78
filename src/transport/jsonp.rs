use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::time::timeout;

use super::{Params, PendingCalls, RehabTransport};
use crate::config::RehabConfig;
use crate::error::TransportError;
use crate::identity::now_millis;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Calls the rehab service the way its web front end does: a GET with a
/// single-use `callback` name, answered by `callback(<json>)`.
pub struct JsonpClient {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    pending: PendingCalls,
}

impl JsonpClient {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let endpoint = Url::parse(endpoint).map_err(|e| TransportError::Url(e.to_string()))?;
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; RecipeRehab/0.3)")
            .build()?;

        Ok(Self {
            client,
            endpoint,
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
            pending: PendingCalls::new(),
        })
    }

    pub fn from_config(config: &RehabConfig) -> Result<Self, TransportError> {
        Self::new(&config.endpoint, Some(config.timeout()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Calls currently waiting for an answer
    pub fn pending(&self) -> &PendingCalls {
        &self.pending
    }

    /// Full request URL: endpoint, caller params, then `callback` and the
    /// cache-busting `_` timestamp
    pub fn request_url(&self, params: &Params, callback: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                if key == "callback" || key == "_" {
                    continue;
                }
                query.append_pair(key, value);
            }
            query.append_pair("callback", callback);
            query.append_pair("_", &now_millis().to_string());
        }
        url
    }

    fn callback_name() -> String {
        format!("__rr_cb_{:x}", rand::random::<u64>())
    }

    async fn load(&self, url: Url) -> Result<String, TransportError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RehabTransport for JsonpClient {
    fn transport_name(&self) -> &str {
        "jsonp"
    }

    async fn call(&self, params: Params) -> Result<Value, TransportError> {
        let call = loop {
            if let Some(call) = self.pending.register(Self::callback_name()) {
                break call;
            }
        };
        let url = self.request_url(&params, call.name());
        debug!("JSONP call {} to {}", call.name(), self.endpoint);

        let body = match timeout(self.timeout, self.load(url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                warn!("JSONP call {} failed: {:?}", call.name(), e);
                return Err(e);
            }
            Err(_) => {
                warn!("JSONP call {} timed out after {:?}", call.name(), self.timeout);
                return Err(TransportError::Timeout(self.timeout));
            }
        };

        let (callback, value) = parse_jsonp(&body)?;
        self.pending.dispatch(&callback, value)?;
        call.take().ok_or(TransportError::UnknownCallback(callback))
    }
}

/// Split a `name(<json>);` body into the callback name and its argument
pub fn parse_jsonp(body: &str) -> Result<(String, Value), TransportError> {
    let body = body.trim();
    let body = body.strip_prefix("/**/").unwrap_or(body).trim_start();

    let open = body
        .find('(')
        .ok_or_else(|| TransportError::MalformedResponse("no callback invocation".to_string()))?;
    let name = body[..open].trim();
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'));
    if !valid_name {
        return Err(TransportError::MalformedResponse(format!(
            "invalid callback name {:?}",
            name
        )));
    }

    let rest = body[open + 1..].trim_end();
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
    let argument = rest
        .strip_suffix(')')
        .ok_or_else(|| TransportError::MalformedResponse("unterminated invocation".to_string()))?;

    let value = serde_json::from_str(argument)
        .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_jsonp_variants() {
        let (name, value) = parse_jsonp("__rr_cb_1f({\"ok\":true})").unwrap();
        assert_eq!(name, "__rr_cb_1f");
        assert_eq!(value, json!({"ok": true}));

        let (name, value) = parse_jsonp("/**/ __rr_cb_2( {\"items\": [1, 2]} );\n").unwrap();
        assert_eq!(name, "__rr_cb_2");
        assert_eq!(value, json!({"items": [1, 2]}));
    }

    #[test]
    fn test_parse_jsonp_rejects_plain_json_and_html() {
        assert!(matches!(
            parse_jsonp("{\"ok\": true}"),
            Err(TransportError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_jsonp("<html><body>Sign in</body></html>"),
            Err(TransportError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_jsonp("__rr_cb_3({\"ok\": true}"),
            Err(TransportError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_request_url_appends_callback_and_timestamp() {
        let client = JsonpClient::new("https://example.com/macros/s/abc/exec?v=2", None).unwrap();
        let params = vec![
            ("action".to_string(), "rehab".to_string()),
            ("url".to_string(), "https://recipes.example/brownies?x=1&y=2".to_string()),
            ("callback".to_string(), "spoofed".to_string()),
        ];

        let url = client.request_url(&params, "__rr_cb_abc");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(pairs[0], ("v".to_string(), "2".to_string()));
        assert_eq!(pairs[1], ("action".to_string(), "rehab".to_string()));
        assert_eq!(
            pairs[2],
            (
                "url".to_string(),
                "https://recipes.example/brownies?x=1&y=2".to_string()
            )
        );
        assert_eq!(pairs[3], ("callback".to_string(), "__rr_cb_abc".to_string()));
        assert_eq!(pairs[4].0, "_");
        assert!(pairs[4].1.parse::<u128>().is_ok());
        assert_eq!(pairs.len(), 5);
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            JsonpClient::new("not a url", None),
            Err(TransportError::Url(_))
        ));
    }

    #[test]
    fn test_callback_names_are_distinct() {
        let a = JsonpClient::callback_name();
        let b = JsonpClient::callback_name();
        assert!(a.starts_with("__rr_cb_"));
        assert_ne!(a, b);
    }
}
