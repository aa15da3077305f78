use std::time::Duration;

use log::{debug, warn};

use crate::config::RehabConfig;
use crate::error::RehabError;
use crate::identity::ClientIdentity;
use crate::model::{Mode, Preferences, RehabResponse};
use crate::render::{
    render_error, render_input_error, render_loading, render_response, Page, RequestContext,
};
use crate::transport::{JsonpClient, Params, RehabTransport};

/// One rehab request as sent to the service
#[derive(Debug, Clone)]
pub struct RehabRequest {
    pub recipe_url: String,
    pub mode: Mode,
    pub prefs: Preferences,
    pub client_id: ClientIdentity,
}

impl RehabRequest {
    pub fn params(&self) -> Result<Params, RehabError> {
        Ok(vec![
            ("action".to_string(), "rehab".to_string()),
            ("mode".to_string(), self.mode.as_str().to_string()),
            ("url".to_string(), self.recipe_url.trim().to_string()),
            ("clientId".to_string(), self.client_id.as_str().to_string()),
            ("prefs".to_string(), serde_json::to_string(&self.prefs)?),
        ])
    }
}

/// Send a rehab request and return the payload if the service accepted it
pub async fn rehab(
    transport: &dyn RehabTransport,
    request: &RehabRequest,
) -> Result<RehabResponse, RehabError> {
    let recipe_url = request.recipe_url.trim();
    if recipe_url.is_empty() {
        return Err(RehabError::EmptyUrl);
    }

    debug!(
        "Rehab {} via {}: {}",
        request.mode.as_str(),
        transport.transport_name(),
        recipe_url
    );
    let value = transport.call(request.params()?).await?;
    let response = RehabResponse::from_value(value);

    if !response.ok {
        let message = response.error_message("Unknown error.");
        warn!("Rehab service reported failure: {}", message);
        return Err(RehabError::Service(message));
    }
    Ok(response)
}

/// A rehab page bound to a transport. Each run renders over the same page,
/// so the last completed run determines what is shown.
pub struct RehabSession {
    transport: Box<dyn RehabTransport>,
    client_id: ClientIdentity,
    prefs: Preferences,
    page: Page,
}

impl RehabSession {
    pub fn new(
        transport: Box<dyn RehabTransport>,
        client_id: ClientIdentity,
        prefs: Preferences,
    ) -> Self {
        Self {
            transport,
            client_id,
            prefs,
            page: Page::new(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    pub fn prefs_mut(&mut self) -> &mut Preferences {
        &mut self.prefs
    }

    pub fn client_id(&self) -> &ClientIdentity {
        &self.client_id
    }

    pub fn transport(&self) -> &dyn RehabTransport {
        self.transport.as_ref()
    }

    /// Validate the URL, call the service and render the outcome.
    ///
    /// Controls are disabled while the call is in flight and re-enabled on
    /// every exit path. Errors are rendered and also returned.
    pub async fn run(&mut self, mode: Mode, recipe_url: &str) -> Result<(), RehabError> {
        let recipe_url = recipe_url.trim();
        if recipe_url.is_empty() {
            render_input_error(&mut self.page, &RehabError::EmptyUrl.to_string());
            return Err(RehabError::EmptyUrl);
        }

        let request = RehabRequest {
            recipe_url: recipe_url.to_string(),
            mode,
            prefs: self.prefs.clone(),
            client_id: self.client_id.clone(),
        };

        render_loading(&mut self.page);
        let outcome = rehab(self.transport.as_ref(), &request).await;
        self.page.set_controls_disabled(false);

        match outcome {
            Ok(response) => {
                let context = RequestContext {
                    mode,
                    strictness: request.prefs.strictness,
                };
                render_response(&mut self.page, &response, context);
                Ok(())
            }
            Err(e) => {
                render_error(&mut self.page, &e.to_string());
                Err(e)
            }
        }
    }
}

/// Builder for configuring and executing a rehab run
#[derive(Default)]
pub struct RecipeRehabBuilder {
    url: Option<String>,
    mode: Mode,
    prefs: Option<Preferences>,
    client_id: Option<ClientIdentity>,
    transport: Option<Box<dyn RehabTransport>>,
    config: Option<RehabConfig>,
    timeout: Option<Duration>,
}

impl RecipeRehabBuilder {
    /// Set the recipe URL to rehab
    ///
    /// # Example
    /// ```
    /// use recipe_rehab::RecipeRehab;
    ///
    /// let builder = RecipeRehab::builder()
    ///     .url("https://example.com/recipe");
    /// ```
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Only scan for issues; the service does not rewrite the recipe
    pub fn scan_only(mut self) -> Self {
        self.mode = Mode::Scan;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the preference toggles sent with the request
    ///
    /// # Example
    /// ```
    /// use recipe_rehab::{Preferences, RecipeRehab, Strictness};
    ///
    /// let builder = RecipeRehab::builder()
    ///     .url("https://example.com/recipe")
    ///     .prefs(Preferences {
    ///         lower_added_sugar: true,
    ///         strictness: Strictness::Strict,
    ///         ..Default::default()
    ///     });
    /// ```
    pub fn prefs(mut self, prefs: Preferences) -> Self {
        self.prefs = Some(prefs);
        self
    }

    /// Use this client id instead of the persisted one
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(ClientIdentity::from(client_id.into()));
        self
    }

    /// Use a custom transport instead of the configured JSONP endpoint
    pub fn transport(mut self, transport: impl RehabTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Use this configuration instead of loading `rehab.toml` and `REHAB__*`
    pub fn config(mut self, config: RehabConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a timeout for the service call
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Resolve configuration, client id and transport into a session
    /// without running it. Returns the session and the configured URL.
    pub async fn build_session(self) -> Result<(RehabSession, String), RehabError> {
        let url = self.url.ok_or_else(|| {
            RehabError::BuilderError("No recipe URL specified. Use .url()".to_string())
        })?;

        let needs_config =
            self.transport.is_none() || self.client_id.is_none() || self.prefs.is_none();
        let config = match (self.config, needs_config) {
            (Some(config), _) => config,
            (None, true) => RehabConfig::load()?,
            (None, false) => RehabConfig::default(),
        };

        let transport: Box<dyn RehabTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let timeout = self.timeout.unwrap_or_else(|| config.timeout());
                Box::new(JsonpClient::new(&config.endpoint, Some(timeout))?)
            }
        };

        let client_id = match self.client_id {
            Some(id) => id,
            None => ClientIdentity::load_or_create(&config.client_id_path).await?,
        };

        let prefs = self.prefs.unwrap_or_else(|| config.preferences());

        Ok((RehabSession::new(transport, client_id, prefs), url))
    }

    /// Build and execute the rehab run
    ///
    /// # Returns
    /// The rendered `Page`
    ///
    /// # Errors
    /// Returns `RehabError` if:
    /// - No URL was specified, or it is blank
    /// - The service call fails or times out
    /// - The service answers with `ok: false`
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_rehab::RecipeRehab;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let page = RecipeRehab::builder()
    ///     .url("https://example.com/recipe")
    ///     .build()
    ///     .await?;
    /// println!("{}", page.to_html());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<Page, RehabError> {
        let mode = self.mode;
        let (mut session, url) = self.build_session().await?;
        session.run(mode, &url).await?;
        Ok(session.into_page())
    }
}

/// Main entry point for the builder API
pub struct RecipeRehab;

impl RecipeRehab {
    /// Creates a new builder for a rehab run
    ///
    /// # Example
    /// ```
    /// use recipe_rehab::RecipeRehab;
    ///
    /// let builder = RecipeRehab::builder();
    /// ```
    pub fn builder() -> RecipeRehabBuilder {
        RecipeRehabBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::render::MountPoint;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Scripted {
        reply: Result<Value, String>,
        calls: Arc<Mutex<Vec<Params>>>,
    }

    #[async_trait]
    impl RehabTransport for Scripted {
        fn transport_name(&self) -> &str {
            "scripted"
        }

        async fn call(&self, params: Params) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(params);
            self.reply
                .clone()
                .map_err(TransportError::MalformedResponse)
        }
    }

    fn scripted(reply: Result<Value, String>) -> Scripted {
        Scripted {
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[tokio::test]
    async fn test_request_params() {
        let transport = scripted(Ok(json!({"ok": true})));
        let calls = transport.calls.clone();

        RecipeRehab::builder()
            .url("  https://recipes.example/cake  ")
            .scan_only()
            .client_id("c_1_2")
            .prefs(Preferences::default())
            .transport(transport)
            .build()
            .await
            .unwrap();

        let calls = calls.lock().unwrap();
        let params: Vec<(&str, &str)> = calls[0]
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(params[0], ("action", "rehab"));
        assert_eq!(params[1], ("mode", "scan"));
        assert_eq!(params[2], ("url", "https://recipes.example/cake"));
        assert_eq!(params[3], ("clientId", "c_1_2"));
        assert!(params[4].1.contains("\"strictness\":\"balanced\""));
    }

    #[tokio::test]
    async fn test_blank_url_blocks_request() {
        let transport = scripted(Ok(json!({"ok": true})));
        let calls = transport.calls.clone();
        let mut session = RehabSession::new(
            Box::new(transport),
            ClientIdentity::from("c_1_2".to_string()),
            Preferences::default(),
        );

        let result = session.run(Mode::Rewrite, "   ").await;
        assert!(matches!(result, Err(RehabError::EmptyUrl)));
        assert!(calls.lock().unwrap().is_empty());
        assert!(session
            .page()
            .get(MountPoint::IssuesList)
            .contains("Please paste a recipe URL."));
        assert!(!session.page().controls_disabled());
    }

    #[tokio::test]
    async fn test_service_failure_renders_error() {
        let transport = scripted(Ok(json!({"ok": false, "error": {"message": "Blocked &amp; logged"}})));
        let mut session = RehabSession::new(
            Box::new(transport),
            ClientIdentity::from("c_1_2".to_string()),
            Preferences::default(),
        );

        let result = session.run(Mode::Rewrite, "https://recipes.example/cake").await;
        assert!(matches!(result, Err(RehabError::Service(ref m)) if m == "Blocked & logged"));
        assert_eq!(
            session.page().get(MountPoint::IssuesList),
            "<div class=\"rr-error\">Error: Blocked &amp; logged</div>"
        );
        assert_eq!(
            session.page().get(MountPoint::SwapsList),
            "<div class=\"muted\">—</div>"
        );
        assert!(!session.page().controls_disabled());
    }

    #[tokio::test]
    async fn test_transport_failure_renders_message() {
        let transport = scripted(Err("truncated".to_string()));
        let mut session = RehabSession::new(
            Box::new(transport),
            ClientIdentity::from("c_1_2".to_string()),
            Preferences::default(),
        );

        let result = session.run(Mode::Scan, "https://recipes.example/cake").await;
        assert!(matches!(result, Err(RehabError::Transport(_))));
        assert!(session
            .page()
            .get(MountPoint::IssuesList)
            .contains("Malformed JSONP response: truncated"));
    }

    #[tokio::test]
    async fn test_rehab_sends_trimmed_url() {
        let transport = scripted(Ok(json!({"ok": true})));
        let request = RehabRequest {
            recipe_url: "  https://recipes.example/stew  ".to_string(),
            mode: Mode::Rewrite,
            prefs: Preferences::default(),
            client_id: ClientIdentity::from("c_1_2".to_string()),
        };

        rehab(&transport, &request).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        let url = calls[0].iter().find(|(k, _)| k == "url").map(|(_, v)| v.as_str());
        assert_eq!(url, Some("https://recipes.example/stew"));
    }

    #[tokio::test]
    async fn test_prefs_fall_back_to_config_toggles() {
        let transport = scripted(Ok(json!({"ok": true})));
        let calls = transport.calls.clone();
        let config = RehabConfig {
            lower_added_sugar: true,
            avoid_artificial_dyes: true,
            strictness: crate::model::Strictness::Strict,
            ..Default::default()
        };

        RecipeRehab::builder()
            .url("https://recipes.example/cake")
            .config(config)
            .client_id("c_1_2")
            .transport(transport)
            .build()
            .await
            .unwrap();

        let calls = calls.lock().unwrap();
        let prefs = calls[0].iter().find(|(k, _)| k == "prefs").map(|(_, v)| v.clone()).unwrap();
        let prefs: Value = serde_json::from_str(&prefs).unwrap();
        assert_eq!(
            prefs,
            json!({
                "avoidSeedOils": false,
                "lowerAddedSugar": true,
                "avoidArtificialDyes": true,
                "avoidUltraProcessed": false,
                "strictness": "strict"
            })
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_builder_error() {
        let result = RecipeRehab::builder()
            .transport(scripted(Ok(json!({"ok": true}))))
            .build()
            .await;
        assert!(matches!(result, Err(RehabError::BuilderError(_))));
    }
}
