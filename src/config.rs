use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::model::{Preferences, Strictness};

/// Published web-app endpoint of the rehab service
pub const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbwHit5eCifvBli8xuQyuQ25xUYF61p5HeuMFbQwAuH3A4ZKFvgiGRfYE4IQ5G3oVF81/exec";

/// Runtime configuration for the rehab client
#[derive(Debug, Deserialize, Clone)]
pub struct RehabConfig {
    /// Base URL of the rehab service (`/exec` deployment)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// File holding the persisted client identity token
    #[serde(default = "default_client_id_path")]
    pub client_id_path: String,
    /// Strictness sent with every rehab request
    #[serde(default)]
    pub strictness: Strictness,
    /// Preference toggles sent when the caller does not set its own
    #[serde(default)]
    pub avoid_seed_oils: bool,
    #[serde(default)]
    pub lower_added_sugar: bool,
    #[serde(default)]
    pub avoid_artificial_dyes: bool,
    #[serde(default)]
    pub avoid_ultra_processed: bool,
    /// Access token for admin calls
    pub admin_token: Option<String>,
}

impl Default for RehabConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            client_id_path: default_client_id_path(),
            strictness: Strictness::default(),
            avoid_seed_oils: false,
            lower_added_sugar: false,
            avoid_artificial_dyes: false,
            avoid_ultra_processed: false,
            admin_token: None,
        }
    }
}

// Default value functions
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    25
}

fn default_client_id_path() -> String {
    ".rr_client_id".to_string()
}

impl RehabConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with REHAB__ prefix
    /// 2. rehab.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: REHAB__ADMIN_TOKEN
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Request preferences built from the configured toggles
    pub fn preferences(&self) -> Preferences {
        Preferences {
            avoid_seed_oils: self.avoid_seed_oils,
            lower_added_sugar: self.lower_added_sugar,
            avoid_artificial_dyes: self.avoid_artificial_dyes,
            avoid_ultra_processed: self.avoid_ultra_processed,
            strictness: self.strictness,
        }
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<RehabConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("rehab").required(false))
        // Use double underscore for nested keys: REHAB__CLIENT_ID_PATH
        .add_source(
            Environment::with_prefix("REHAB")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
