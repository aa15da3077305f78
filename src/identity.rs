use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use tokio::fs;

use crate::error::RehabError;

/// Milliseconds since the Unix epoch
pub(crate) fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Opaque per-installation token the service uses for correlation and rate
/// limiting. Format: `c_<random hex>_<creation millis hex>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn generate() -> Self {
        Self(format!("c_{:x}_{:x}", rand::random::<u64>(), now_millis()))
    }

    /// Read the token stored at `path`, creating and persisting one if the
    /// file is missing or blank
    pub async fn load_or_create(path: impl AsRef<Path>) -> Result<Self, RehabError> {
        let path = path.as_ref();

        match fs::read_to_string(path).await {
            Ok(stored) if !stored.trim().is_empty() => {
                debug!("Using client id from {}", path.display());
                return Ok(Self(stored.trim().to_string()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let identity = Self::generate();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, &identity.0).await?;
        info!("Created client id at {}", path.display());
        Ok(identity)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ClientIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
