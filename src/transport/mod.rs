mod jsonp;
mod pending;

pub use jsonp::{parse_jsonp, JsonpClient};
pub use pending::{PendingCall, PendingCalls};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Query parameters for one call, in insertion order
pub type Params = Vec<(String, String)>;

/// Anything that can carry a request to the rehab service and hand back its
/// JSON payload
#[async_trait]
pub trait RehabTransport: Send + Sync {
    /// Short name used in log lines
    fn transport_name(&self) -> &str;

    /// Perform one call with the given query parameters
    async fn call(&self, params: Params) -> Result<Value, TransportError>;
}
