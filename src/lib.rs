pub mod admin;
pub mod builder;
pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod render;
pub mod sweetener;
pub mod text;
pub mod transport;

pub use admin::{AdminClient, BadIngredient, ListKind, SwapRule};
pub use builder::{rehab, RecipeRehab, RecipeRehabBuilder, RehabRequest, RehabSession};
pub use config::RehabConfig;
pub use error::{RehabError, TransportError};
pub use identity::ClientIdentity;
pub use model::{Mode, Preferences, RehabResponse, Strictness};
pub use render::{MountPoint, Page};
pub use sweetener::{pick_sweetener, ProductCatalogEntry};
pub use transport::{JsonpClient, RehabTransport};

/// Rewrite a recipe with default settings and return the rendered page.
///
/// Settings come from `rehab.toml` and `REHAB__*` environment variables.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let page = recipe_rehab::rehab_recipe("https://example.com/recipe").await?;
/// println!("{}", page.to_html());
/// # Ok(())
/// # }
/// ```
pub async fn rehab_recipe(url: &str) -> Result<Page, RehabError> {
    RecipeRehab::builder().url(url).build().await
}

/// Scan a recipe for issues without rewriting it
pub async fn scan_recipe(url: &str) -> Result<Page, RehabError> {
    RecipeRehab::builder().url(url).scan_only().build().await
}
