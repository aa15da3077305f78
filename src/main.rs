use std::env;
use std::process::ExitCode;

use log::error;
use recipe_rehab::{AdminClient, JsonpClient, ListKind, Page, RecipeRehab, RehabConfig, RehabError};

const USAGE: &str = "Usage:\n  recipe-rehab [--scan] <recipe-url>\n  recipe-rehab --admin-list <bad|swaps>";

async fn admin_list(kind: &str) -> Result<(), RehabError> {
    let kind: ListKind = kind.parse()?;
    let config = RehabConfig::load()?;
    let token = config.admin_token.clone().unwrap_or_default();
    let transport = JsonpClient::from_config(&config)?;

    let items = AdminClient::new(&transport).list(&token, kind, 100).await?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn print_page(result: Result<Page, RehabError>) -> Result<(), RehabError> {
    let page = result?;
    println!("{}", page.to_html());
    Ok(())
}

async fn run(args: &[String]) -> Option<Result<(), RehabError>> {
    let outcome = match args {
        [flag, kind] if flag == "--admin-list" => admin_list(kind).await,
        [flag, url] if flag == "--scan" => {
            print_page(RecipeRehab::builder().url(url).scan_only().build().await)
        }
        [url] if !url.starts_with("--") => {
            print_page(RecipeRehab::builder().url(url).build().await)
        }
        _ => return None,
    };
    Some(outcome)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args).await {
        None => {
            eprintln!("{}", USAGE);
            ExitCode::from(2)
        }
        Some(Ok(())) => ExitCode::SUCCESS,
        Some(Err(e)) => {
            error!("{:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
