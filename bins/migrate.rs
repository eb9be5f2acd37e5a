//! One-time setup of an empty account: folder layout plus the template spreadsheet.
//!
//! Not idempotent. Running it against an account that already has the layout
//! creates a second set of folders.

use dotenvy::dotenv;
use tracing::{error, info};

use service::bootstrap::provision;
use service::store::FileStore;
use service::runtime;

async fn migrate(cfg: &configs::AppConfig) -> anyhow::Result<()> {
    let google = &cfg.google;
    let backends = runtime::connect(google)?;
    let sheets = backends.sheet_client();
    let report = provision(
        backends.files.as_ref(),
        &sheets,
        &google.folders,
        &google.template_name,
        google.project_owner.as_deref(),
    )
    .await?;
    info!(
        service = "migrate",
        event = "provisioned",
        itineraries = %report.folders.itineraries,
        archives = %report.folders.archives,
        templates = %report.folders.templates,
        template_id = %report.template.id,
        "folder layout and template created"
    );

    let files = backends.files.list_files(None, None).await?;
    println!("{}", serde_json::to_string_pretty(&files)?);
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let cfg = match configs::AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "migrate", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    if cfg.google.project_owner.is_none() {
        info!(service = "migrate", "PROJECT_OWNER not set; the folders stay private to the token's account");
    }

    match migrate(&cfg).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(service = "migrate", event = "failed", error = %e, "migration failed");
            std::process::ExitCode::FAILURE
        }
    }
}
