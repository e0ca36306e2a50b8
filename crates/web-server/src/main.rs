use alerter::EmailAlerter;
use database::{DbRepository, HrStore, InMemoryRepository};
use std::sync::Arc;

// Entry point for `cargo run -p web-server`. Pass `--in-memory` (or set
// HR_IN_MEMORY=1) to run without Postgres.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = configuration::load_settings("config.toml")?;
    let _log_guard = configuration::init_tracing(&settings.logging);

    let in_memory = std::env::args().any(|a| a == "--in-memory")
        || std::env::var("HR_IN_MEMORY").is_ok_and(|v| v == "1" || v == "true");
    settings.validate(in_memory)?;

    let store: Arc<dyn HrStore> = if in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit.");
        Arc::new(InMemoryRepository::new())
    } else {
        let pool = database::connect(&settings.database).await?;
        database::run_migrations(&pool).await?;
        Arc::new(DbRepository::new(pool))
    };

    let alerter = EmailAlerter::new(&settings.smtp);
    web_server::run_server(&settings, store, alerter).await
}
