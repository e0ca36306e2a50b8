use alerter::EmailAlerter;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use configuration::Settings;
use core_types::{NewUser, UserRole};
use database::{CleanupReport, DbRepository, HrStore, InMemoryRepository};
use std::sync::Arc;

/// The main entry point for the District HR application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; settings can come from config.toml or the
    // process environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = configuration::load_settings(&cli.config)?;
    let _log_guard = configuration::init_tracing(&settings.logging);

    match cli.command {
        Commands::Serve(args) => handle_serve(settings, args).await,
        Commands::Cleanup => handle_cleanup(settings).await,
        Commands::CreateUser(args) => handle_create_user(settings, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Back-office HR service for a school district.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the optional TOML settings file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Delete every row from the HR tables (user accounts are kept).
    Cleanup,
    /// Create a staff login.
    CreateUser(CreateUserArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Keep all data in memory instead of Postgres.
    #[arg(long)]
    in_memory: bool,
}

#[derive(Parser)]
struct CreateUserArgs {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,

    #[arg(long)]
    full_name: String,

    #[arg(long)]
    email: Option<String>,

    /// One of employee, secretary, admin, hr, payroll.
    #[arg(long, default_value = "employee")]
    role: String,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn postgres_store(settings: &Settings) -> anyhow::Result<Arc<dyn HrStore>> {
    let pool = database::connect(&settings.database).await?;
    database::run_migrations(&pool).await?;
    Ok(Arc::new(DbRepository::new(pool)))
}

async fn handle_serve(settings: Settings, args: ServeArgs) -> anyhow::Result<()> {
    settings.validate(args.in_memory)?;

    let store: Arc<dyn HrStore> = if args.in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit.");
        Arc::new(InMemoryRepository::new())
    } else {
        postgres_store(&settings).await?
    };

    let alerter = EmailAlerter::new(&settings.smtp);
    web_server::run_server(&settings, store, alerter).await
}

async fn handle_cleanup(settings: Settings) -> anyhow::Result<()> {
    settings.validate(false)?;

    let store = postgres_store(&settings).await?;
    let report = database::run_cleanup(store.as_ref()).await;
    println!("{}", render_report(&report));

    if !report.is_clean() {
        for error in &report.errors {
            eprintln!("  - {error}");
        }
        anyhow::bail!("Cleanup finished with {} error(s).", report.errors.len());
    }
    Ok(())
}

async fn handle_create_user(settings: Settings, args: CreateUserArgs) -> anyhow::Result<()> {
    settings.validate(false)?;

    let new_user = NewUser {
        username: args.username,
        password: args.password,
        full_name: args.full_name,
        email: args.email,
        role: args.role.parse::<UserRole>()?,
    };
    new_user.validate()?;
    let hash = web_server::auth::hash_password(&new_user.password)?;

    let store = postgres_store(&settings).await?;
    let user = store.create_user(&new_user, &hash).await?;
    println!("Created user '{}' (id {}, role {}).", user.username, user.id, user.role);
    Ok(())
}

fn render_report(report: &CleanupReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Table", "Rows deleted"]);
    for entry in &report.tables {
        table.add_row(vec![Cell::new(&entry.table), Cell::new(entry.rows_deleted)]);
    }
    table.add_row(vec![Cell::new("TOTAL"), Cell::new(report.rows_deleted)]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::TableCleanup;

    #[test]
    fn cli_parses_serve_in_memory() {
        let cli = Cli::try_parse_from(["district-hr", "serve", "--in-memory"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve(ServeArgs { in_memory: true })));
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn cli_parses_create_user() {
        let cli = Cli::try_parse_from([
            "district-hr",
            "create-user",
            "--username",
            "payroll.lead",
            "--password",
            "s3cret-pass",
            "--full-name",
            "Payroll Lead",
            "--role",
            "payroll",
        ])
        .unwrap();
        let Commands::CreateUser(args) = cli.command else {
            panic!("expected create-user");
        };
        assert_eq!(args.username, "payroll.lead");
        assert_eq!(args.role, "payroll");
        assert!(args.email.is_none());
    }

    #[test]
    fn report_table_lists_every_table_and_total() {
        let report = CleanupReport {
            rows_deleted: 5,
            tables: vec![
                TableCleanup { table: "timecards".to_string(), rows_deleted: 3 },
                TableCleanup { table: "employees".to_string(), rows_deleted: 2 },
            ],
            errors: vec![],
        };
        let rendered = render_report(&report).to_string();
        assert!(rendered.contains("timecards"));
        assert!(rendered.contains("employees"));
        assert!(rendered.contains("TOTAL"));
    }
}
