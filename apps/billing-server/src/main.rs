use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use billing::{config::BillingConfig, factory, Billing};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};

mod db;
mod http;
mod shutdown;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Billing Server - customers and invoices over REST
#[derive(Parser)]
#[command(name = "billing-server")]
#[command(about = "Billing Server - customers and invoices over REST")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use a private in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply database migrations and exit
    Migrate,
    /// Apply migrations and fill the database with demo customers and invoices
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Billing Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
        Commands::Migrate => migrate(config, args).await.map(|_| ()),
        Commands::Seed => seed(config, args).await,
    }
}

/// Connect, build the billing module, and bring the schema up to date.
async fn migrate(config: AppConfig, args: CliArgs) -> Result<(AppConfig, Billing)> {
    let billing_cfg: BillingConfig = config.module_config("billing")?;
    let conn = db::connect(
        config.database.as_ref(),
        Path::new(&config.server.home_dir),
        args.mock,
    )
    .await?;

    let billing = Billing::new(conn, &billing_cfg);
    billing.migrate().await?;
    tracing::info!("Database schema is up to date");
    Ok((config, billing))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let (config, billing) = migrate(config, args).await?;
    let router = http::build_router(&billing, &config.server);
    http::serve(router, &config.server).await
}

async fn seed(config: AppConfig, args: CliArgs) -> Result<()> {
    let (_, billing) = migrate(config, args).await?;
    let summary = factory::seed(&billing.service(), factory::SEED_PLAN)
        .await
        .context("Seeding failed")?;
    println!(
        "Seeded {} customers and {} invoices",
        summary.customers, summary.invoices
    );
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let _: BillingConfig = config.module_config("billing")?;
    if let Some(database) = &config.database {
        let backend = db::detect_from_dsn(&database.url)?;
        tracing::info!("Database backend: {}", backend);
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
