use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use extractos_api::{ProviderClient, ProviderConfig};
use extractos_core::{previous_business_day, today_in};
use extractos_ingest::read_accounts;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod export;
mod run;

#[derive(Parser, Debug)]
#[command(
    name = "extractos",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("EXTRACTOS_BUILD_SHA"), ")"),
    about = "Download daily bank statements and export them per bank"
)]
struct Cli {
    /// Settings file (default: ./extractos.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for extractos crates (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the previous business day's statements for every account and write the files
    Run {
        /// Statement date (default: previous business day)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Bank list (.xlsx/.xls/.ods/.csv) with "N°", "Cuenta" and optional "Entidad"
        #[arg(long)]
        accounts: Option<PathBuf>,

        /// Directory that receives the output folders
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the business day a run would fetch
    BusinessDay {
        /// Reference day (default: today in the configured timezone)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// IANA timezone (default: from settings)
        #[arg(long)]
        tz: Option<String>,
    },

    /// Write a default extractos.toml
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(build = env!("EXTRACTOS_BUILD_SHA"), "starting");

    match cli.command {
        Command::Run {
            date,
            accounts,
            out,
        } => {
            // Credentials first: nothing is read or created without them
            let provider = ProviderConfig::from_env()?;
            let settings = config::load_settings(cli.config.as_deref())?;

            let date = match date {
                Some(d) => d,
                None => previous_business_day(today_in(&settings.run.timezone)?),
            };

            let accounts_path = accounts.unwrap_or(settings.input.accounts);
            let accounts = read_accounts(&accounts_path)
                .with_context(|| format!("reading accounts from {}", accounts_path.display()))?;
            info!(count = accounts.len(), %date, "accounts loaded");

            let client = ProviderClient::new(provider)?;
            let output = run::OutputOptions {
                root: out.unwrap_or(settings.output.root),
                sheet_name: settings.output.sheet_name,
            };

            let summary = run::run(&client, &accounts, date, &output).await?;
            info!(
                exported = summary.exported.len(),
                without_activity = summary.without_activity.len(),
                "run complete"
            );
        }

        Command::BusinessDay { date, tz } => {
            let settings = config::load_settings(cli.config.as_deref())?;
            let tz = tz.unwrap_or(settings.run.timezone);
            let today = match date {
                Some(d) => d,
                None => today_in(&tz)?,
            };
            println!("{}", previous_business_day(today));
        }

        Command::InitConfig => {
            config::init_config(cli.config.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "extractos=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
