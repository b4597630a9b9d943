//! `DhunJam` venue admin console
//!
//! Signs a venue admin in and edits song-request pricing from the terminal.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Parser, Subcommand};
use dhunjam_admin::commands::{self, failure_message, parse_tier_amount};
use dhunjam_admin::{AppState, CommandStatus, Console, LoginForm, PricingEdits};
use dhunjam_core::{Amount, Config, PriceTier, Result, init_logging};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use validator::Validate;

/// Command line interface for the venue admin console
#[derive(Parser)]
#[command(
    name = "dhunjam-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Venue admin console for DhunJam song-request pricing",
    long_about = "Sign in as a venue admin, review what customers pay for song requests and update the custom and regular price tiers."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long, global = true)]
    json: bool,

    /// Backend base URL (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin password
        #[arg(short, long, env = "DHUNJAM_PASSWORD", hide_env_values = true)]
        password: String,

        /// Echo the password unmasked
        #[arg(long)]
        show_password: bool,
    },

    /// Forget the stored session
    Logout,

    /// Show the venue's current pricing
    Show,

    /// Edit pricing and optionally save it
    Pricing {
        /// Charge customers for song requests
        #[arg(long, value_parser = ["yes", "no"])]
        charge: Option<String>,

        /// Custom song request amount
        #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
        custom: Option<String>,

        /// Regular amount for category 7
        #[arg(long = "category-7", value_name = "AMOUNT", allow_hyphen_values = true)]
        category_7: Option<Amount>,

        /// Regular amount for category 8
        #[arg(long = "category-8", value_name = "AMOUNT", allow_hyphen_values = true)]
        category_8: Option<Amount>,

        /// Regular amount for category 9
        #[arg(long = "category-9", value_name = "AMOUNT", allow_hyphen_values = true)]
        category_9: Option<Amount>,

        /// Regular amount for category 10
        #[arg(long = "category-10", value_name = "AMOUNT", allow_hyphen_values = true)]
        category_10: Option<Amount>,

        /// Amount for any tier as TIER=AMOUNT, e.g. category_7=90 (repeatable)
        #[arg(long = "set", value_name = "TIER=AMOUNT", value_parser = tier_amount)]
        set: Vec<(PriceTier, Amount)>,

        /// Send the edited pricing to the backend
        #[arg(long)]
        save: bool,
    },

    /// Write the regular tier chart as an HTML page
    Chart {
        /// Output file (overrides config)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Main entry point for the admin console
#[tokio::main]
async fn main() -> ExitCode {
    // It's okay if .env doesn't exist
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(status) if status.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<CommandStatus> {
    let config = load_config(&cli)?;
    init_logging(&config.logging.level, &config.logging.format)?;

    let state = AppState::new(config)?;
    let mut console = Console::open(state.session_store())?;
    let api = &state.api_client;
    let (mut out, mut err) = (io::stdout(), io::stderr());

    match cli.command {
        Commands::Login {
            username,
            password,
            show_password,
        } => {
            let mut form = LoginForm::new(username, password);
            if show_password {
                form.toggle_password_visibility();
            }
            commands::login(&mut console, api, &form, &mut out).await
        }
        Commands::Logout => commands::logout(&mut console, &mut out),
        Commands::Show => commands::show(&console, api, &mut out, &mut err).await,
        Commands::Pricing {
            charge,
            custom,
            category_7,
            category_8,
            category_9,
            category_10,
            set,
            save,
        } => {
            let named = [
                (PriceTier::Category7, category_7),
                (PriceTier::Category8, category_8),
                (PriceTier::Category9, category_9),
                (PriceTier::Category10, category_10),
            ];
            let amounts = named
                .into_iter()
                .filter_map(|(tier, value)| value.map(|value| (tier, value)))
                .chain(set)
                .collect();
            let edits = PricingEdits {
                charge,
                custom,
                amounts,
                save,
            };
            commands::pricing(&console, api, &edits, &mut out, &mut err).await
        }
        Commands::Chart { output } => {
            let output = output.unwrap_or_else(|| state.config.chart.output.clone());
            commands::chart(&console, api, output, &mut out, &mut err).await
        }
    }
}

fn tier_amount(input: &str) -> std::result::Result<(PriceTier, Amount), String> {
    parse_tier_amount(input).map_err(|e| e.to_string())
}

/// Load configuration and apply command line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(base_url) = &cli.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }

    config.validate()?;
    Ok(config)
}
