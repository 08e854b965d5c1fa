//! BeerBro CLI - Database migrations, catalog seeding and admin claims.
//!
//! # Usage
//!
//! ```bash
//! # Create the document table and the session table
//! bb-cli migrate
//!
//! # Load the built-in sample catalog, wiping the catalog first
//! bb-cli seed --reset
//!
//! # Load a catalog from a file
//! bb-cli seed --file catalog.json
//!
//! # Grant, revoke or inspect the admin claim
//! bb-cli admin grant ada@example.com
//! bb-cli admin revoke ada@example.com
//! bb-cli admin show ada@example.com
//!
//! # Create an account that already holds the admin claim
//! bb-cli admin create -e ops@example.com -p 'a long passphrase' -n "Ops"
//! ```
//!
//! # Environment Variables
//!
//! - `BEERBRO_DATABASE_URL` - `PostgreSQL` connection string, falls back to
//!   `DATABASE_URL`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bb-cli")]
#[command(author, version, about = "BeerBro operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load categories, products and service locations
    Seed {
        /// Catalog JSON file (defaults to the built-in sample catalog)
        #[arg(short, long)]
        file: Option<String>,

        /// Remove existing categories, products and locations first
        #[arg(long)]
        reset: bool,
    },
    /// Manage the admin claim
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give an existing user the admin claim
    Grant {
        /// Account email address
        email: String,
    },
    /// Take the admin claim away from a user
    Revoke {
        /// Account email address
        email: String,
    },
    /// Print a user's claims
    Show {
        /// Account email address
        email: String,
    },
    /// Create a new account holding the admin claim
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bb_cli=info,beerbro_storefront=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, reset } => {
            commands::seed::run(file.as_deref(), reset).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => commands::admin::grant(&email).await?,
            AdminAction::Revoke { email } => commands::admin::revoke(&email).await?,
            AdminAction::Show { email } => commands::admin::show(&email).await?,
            AdminAction::Create {
                email,
                password,
                name,
            } => commands::admin::create(&email, &password, name.as_deref()).await?,
        },
    }
    Ok(())
}
