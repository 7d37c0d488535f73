//! Treasury CLI - Database migrations and admin account management.
//!
//! # Usage
//!
//! ```bash
//! # Bring the database schema up to date
//! treasury-cli migrate
//!
//! # Create an admin account
//! treasury-cli admin create -u treasurer -p "long passphrase" --superuser
//!
//! # List accounts
//! treasury-cli admin list
//!
//! # Delete an account (refused for the last superuser)
//! treasury-cli admin delete -u treasurer
//! ```
//!
//! # Environment Variables
//!
//! - `TREASURY_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "treasury-cli")]
#[command(author, version, about = "Treasury CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Username (3-32 chars: letters, digits, `.`, `-`, `_`)
        #[arg(short, long)]
        username: String,

        /// Password (min 8 chars)
        #[arg(short, long)]
        password: String,

        /// Grant the superuser role (may manage other admin accounts)
        #[arg(long)]
        superuser: bool,
    },
    /// List admin accounts
    List,
    /// Delete an admin account
    Delete {
        /// Username of the account to delete
        #[arg(short, long)]
        username: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                password,
                superuser,
            } => {
                commands::admin::create(&username, &password, superuser).await?;
            }
            AdminAction::List => commands::admin::list().await?,
            AdminAction::Delete { username } => commands::admin::delete(&username).await?,
        },
    }
    Ok(())
}
