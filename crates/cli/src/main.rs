//! Marketplace CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations
//! mp-cli migrate
//!
//! # Create a superuser
//! mp-cli user createsuperuser -e admin@example.com -p 'correct horse battery'
//!
//! # Issue and redeem a confirmation token
//! mp-cli token issue -e buyer@example.com
//! mp-cli token confirm <KEY>
//!
//! # Browse records through the admin registry
//! mp-cli admin list order --limit 20
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user` - Create and activate accounts
//! - `token` - Issue and redeem confirmation tokens
//! - `admin` - Generic list/show/edit/delete over registered entities

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mp-cli")]
#[command(author, version, about = "Marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage email confirmation tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Browse and edit records through the admin registry
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an ordinary (inactive) account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password; without one the account gets an unusable password
        #[arg(short, long)]
        password: Option<String>,

        /// Register as a shop owner instead of a buyer
        #[arg(long)]
        shop: bool,

        /// Activate immediately instead of waiting for confirmation
        #[arg(long)]
        active: bool,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Create a staff superuser
    Createsuperuser {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Activate an account without a token
    Activate {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a confirmation token and print its key
    Issue {
        /// Email address of the account
        #[arg(short, long)]
        email: String,
    },
    /// Redeem a confirmation key, activating its account
    Confirm {
        /// Token key
        key: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List registered entities
    Entities,
    /// List rows of an entity
    List {
        /// Entity name (see `admin entities`)
        entity: String,

        #[arg(short, long, default_value_t = 50)]
        limit: i64,

        #[arg(short, long, default_value_t = 0)]
        offset: i64,
    },
    /// Show a single row
    Show { entity: String, id: i32 },
    /// Apply a JSON object of column changes to a row
    Edit {
        entity: String,
        id: i32,
        /// e.g. '{"state": "confirmed"}'
        changes: String,
    },
    /// Delete a row and everything that depends on it
    Delete { entity: String, id: i32 },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                shop,
                active,
                first_name,
                last_name,
            } => {
                let options = commands::users::CreateOptions {
                    shop,
                    active,
                    first_name,
                    last_name,
                };
                commands::users::create(&email, password, options).await?;
            }
            UserAction::Createsuperuser { email, password } => {
                commands::users::create_superuser(&email, password).await?;
            }
            UserAction::Activate { email } => commands::users::activate(&email).await?,
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { email } => commands::tokens::issue(&email).await?,
            TokenAction::Confirm { key } => commands::tokens::confirm(&key).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Entities => commands::admin::entities(),
            AdminAction::List {
                entity,
                limit,
                offset,
            } => commands::admin::list(&entity, limit, offset).await?,
            AdminAction::Show { entity, id } => commands::admin::show(&entity, id).await?,
            AdminAction::Edit {
                entity,
                id,
                changes,
            } => commands::admin::edit(&entity, id, &changes).await?,
            AdminAction::Delete { entity, id } => commands::admin::delete(&entity, id).await?,
        },
    }
    Ok(())
}
