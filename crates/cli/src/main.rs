//! Prompt Market CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pm-cli migrate
//!
//! # Create the first administrator
//! pm-cli admin bootstrap -e admin@example.com -p 'a long password'
//!
//! # Grant admin to an existing user
//! pm-cli admin grant -e someone@example.com
//!
//! # Load prompts into the catalog
//! pm-cli seed prompts -f demos/prompts.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pm-cli")]
#[command(author, version, about = "Prompt Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage administrators
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create the first administrator (only while none exists)
    Bootstrap {
        /// Administrator email address
        #[arg(short, long)]
        email: String,

        /// Password, required when the account does not exist yet
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Grant the admin role to an existing user
    Grant {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert prompts from a YAML file
    Prompts {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Bootstrap { email, password } => {
                commands::admin::bootstrap(&email, password.as_deref()).await?;
            }
            AdminAction::Grant { email } => commands::admin::grant(&email).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Prompts { file } => commands::seed::prompts(&file).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
