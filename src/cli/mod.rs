pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "coachctl")]
#[command(about = "coachctl - command-line client for the Coach Admin dashboard")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "COACH_ADMIN_SERVER",
        help = "Dashboard base URL (defaults to the server of the saved session)"
    )]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Subscription plans")]
    Plans {
        #[command(subcommand)]
        cmd: commands::plans::PlanCommands,
    },

    #[command(about = "Coach subscriptions")]
    Subscriptions {
        #[command(subcommand)]
        cmd: commands::subscriptions::SubscriptionCommands,
    },

    #[command(about = "Dashboard admin accounts")]
    Users {
        #[command(subcommand)]
        cmd: commands::users::UserCommands,
    },

    #[command(about = "Coach directory")]
    Coaches {
        #[command(subcommand)]
        cmd: commands::coaches::CoachCommands,
    },

    #[command(about = "Dialog flags shared with other dashboard sessions on this machine")]
    Modal {
        #[command(subcommand)]
        cmd: commands::modal::ModalCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Per-invocation settings handed to every command.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub output: OutputFormat,
    pub server: Option<String>,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext {
        output: OutputFormat::from_cli(&cli),
        server: cli.server.clone(),
    };

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Plans { cmd } => commands::plans::handle(cmd, &ctx).await,
        Commands::Subscriptions { cmd } => commands::subscriptions::handle(cmd, &ctx).await,
        Commands::Users { cmd } => commands::users::handle(cmd, &ctx).await,
        Commands::Coaches { cmd } => commands::coaches::handle(cmd, &ctx).await,
        Commands::Modal { cmd } => commands::modal::handle(cmd, &ctx),
    }
}
