use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::config::modal_storage_path;
use crate::cli::utils::{output_success, output_value};
use crate::cli::CliContext;
use crate::client::{FileStorage, ModalChannel, ModalKind};

#[derive(Subcommand)]
pub enum ModalCommands {
    #[command(about = "Mark a dialog open")]
    Open {
        #[arg(help = "user, package, subscription or coach")]
        kind: ModalKind,
    },

    #[command(about = "Mark a dialog closed")]
    Close { kind: ModalKind },

    #[command(about = "Show every dialog flag")]
    Show,
}

pub fn handle(cmd: ModalCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let channel = ModalChannel::new(Arc::new(FileStorage::new(modal_storage_path()?)));

    match cmd {
        ModalCommands::Open { kind } => {
            channel.set(kind, true)?;
            output_success(&ctx.output, &format!("{} dialog open", kind), None)
        }
        ModalCommands::Close { kind } => {
            channel.set(kind, false)?;
            output_success(&ctx.output, &format!("{} dialog closed", kind), None)
        }
        ModalCommands::Show => {
            let flags: serde_json::Map<String, serde_json::Value> = ModalKind::ALL
                .iter()
                .map(|kind| (kind.storage_key().to_string(), json!({ "modal": channel.get(*kind) })))
                .collect();
            output_value(&ctx.output, &serde_json::Value::Object(flags), &[])
        }
    }
}
