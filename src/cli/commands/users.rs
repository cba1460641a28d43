use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{loaded, output_success, output_value, signed_in_hooks};
use crate::cli::CliContext;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List dashboard admins")]
    List,

    #[command(about = "Create a dashboard admin")]
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "COACH_ADMIN_NEW_PASSWORD")]
        password: String,
        #[arg(long)]
        role: Option<String>,
    },
}

pub async fn handle(cmd: UserCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let hooks = signed_in_hooks(ctx)?;

    match cmd {
        UserCommands::List => {
            let admins = loaded(hooks.users().await)?;
            output_value(&ctx.output, &admins, &["id", "name", "email", "role", "createdAt"])
        }
        UserCommands::Register {
            name,
            email,
            password,
            role,
        } => {
            let mut body = json!({ "name": name, "email": email, "password": password });
            if let Some(role) = role {
                body["role"] = json!(role);
            }
            let created = hooks.register_user(body).await?;
            output_success(&ctx.output, &format!("Registered {}", email), Some(created))
        }
    }
}
