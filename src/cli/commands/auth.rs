use clap::Subcommand;

use crate::cli::config::{clear_session, load_session, resolve_server, save_session, CliSession};
use crate::cli::utils::{output_success, output_value};
use crate::cli::CliContext;
use crate::client::{DashboardApi, DashboardClient};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in to the dashboard")]
    Login {
        #[arg(help = "Admin email")]
        email: String,
        #[arg(long, env = "COACH_ADMIN_PASSWORD", help = "Password")]
        password: String,
    },

    #[command(about = "Sign out and forget the saved session")]
    Logout,

    #[command(about = "Show the signed-in admin")]
    Status,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let server = resolve_server(ctx.server.as_deref(), None);
            let client = DashboardClient::new(&server)?;
            let data = client.login(&email, &password).await?;

            let cookie = client
                .session()
                .ok_or_else(|| anyhow::anyhow!("server did not open a session"))?;
            save_session(&CliSession::new(server.clone(), cookie, data.get("user").cloned()))?;

            output_success(&ctx.output, &format!("Signed in as {} on {}", email, server), Some(data))
        }
        AuthCommands::Logout => {
            if let Some(session) = load_session()? {
                let server = resolve_server(ctx.server.as_deref(), Some(&session));
                let client = DashboardClient::new(&server)?.with_session(session.cookie);
                if let Err(e) = client.logout().await {
                    tracing::warn!("server-side logout failed: {}", e);
                }
            }
            let removed = clear_session()?;
            let message = if removed { "Signed out" } else { "No saved session" };
            output_success(&ctx.output, message, None)
        }
        AuthCommands::Status => {
            let session = load_session()?.ok_or_else(|| anyhow::anyhow!("not signed in"))?;
            let server = resolve_server(ctx.server.as_deref(), Some(&session));
            let client = DashboardClient::new(&server)?.with_session(session.cookie);
            let current = client.get("/api/auth/session").await?;
            let admin = current.get("data").cloned().unwrap_or(current);
            output_value(&ctx.output, &admin, &[])
        }
    }
}
