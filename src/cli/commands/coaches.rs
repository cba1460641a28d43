use clap::Subcommand;

use crate::cli::utils::{loaded, output_value, signed_in_hooks};
use crate::cli::CliContext;

#[derive(Subcommand)]
pub enum CoachCommands {
    #[command(about = "List coaches")]
    List,
}

pub async fn handle(cmd: CoachCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let hooks = signed_in_hooks(ctx)?;

    match cmd {
        CoachCommands::List => {
            output_value(&ctx.output, &loaded(hooks.coaches().await)?, &["coach_id", "name", "email"])
        }
    }
}
