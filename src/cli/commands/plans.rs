use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::cli::utils::{loaded, output_success, output_value, parse_json_arg, signed_in_hooks};
use crate::cli::CliContext;

const COLUMNS: &[&str] = &["plan_id", "name", "price", "duration_days", "description"];

#[derive(Args)]
pub struct PlanFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub duration_days: u32,
    #[arg(long, default_value = "{}", help = "Feature flags as a JSON object")]
    pub features: String,
    #[arg(long)]
    pub description: Option<String>,
}

impl PlanFields {
    fn to_body(&self) -> anyhow::Result<Value> {
        Ok(json!({
            "name": self.name,
            "price": self.price,
            "duration_days": self.duration_days,
            "features": parse_json_arg("features", &self.features)?,
            "description": self.description.clone().unwrap_or_default(),
        }))
    }
}

#[derive(Subcommand)]
pub enum PlanCommands {
    #[command(about = "List plans")]
    List,

    #[command(about = "Show one plan")]
    Get { id: String },

    #[command(about = "Create a plan")]
    Create(PlanFields),

    #[command(about = "Replace a plan")]
    Update {
        id: String,
        #[command(flatten)]
        fields: PlanFields,
    },

    #[command(about = "Delete a plan")]
    Delete { id: String },
}

pub async fn handle(cmd: PlanCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let hooks = signed_in_hooks(ctx)?;

    match cmd {
        PlanCommands::List => output_value(&ctx.output, &loaded(hooks.plans().await)?, COLUMNS),
        PlanCommands::Get { id } => output_value(&ctx.output, &loaded(hooks.plan(&id).await)?, COLUMNS),
        PlanCommands::Create(fields) => {
            let created = hooks.create_plan(fields.to_body()?).await?;
            output_success(&ctx.output, &format!("Created plan {}", fields.name), Some(created))
        }
        PlanCommands::Update { id, fields } => {
            let updated = hooks.update_plan(&id, fields.to_body()?).await?;
            output_success(&ctx.output, &format!("Updated plan {}", id), Some(updated))
        }
        PlanCommands::Delete { id } => {
            hooks.delete_plan(&id).await?;
            output_success(&ctx.output, &format!("Deleted plan {}", id), None)
        }
    }
}
