use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::cli::utils::{loaded, output_success, output_value, signed_in_hooks};
use crate::cli::CliContext;
use crate::models::{PaymentStatus, SubscriptionStatus};

const COLUMNS: &[&str] = &[
    "subscription_id",
    "coach_id",
    "plan_id",
    "start_date",
    "end_date",
    "status",
    "payment_status",
];

#[derive(Args)]
pub struct PaymentFields {
    #[arg(long)]
    pub payment_method: Option<String>,
    #[arg(long)]
    pub payment_reference: Option<String>,
    #[arg(long)]
    pub payment_notes: Option<String>,
}

impl PaymentFields {
    fn to_body(&self) -> Value {
        json!({
            "payment_method": self.payment_method.clone().unwrap_or_default(),
            "payment_reference": self.payment_reference.clone().unwrap_or_default(),
            "payment_notes": self.payment_notes.clone().unwrap_or_default(),
        })
    }
}

#[derive(Args)]
pub struct SubscriptionFields {
    #[arg(long)]
    pub coach_id: String,
    #[arg(long)]
    pub plan_id: String,
    #[arg(long, help = "YYYY-MM-DD")]
    pub start_date: String,
    #[arg(long, help = "YYYY-MM-DD")]
    pub end_date: String,
    #[command(flatten)]
    pub payment: PaymentFields,
}

impl SubscriptionFields {
    fn to_body(&self) -> Value {
        let mut body = self.payment.to_body();
        body["coach_id"] = json!(self.coach_id);
        body["plan_id"] = json!(self.plan_id);
        body["start_date"] = json!(self.start_date);
        body["end_date"] = json!(self.end_date);
        body
    }
}

#[derive(Subcommand)]
pub enum SubscriptionCommands {
    #[command(about = "List subscriptions")]
    List,

    #[command(about = "Show one subscription")]
    Get { id: String },

    #[command(about = "Create a subscription")]
    Create(SubscriptionFields),

    #[command(about = "Replace a subscription")]
    Update {
        id: String,
        #[command(flatten)]
        fields: SubscriptionFields,
        #[arg(long, default_value = "active")]
        status: SubscriptionStatus,
        #[arg(long, default_value = "pending")]
        payment_status: PaymentStatus,
    },

    #[command(about = "Delete a subscription")]
    Delete { id: String },

    #[command(about = "Cancel a subscription")]
    Cancel {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },

    #[command(about = "Renew a subscription")]
    Renew {
        id: String,
        #[command(flatten)]
        payment: PaymentFields,
    },

    #[command(about = "Subscriptions ending within N days")]
    Expiring {
        #[arg(long, help = "Window in days (server default 30)")]
        days: Option<u32>,
    },

    #[command(about = "Subscription statistics")]
    Stats,
}

pub async fn handle(cmd: SubscriptionCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let hooks = signed_in_hooks(ctx)?;

    match cmd {
        SubscriptionCommands::List => output_value(&ctx.output, &loaded(hooks.subscriptions().await)?, COLUMNS),
        SubscriptionCommands::Get { id } => {
            output_value(&ctx.output, &loaded(hooks.subscription(&id).await)?, COLUMNS)
        }
        SubscriptionCommands::Create(fields) => {
            let created = hooks.create_subscription(fields.to_body()).await?;
            output_success(
                &ctx.output,
                &format!("Subscribed coach {} to plan {}", fields.coach_id, fields.plan_id),
                Some(created),
            )
        }
        SubscriptionCommands::Update {
            id,
            fields,
            status,
            payment_status,
        } => {
            let mut body = fields.to_body();
            body["status"] = json!(status);
            body["payment_status"] = json!(payment_status);
            let updated = hooks.update_subscription(&id, body).await?;
            output_success(&ctx.output, &format!("Updated subscription {}", id), Some(updated))
        }
        SubscriptionCommands::Delete { id } => {
            hooks.delete_subscription(&id).await?;
            output_success(&ctx.output, &format!("Deleted subscription {}", id), None)
        }
        SubscriptionCommands::Cancel { id, reason } => {
            let cancelled = hooks.cancel_subscription(&id, reason.as_deref()).await?;
            output_success(&ctx.output, &format!("Cancelled subscription {}", id), Some(cancelled))
        }
        SubscriptionCommands::Renew { id, payment } => {
            let renewed = hooks.renew_subscription(&id, payment.to_body()).await?;
            output_success(&ctx.output, &format!("Renewed subscription {}", id), Some(renewed))
        }
        SubscriptionCommands::Expiring { days } => {
            output_value(&ctx.output, &loaded(hooks.expiring_subscriptions(days).await)?, COLUMNS)
        }
        SubscriptionCommands::Stats => output_value(&ctx.output, &loaded(hooks.subscription_stats().await)?, &[]),
    }
}
