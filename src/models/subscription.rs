use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Coach, Plan};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
    Failed,
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown subscription status '{}'", other)),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(Self::Paid),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        })
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Failed => "failed",
        })
    }
}

/// `null` deserializes to the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` and `""` deserialize to the enum's default, anything else must parse.
fn blank_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(T::default()),
        Some(s) if s.is_empty() => Ok(T::default()),
        Some(s) => s.parse().map_err(de::Error::custom),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(alias = "id")]
    pub subscription_id: Value,
    pub coach_id: Value,
    pub plan_id: Value,
    pub start_date: String,
    pub end_date: String,
    pub status: SubscriptionStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub payment_notes: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub cancelled_at: Option<String>,
    #[serde(default)]
    pub coach: Option<Coach>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body forwarded on subscription create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionCreate {
    pub coach_id: Value,
    pub plan_id: Value,
    pub start_date: Value,
    pub end_date: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_reference: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_notes: String,
}

impl SubscriptionCreate {
    pub const REQUIRED: &'static [&'static str] = &["coach_id", "plan_id", "start_date", "end_date"];
}

/// Body forwarded on subscription update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    pub coach_id: Value,
    pub plan_id: Value,
    pub start_date: Value,
    pub end_date: Value,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub status: SubscriptionStatus,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_reference: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_notes: String,
}

impl SubscriptionUpdate {
    pub const REQUIRED: &'static [&'static str] = SubscriptionCreate::REQUIRED;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenewPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_reference: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cancellation_reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_defaults_status_fields() {
        let update: SubscriptionUpdate = serde_json::from_value(json!({
            "coach_id": 3,
            "plan_id": 2,
            "start_date": "2025-01-01",
            "end_date": "2025-02-01",
            "status": "",
            "payment_method": null
        }))
        .unwrap();

        assert_eq!(update.status, SubscriptionStatus::Active);
        assert_eq!(update.payment_status, PaymentStatus::Pending);
        assert_eq!(update.payment_method, "");

        let forwarded = serde_json::to_value(&update).unwrap();
        assert_eq!(forwarded["status"], "active");
        assert_eq!(forwarded["payment_status"], "pending");
    }

    #[test]
    fn update_rejects_unknown_status() {
        let result = serde_json::from_value::<SubscriptionUpdate>(json!({
            "coach_id": 3,
            "plan_id": 2,
            "start_date": "2025-01-01",
            "end_date": "2025-02-01",
            "status": "paused"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn subscription_reads_backend_shape() {
        let sub: Subscription = serde_json::from_value(json!({
            "subscription_id": 11,
            "coach_id": 3,
            "plan_id": 2,
            "start_date": "2025-01-01T00:00:00.000Z",
            "end_date": "2025-02-01T00:00:00.000Z",
            "status": "cancelled",
            "payment_status": "paid",
            "plan": { "plan_id": 2, "name": "Pro", "price": "49.00", "duration_days": 30 }
        }))
        .unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert_eq!(sub.plan.unwrap().price.to_string(), "49.00");
    }
}
