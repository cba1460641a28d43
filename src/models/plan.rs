use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plan prices arrive either as numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{:.2}", n),
            Price::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    #[serde(alias = "id")]
    pub plan_id: Value,
    pub name: String,
    pub price: Price,
    pub duration_days: Value,
    #[serde(default)]
    pub features: Value,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body forwarded on plan create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPayload {
    pub name: String,
    pub price: Value,
    pub duration_days: Value,
    pub features: Value,
    #[serde(default, deserialize_with = "super::subscription::null_as_default")]
    pub description: String,
}

impl PlanPayload {
    pub const REQUIRED: &'static [&'static str] = &["name", "price", "duration_days", "features"];
}
