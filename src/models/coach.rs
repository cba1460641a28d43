use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coach {
    #[serde(alias = "id")]
    pub coach_id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Profile fields the dashboard does not interpret.
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}
