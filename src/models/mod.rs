//! Pass-through DTOs for the coach API.
//!
//! The backend owns these records. The proxy only normalizes the bodies it
//! forwards (defaults for optional fields, enum checks); the read-side types
//! are used by the client hooks and the CLI.

pub mod admin;
pub mod coach;
pub mod plan;
pub mod subscription;

pub use admin::{Admin, LoginRequest, LoginResponse, PublicRegistration, RegisterAdmin};
pub use coach::Coach;
pub use plan::{Plan, PlanPayload, Price};
pub use subscription::{
    CancelPayload, PaymentStatus, RenewPayload, Subscription, SubscriptionCreate, SubscriptionStatus,
    SubscriptionUpdate,
};

use serde_json::Value;

/// Renders a backend id (numeric or string) as a path segment.
pub fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
