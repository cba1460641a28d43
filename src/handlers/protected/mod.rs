// handlers/protected/mod.rs - Proxy handlers (session required)
//
// Every route in this tier is wrapped by middleware::require_session, which
// injects the AdminSession extension. Handlers validate their body, forward
// to the backend with the session's bearer token and relay the answer.
//
// Route Prefix: /api/* (e.g. /api/subscription/plans, /api/users)

pub mod auth;          // Current session
pub mod coaches;       // Coach directory
pub mod plans;         // Subscription plans CRUD
pub mod subscriptions; // Subscriptions CRUD + cancel/renew/reporting
pub mod users;         // Admin accounts
