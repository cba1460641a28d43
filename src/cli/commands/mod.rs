pub mod auth;
pub mod coaches;
pub mod modal;
pub mod plans;
pub mod subscriptions;
pub mod users;
