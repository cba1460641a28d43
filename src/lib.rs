pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod proxy;
pub mod server;
pub mod state;
pub mod upstream;

pub use server::app;
pub use state::AppState;
