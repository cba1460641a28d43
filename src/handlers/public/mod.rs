// handlers/public/mod.rs - Public handlers (no session required)
//
// Session acquisition and release. Everything else lives behind the
// session guard in handlers/protected.

pub mod auth;

pub use auth::*;
