// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (session guard, proxied to the backend)
pub mod protected; // Tier 2: session required (/api/*)
pub mod public;    // Tier 1: session acquisition (/api/auth/login|logout|register)
