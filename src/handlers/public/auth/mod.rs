// handlers/public/auth/mod.rs - Session acquisition endpoints

pub mod login;    // POST /api/auth/login - exchange credentials for a session cookie
pub mod logout;   // POST /api/auth/logout - clear the session cookie
pub mod register; // POST /api/auth/register - self-service sign-up

pub use login::login_post;
pub use logout::logout_post;
pub use register::register_post;
