pub mod session;

pub use session::current as session_current;
