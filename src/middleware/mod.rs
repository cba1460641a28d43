pub mod response;
pub mod session;

pub use response::{ApiResponse, ApiResult};
pub use session::{require_session, session_token, AdminSession};
