pub mod auth;
pub mod request_log;

pub use auth::{AuthGuard, AuthMethod, CurrentUser, session_user};
pub use request_log::{RequestId, RequestLogger};
