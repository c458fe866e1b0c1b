mod auth;
mod error_handler;

pub use auth::{AdminId, UserId, admin_auth, bearer_token, user_auth};
pub use error_handler::log_errors;
