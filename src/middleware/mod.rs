pub mod auth;
pub mod response;

pub use auth::CurrentSession;
pub use response::{ApiResponse, ApiResult};
