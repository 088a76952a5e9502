pub mod auth;
pub mod response;

pub use auth::{jwt_auth_middleware, require_auth_middleware};
pub use response::{envelope_bare_errors, ApiResponse, ApiResult};
