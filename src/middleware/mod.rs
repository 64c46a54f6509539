pub mod admin;
pub mod auth;
pub mod locale;
pub mod response;
pub mod validate_user;

pub use admin::require_admin;
pub use auth::jwt_auth_middleware;
pub use locale::{locale_middleware, RequestLocale};
pub use response::{ApiResponse, ApiResult};
pub use validate_user::validate_user_middleware;
