pub mod auth;
pub mod calc;
pub mod locale;
pub mod portal;
pub mod server;
