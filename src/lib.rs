pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod locale;
pub mod middleware;
pub mod portal;
pub mod routes;
pub mod site;
pub mod state;

pub use routes::app;
pub use state::AppState;
