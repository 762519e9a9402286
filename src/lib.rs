//! MentorHub API: mentorship platform backend over PostgreSQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod de;
pub mod error;
pub mod handlers;
pub mod idset;
pub mod models;
pub mod response;
pub mod routes;
pub mod schema;
pub mod state;

pub use config::Settings;
pub use error::AppError;
pub use routes::{api_routes, common_routes};
pub use schema::{ensure_database_exists, ensure_tables};
pub use state::AppState;
