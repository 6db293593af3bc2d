pub mod admin;
pub mod advertisements;
pub mod auth;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod links;
pub mod redirect;
pub mod reports;
pub mod routes;
pub mod sessions;
pub mod settings;
pub mod types;
pub mod uploads;

pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{api_result, error_from_shepherd, error_response, success_response};
pub use redirect::{RedirectService, redirect_routes};
pub use routes::{api_routes, configure};
pub use types::*;
