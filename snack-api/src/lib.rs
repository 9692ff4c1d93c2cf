pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod utils;

pub use config::Config;
pub use error::AppError;
pub use server::{create_app, AppState};
