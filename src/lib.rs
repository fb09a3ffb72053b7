//! Library Desk
//!
//! Administration of a small lending library: a REST server for books and
//! holders, and the desk client core that drives it (state projection,
//! mutation coordination and a keyed read-through cache).

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod desk;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
