//! Local Library catalog server
//!
//! A REST JSON API for a small library catalog: books, authors, genres,
//! languages and the borrowable copies of each book, with the borrowing and
//! renewal workflows used by library staff.

use std::sync::Arc;

pub mod api;
pub mod config;
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
