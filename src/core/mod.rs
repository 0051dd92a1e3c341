//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod logging;
pub mod token;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use logging::init_logger;
pub use token::generate_room_id;
