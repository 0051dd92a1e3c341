//! Zvonilka - Telegram bot for starting peer-to-peer video calls
//!
//! This library provides all the functionality for the Zvonilka bot:
//! user registration, one-way contact lists built from invite deep links,
//! contact search (text and inline mode), and call-invitation flows backed
//! by a registry of one-shot room tokens.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, and room-token generation
//! - `storage`: Database pool and queries (users, contacts, rooms)
//! - `telegram`: Bot integration: dispatcher schema, keyboards, handlers
//! - `i18n`: Fluent-based localization (Russian default, English)

pub mod core;
pub mod i18n;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
pub use telegram::{create_bot, schema, Bot, HandlerDeps};
