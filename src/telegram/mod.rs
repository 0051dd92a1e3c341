//! Telegram bot integration and handlers

pub mod bot;
pub mod callback;
pub mod calls;
pub mod handlers;
pub mod inline;
pub mod keyboards;
pub mod menu;
pub mod sessions;

use teloxide::types::InlineKeyboardButton;

/// Bot type used across the crate.
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use menu::handle_menu_callback;
pub use sessions::{DialogState, Sessions};

/// Shorthand for an inline keyboard callback button.
pub(crate) fn cb(text: impl Into<String>, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, data)
}
