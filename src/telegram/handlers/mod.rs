//! Dispatcher schema and update handlers

mod commands;
mod dialog;
mod schema;
mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
