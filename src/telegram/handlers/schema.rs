//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ChosenInlineResult, InlineQuery, Message};

use super::commands::handle_start_command;
use super::dialog::handle_dialog_message;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::inline::{handle_chosen_inline_result, handle_inline_query};
use crate::telegram::menu::handle_menu_callback;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. The same schema is used in production and in integration
/// tests.
///
/// # Arguments
/// * `deps` - Handler dependencies (database pool, session store, bot username)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_dialog = deps.clone();
    let deps_callback = deps.clone();
    let deps_inline = deps.clone();
    let deps_chosen = deps;

    dptree::entry()
        // Commands win over dialog state, matching the platform convention
        .branch(command_handler(deps_commands))
        // Free text only matters while a dialog session is active
        .branch(dialog_handler(deps_dialog))
        // Callback query handler (inline keyboard buttons)
        .branch(callback_handler(deps_callback))
        // Inline-mode search and result selection
        .branch(inline_query_handler(deps_inline))
        .branch(chosen_inline_result_handler(deps_chosen))
}

/// Handler for bot commands (/start)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                match cmd {
                    Command::Start(payload) => {
                        handle_start_command(&bot, &msg, &payload, &deps).await?;
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for text messages from users with an active dialog session
fn dialog_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let sessions = deps.sessions.clone();

    Update::filter_message()
        .filter(move |msg: Message| {
            msg.text().is_some()
                && msg
                    .from
                    .as_ref()
                    .and_then(|u| i64::try_from(u.id.0).ok())
                    .map(|user_id| sessions.get(user_id).is_some())
                    .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_dialog_message(&bot, &msg, &deps).await }
        })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move { handle_menu_callback(bot, q, deps).await }
    })
}

/// Handler for inline-mode search queries
fn inline_query_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_inline_query().endpoint(move |bot: Bot, iq: InlineQuery| {
        let deps = deps.clone();
        async move { handle_inline_query(bot, iq, deps).await }
    })
}

/// Handler for chosen inline results (a contact card was picked)
fn chosen_inline_result_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_chosen_inline_result().endpoint(move |bot: Bot, chosen: ChosenInlineResult| {
        let deps = deps.clone();
        async move { handle_chosen_inline_result(bot, chosen, deps).await }
    })
}
