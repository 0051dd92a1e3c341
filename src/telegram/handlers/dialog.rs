//! Free-text dialog handlers (name entry, contact search)
//!
//! Only runs for users with an active session state; all other text is
//! left to the platform defaults.

use teloxide::prelude::*;
use teloxide::types::{Message, ParseMode};
use teloxide::utils::html;
use unic_langid::LanguageIdentifier;

use fluent_templates::fluent_bundle::FluentArgs;

use super::types::{HandlerDeps, HandlerError};
use crate::i18n;
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::calls;
use crate::telegram::keyboards;
use crate::telegram::sessions::DialogState;
use crate::telegram::Bot;

/// Routes a text message according to the sender's dialog state.
pub(super) async fn handle_dialog_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = i64::try_from(from.id.0).unwrap_or(0);
    let lang = i18n::lang_from_telegram(from.language_code.as_deref());
    let Some(text) = msg.text() else {
        return Ok(());
    };

    match deps.sessions.get(user_id) {
        Some(DialogState::AwaitingName { invite_owner_id }) => {
            handle_name_entry(bot, msg.chat.id, user_id, &lang, text, invite_owner_id, deps).await
        }
        Some(DialogState::AwaitingSearchQuery) => {
            handle_search_query(bot, msg.chat.id, user_id, &lang, text, deps).await
        }
        None => Ok(()),
    }
}

/// Registration step: accept a non-blank display name.
///
/// A blank name re-prompts without touching the database or the state. On
/// success the deferred invite edge (if any) is created in the same breath.
async fn handle_name_entry(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    lang: &LanguageIdentifier,
    text: &str,
    invite_owner_id: Option<i64>,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let name = text.trim();
    if name.is_empty() {
        bot.send_message(chat_id, i18n::t(lang, "reg.empty_name")).await?;
        return Ok(());
    }

    {
        let conn = get_connection(&deps.db_pool)?;
        db::upsert_user(&conn, user_id, name)?;
        if let Some(owner_id) = invite_owner_id {
            db::add_contact(&conn, owner_id, user_id)?;
        }
    }
    deps.sessions.clear(user_id);
    log::info!("User {} registered as {:?}", user_id, name);

    let mut args = FluentArgs::new();
    args.set("name", html::bold(&html::escape(name)));
    bot.send_message(chat_id, i18n::t_args(lang, "reg.thanks", &args))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu(lang))
        .await?;
    Ok(())
}

/// Search step: match the query against the sender's contacts.
///
/// A single match starts the call right away; several render a picklist.
/// Blank queries and empty results keep the state so the user can retype.
async fn handle_search_query(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    lang: &LanguageIdentifier,
    text: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let query = text.trim();
    if query.is_empty() {
        bot.send_message(chat_id, i18n::t(lang, "search.empty_query")).await?;
        return Ok(());
    }

    let matches = {
        let conn = get_connection(&deps.db_pool)?;
        db::search_contacts(&conn, user_id, query)?
    };

    if matches.is_empty() {
        bot.send_message(chat_id, i18n::t(lang, "search.no_results")).await?;
        return Ok(());
    }

    if let [entry] = matches.as_slice() {
        calls::start_call(bot, &deps.db_pool, lang, user_id, entry.telegram_id).await?;
        deps.sessions.clear(user_id);
        return Ok(());
    }

    deps.sessions.clear(user_id);
    bot.send_message(chat_id, i18n::t(lang, "search.results_title"))
        .reply_markup(keyboards::contacts_list(lang, &matches))
        .await?;
    Ok(())
}
