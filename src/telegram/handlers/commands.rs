//! Command handler implementations (/start)

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::i18n;
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::keyboards;
use crate::telegram::sessions::DialogState;
use crate::telegram::Bot;

/// Extracts the inviter id from a `add_<ownerId>` deep-link payload.
pub(super) fn parse_invite_payload(payload: &str) -> Option<i64> {
    payload.strip_prefix("add_")?.parse::<i64>().ok()
}

/// Handle /start command
///
/// Routes between four outcomes: own-link rejection, first-contact name
/// prompt (with the invite payload deferred into the dialog state),
/// immediate contact linking for registered users, and the plain main menu.
pub(super) async fn handle_start_command(
    bot: &Bot,
    msg: &Message,
    payload: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = i64::try_from(from.id.0).unwrap_or(0);
    let lang = i18n::lang_from_telegram(from.language_code.as_deref());
    let invite_owner_id = parse_invite_payload(payload.trim());

    if invite_owner_id == Some(user_id) {
        bot.send_message(msg.chat.id, i18n::t(&lang, "invite.own_link"))
            .reply_markup(keyboards::main_menu(&lang))
            .await?;
        return Ok(());
    }

    let registered = {
        let conn = get_connection(&deps.db_pool)?;
        db::get_user(&conn, user_id)?.is_some()
    };

    if !registered {
        log::info!("New user on /start: chat_id={}, invited_by={:?}", msg.chat.id.0, invite_owner_id);
        deps.sessions.set(user_id, DialogState::AwaitingName { invite_owner_id });
        bot.send_message(msg.chat.id, i18n::t(&lang, "reg.welcome")).await?;
        return Ok(());
    }

    if let Some(owner_id) = invite_owner_id {
        {
            let conn = get_connection(&deps.db_pool)?;
            db::add_contact(&conn, owner_id, user_id)?;
        }
        bot.send_message(msg.chat.id, i18n::t(&lang, "invite.contact_added"))
            .reply_markup(keyboards::main_menu(&lang))
            .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, i18n::t(&lang, "menu.main_title"))
        .reply_markup(keyboards::main_menu(&lang))
        .await?;
    Ok(())
}
