//! Callback query routing for the menu keyboards
//!
//! Every inline button press lands here. The data string is decoded into a
//! typed [`CallbackAction`]; malformed payloads answer with a transient
//! alert and nothing else.

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;

use crate::core::generate_room_id;
use crate::i18n;
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::callback::CallbackAction;
use crate::telegram::calls::{self, CallInvite};
use crate::telegram::handlers::{HandlerDeps, HandlerError};
use crate::telegram::keyboards;
use crate::telegram::sessions::DialogState;
use crate::telegram::Bot;

/// Handles callback queries from the menu inline keyboards.
///
/// Processes button presses, switches between menus, and drives the call
/// invite lifecycle (decline/cancel).
pub async fn handle_menu_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    let callback_id = q.id.clone();
    let from_id = i64::try_from(q.from.id.0).unwrap_or(0);
    let lang = i18n::lang_from_telegram(q.from.language_code.as_deref());

    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(callback_id).await?;
        return Ok(());
    };

    let action = match CallbackAction::parse(data) {
        Ok(action) => action,
        Err(e) => {
            log::warn!("Malformed callback data from user {}: {}", from_id, e);
            bot.answer_callback_query(callback_id)
                .text(i18n::t(&lang, "callback.malformed"))
                .show_alert(true)
                .await?;
            return Ok(());
        }
    };

    let chat_id = q.message.as_ref().map(|m| m.chat().id);
    let message_id = q.message.as_ref().map(|m| m.id());

    match action {
        CallbackAction::AddContact => {
            if let (Some(chat_id), Some(message_id)) = (chat_id, message_id) {
                let bot_username = match deps.bot_username.clone() {
                    Some(username) => username,
                    None => bot.get_me().await?.username.clone().unwrap_or_default(),
                };
                let link = format!("https://t.me/{}?start=add_{}", bot_username, from_id);
                let mut args = FluentArgs::new();
                args.set("link", link);
                bot.edit_message_text(chat_id, message_id, i18n::t_args(&lang, "invite.share_link", &args))
                    .reply_markup(keyboards::main_menu(&lang))
                    .await?;
            }
            bot.answer_callback_query(callback_id).await?;
        }
        CallbackAction::StartCall => {
            if let (Some(chat_id), Some(message_id)) = (chat_id, message_id) {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "call.menu_title"))
                    .reply_markup(keyboards::call_menu(&lang))
                    .await?;
            }
            bot.answer_callback_query(callback_id).await?;
        }
        CallbackAction::BackToMain => {
            if let (Some(chat_id), Some(message_id)) = (chat_id, message_id) {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "menu.main_title"))
                    .reply_markup(keyboards::main_menu(&lang))
                    .await?;
            }
            bot.answer_callback_query(callback_id).await?;
        }
        CallbackAction::CreateLink => {
            if let (Some(chat_id), Some(message_id)) = (chat_id, message_id) {
                let room_id = generate_room_id();
                {
                    let conn = get_connection(&deps.db_pool)?;
                    db::create_room(&conn, &room_id, from_id)?;
                }
                let url = calls::call_url(&room_id)?;
                log::info!("Room {} created by user {} (bare link)", room_id, from_id);

                let mut args = FluentArgs::new();
                args.set("url", url.as_str().to_string());
                bot.edit_message_text(chat_id, message_id, i18n::t_args(&lang, "call.room_link", &args))
                    .reply_markup(keyboards::call_menu(&lang))
                    .await?;
            }
            bot.answer_callback_query(callback_id).await?;
        }
        CallbackAction::ChooseFromContacts => {
            deps.sessions.set(from_id, DialogState::AwaitingSearchQuery);
            if let (Some(chat_id), Some(message_id)) = (chat_id, message_id) {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "search.prompt"))
                    .reply_markup(keyboards::search_contacts(&lang))
                    .await?;
            }
            bot.answer_callback_query(callback_id).await?;
        }
        CallbackAction::ChooseContact { contact_id } => {
            calls::start_call(&bot, &deps.db_pool, &lang, from_id, contact_id).await?;
            bot.answer_callback_query(callback_id)
                .text(i18n::t(&lang, "call.link_sent"))
                .await?;
        }
        CallbackAction::CallDecline {
            room_id,
            initiator_id,
            target_id,
        } => {
            if let (Some(chat_id), Some(message_id)) = (chat_id, message_id) {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "call.declined"))
                    .await?;
            }
            log::info!("Call declined: room {} by user {}", room_id, from_id);

            let invite = CallInvite::new(room_id, initiator_id, target_id);
            let notify_lang = i18n::default_lang();
            calls::notify_counterparty(
                &bot,
                invite.counterparty_of(from_id),
                i18n::t(&notify_lang, "call.declined_notify"),
            )
            .await;
            bot.answer_callback_query(callback_id).await?;
        }
        CallbackAction::CallMenuCancel {
            room_id,
            initiator_id,
            target_id,
        } => {
            if let (Some(chat_id), Some(message_id)) = (chat_id, message_id) {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "menu.main_title"))
                    .reply_markup(keyboards::main_menu(&lang))
                    .await?;
            }
            log::info!("Call cancelled: room {} by user {}", room_id, from_id);

            let invite = CallInvite::new(room_id, initiator_id, target_id);
            let notify_lang = i18n::default_lang();
            calls::notify_counterparty(
                &bot,
                invite.counterparty_of(from_id),
                i18n::t(&notify_lang, "call.cancelled_notify"),
            )
            .await;
            bot.answer_callback_query(callback_id).await?;
        }
    }

    Ok(())
}
