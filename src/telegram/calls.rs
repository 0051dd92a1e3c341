//! Call initiation and invite notifications
//!
//! Starting a call mints a fresh room token, persists it, and pushes an
//! invite message to both parties. Delivery is best effort by policy: the
//! room already exists and the action already succeeded from the acting
//! user's perspective, so a failed send (blocked bot, deleted chat) is
//! logged and dropped instead of surfacing an error. The same policy
//! covers decline/cancel counterparty notices.

use std::sync::Arc;

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use unic_langid::LanguageIdentifier;
use url::Url;

use crate::core::error::AppResult;
use crate::core::{config, generate_room_id};
use crate::i18n;
use crate::storage::db::{self, DbPool};
use crate::telegram::{keyboards, Bot};

/// One outstanding call invitation.
///
/// Carried inside the invite-message buttons; there is no persisted invite
/// state machine behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInvite {
    pub room_id: String,
    pub initiator_id: i64,
    pub target_id: i64,
}

impl CallInvite {
    pub fn new(room_id: String, initiator_id: i64, target_id: i64) -> Self {
        Self {
            room_id,
            initiator_id,
            target_id,
        }
    }

    /// The party on the other side of the invite from `user_id`.
    ///
    /// Both invite messages carry the same cancel payload, so the presser
    /// decides who gets notified.
    pub fn counterparty_of(&self, user_id: i64) -> i64 {
        if user_id == self.initiator_id {
            self.target_id
        } else {
            self.initiator_id
        }
    }
}

/// Builds the public URL of a call room.
pub fn call_url(room_id: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/call.html?room={}",
        config::APP_PUBLIC_BASE_URL.as_str(),
        room_id
    ))
}

/// Initiates a call from `initiator_id` to `target_id`.
///
/// Generates a room token, registers the room, and notifies both parties.
/// Only the database step can fail; notification delivery never does.
pub async fn start_call(
    bot: &Bot,
    db_pool: &Arc<DbPool>,
    lang: &LanguageIdentifier,
    initiator_id: i64,
    target_id: i64,
) -> AppResult<()> {
    let room_id = generate_room_id();
    {
        let conn = db::get_connection(db_pool)?;
        db::create_room(&conn, &room_id, initiator_id)?;
    }
    let url = call_url(&room_id)?;
    log::info!(
        "Call started: room {} by {} to {}",
        room_id,
        initiator_id,
        target_id
    );

    let invite = CallInvite::new(room_id, initiator_id, target_id);
    send_call_notifications(bot, lang, &invite, &url).await;
    Ok(())
}

/// Sends the invite message to both parties (best effort).
///
/// The target gets accept/decline/cancel controls, the initiator only a
/// cancel control. Accept is a plain URL button into the call page; the
/// bot performs no accept-side handling.
pub async fn send_call_notifications(bot: &Bot, lang: &LanguageIdentifier, invite: &CallInvite, call_url: &Url) {
    let mut args = FluentArgs::new();
    args.set("url", call_url.as_str());
    let text = i18n::t_args(lang, "call.started", &args);

    if let Err(e) = bot
        .send_message(ChatId(invite.target_id), text.clone())
        .reply_markup(keyboards::call_invite(lang, call_url, invite))
        .await
    {
        log::warn!("Failed to notify call target {}: {}", invite.target_id, e);
    }

    if let Err(e) = bot
        .send_message(ChatId(invite.initiator_id), text)
        .reply_markup(keyboards::call_invite_initiator(lang, invite))
        .await
    {
        log::warn!("Failed to notify call initiator {}: {}", invite.initiator_id, e);
    }
}

/// Sends a plain notice to the other side of an invite (best effort).
pub async fn notify_counterparty(bot: &Bot, user_id: i64, text: String) {
    if let Err(e) = bot.send_message(ChatId(user_id), text).await {
        log::warn!("Failed to notify counterparty {}: {}", user_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_call_url_shape() {
        let url = call_url("aB3-x_9qRsTu").unwrap();
        assert!(url.path().ends_with("/call.html"));
        assert_eq!(url.query(), Some("room=aB3-x_9qRsTu"));
    }

    #[test]
    fn test_counterparty_of() {
        let invite = CallInvite::new("room".to_string(), 10, 20);
        assert_eq!(invite.counterparty_of(10), 20);
        assert_eq!(invite.counterparty_of(20), 10);
        // Unknown pressers fall back to notifying the initiator
        assert_eq!(invite.counterparty_of(99), 10);
    }
}
