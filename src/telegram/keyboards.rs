//! Inline keyboard builders
//!
//! Pure functions from localized labels and typed callback actions to
//! teloxide keyboards. No I/O happens here.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use unic_langid::LanguageIdentifier;
use url::Url;

use crate::i18n;
use crate::storage::db::ContactEntry;
use crate::telegram::callback::CallbackAction;
use crate::telegram::calls::CallInvite;
use crate::telegram::cb;

/// Main menu: start a call / add a contact.
pub fn main_menu(lang: &LanguageIdentifier) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![cb(
            i18n::t(lang, "menu.start_call_button"),
            CallbackAction::StartCall.as_data(),
        )],
        vec![cb(
            i18n::t(lang, "menu.add_contact_button"),
            CallbackAction::AddContact.as_data(),
        )],
    ])
}

/// Call menu: create a bare link / pick a contact / back.
pub fn call_menu(lang: &LanguageIdentifier) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![cb(
            i18n::t(lang, "call.create_link_button"),
            CallbackAction::CreateLink.as_data(),
        )],
        vec![cb(
            i18n::t(lang, "call.choose_contacts_button"),
            CallbackAction::ChooseFromContacts.as_data(),
        )],
        vec![cb(i18n::t(lang, "menu.back_button"), CallbackAction::BackToMain.as_data())],
    ])
}

/// Search prompt: jump into inline mode or go back to the call menu.
pub fn search_contacts(lang: &LanguageIdentifier) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::switch_inline_query_current_chat(
            i18n::t(lang, "search.open_button"),
            "",
        )],
        vec![cb(i18n::t(lang, "menu.back_button"), CallbackAction::StartCall.as_data())],
    ])
}

/// Picklist over text-search matches, one contact per row.
pub fn contacts_list(lang: &LanguageIdentifier, items: &[ContactEntry]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = items
        .iter()
        .map(|entry| {
            vec![cb(
                entry.username.clone(),
                CallbackAction::ChooseContact {
                    contact_id: entry.telegram_id,
                }
                .as_data(),
            )]
        })
        .collect();
    rows.push(vec![cb(
        i18n::t(lang, "menu.back_button"),
        CallbackAction::StartCall.as_data(),
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Invite keyboard for the call target: accept, decline, cancel.
///
/// Accept is a URL button straight into the call page; the bot never sees
/// it being pressed.
pub fn call_invite(lang: &LanguageIdentifier, call_url: &Url, invite: &CallInvite) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url(
            i18n::t(lang, "call.accept_button"),
            call_url.clone(),
        )],
        vec![cb(
            i18n::t(lang, "call.decline_button"),
            CallbackAction::CallDecline {
                room_id: invite.room_id.clone(),
                initiator_id: invite.initiator_id,
                target_id: invite.target_id,
            }
            .as_data(),
        )],
        vec![cb(
            i18n::t(lang, "call.cancel_button"),
            CallbackAction::CallMenuCancel {
                room_id: invite.room_id.clone(),
                initiator_id: invite.initiator_id,
                target_id: invite.target_id,
            }
            .as_data(),
        )],
    ])
}

/// Invite keyboard for the initiator: cancel only.
pub fn call_invite_initiator(lang: &LanguageIdentifier, invite: &CallInvite) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![cb(
        i18n::t(lang, "call.cancel_button"),
        CallbackAction::CallMenuCancel {
            room_id: invite.room_id.clone(),
            initiator_id: invite.initiator_id,
            target_id: invite.target_id,
        }
        .as_data(),
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use teloxide::types::InlineKeyboardButtonKind;

    fn ru() -> LanguageIdentifier {
        i18n::lang_from_code("ru")
    }

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("expected callback button, got {:?}", other),
        }
    }

    #[test]
    fn test_main_menu_structure() {
        let kb = main_menu(&ru());
        assert_eq!(kb.inline_keyboard.len(), 2);
        assert_eq!(callback_data(&kb.inline_keyboard[0][0]), "start_call");
        assert_eq!(callback_data(&kb.inline_keyboard[1][0]), "add_contact");
    }

    #[test]
    fn test_call_menu_structure() {
        let kb = call_menu(&ru());
        assert_eq!(kb.inline_keyboard.len(), 3);
        assert_eq!(callback_data(&kb.inline_keyboard[0][0]), "create_link");
        assert_eq!(callback_data(&kb.inline_keyboard[1][0]), "choose_from_contacts");
        assert_eq!(callback_data(&kb.inline_keyboard[2][0]), "back_to_main");
    }

    #[test]
    fn test_search_keyboard_opens_inline_mode() {
        let kb = search_contacts(&ru());
        assert!(matches!(
            kb.inline_keyboard[0][0].kind,
            InlineKeyboardButtonKind::SwitchInlineQueryCurrentChat(_)
        ));
        // Back returns to the call menu, not the main menu
        assert_eq!(callback_data(&kb.inline_keyboard[1][0]), "start_call");
    }

    #[test]
    fn test_contacts_list_one_row_per_match() {
        let items = vec![
            ContactEntry {
                telegram_id: 10,
                username: "anna".to_string(),
            },
            ContactEntry {
                telegram_id: 20,
                username: "boris".to_string(),
            },
        ];
        let kb = contacts_list(&ru(), &items);
        assert_eq!(kb.inline_keyboard.len(), 3);
        assert_eq!(kb.inline_keyboard[0][0].text, "anna");
        assert_eq!(callback_data(&kb.inline_keyboard[0][0]), "choose_contact:10");
        assert_eq!(callback_data(&kb.inline_keyboard[1][0]), "choose_contact:20");
    }

    #[test]
    fn test_call_invite_keyboards() {
        let invite = CallInvite::new("room12345678".to_string(), 1, 2);
        let url = Url::parse("http://localhost:8080/call.html?room=room12345678").unwrap();

        let target_kb = call_invite(&ru(), &url, &invite);
        assert_eq!(target_kb.inline_keyboard.len(), 3);
        // Accept carries no callback data at all
        assert!(matches!(
            target_kb.inline_keyboard[0][0].kind,
            InlineKeyboardButtonKind::Url(_)
        ));
        assert_eq!(
            callback_data(&target_kb.inline_keyboard[1][0]),
            "call_decline:room12345678:1:2"
        );
        assert_eq!(
            callback_data(&target_kb.inline_keyboard[2][0]),
            "call_menu_cancel:room12345678:1:2"
        );

        let initiator_kb = call_invite_initiator(&ru(), &invite);
        assert_eq!(initiator_kb.inline_keyboard.len(), 1);
        assert_eq!(
            callback_data(&initiator_kb.inline_keyboard[0][0]),
            "call_menu_cancel:room12345678:1:2"
        );
    }
}
