//! Typed callback payloads
//!
//! Every inline keyboard button carries a colon-delimited data string.
//! `CallbackAction` is the single parse/format pair for those strings, so
//! handlers never split ad hoc and malformed payloads funnel into one
//! error path (the user sees a transient alert).

use thiserror::Error;

/// Error produced when callback data cannot be decoded.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CallbackParseError {
    #[error("unknown callback action: {0}")]
    UnknownAction(String),

    #[error("invalid payload for {action}: {payload}")]
    InvalidPayload { action: String, payload: String },
}

/// Decoded callback button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Show the personal contact-invite deep link
    AddContact,
    /// Open the call menu
    StartCall,
    /// Return to the main menu
    BackToMain,
    /// Create a bare room link without notifying anyone
    CreateLink,
    /// Prompt for a contact-search query
    ChooseFromContacts,
    /// A contact was picked from a search result list
    ChooseContact { contact_id: i64 },
    /// The call invite was declined by its recipient
    CallDecline {
        room_id: String,
        initiator_id: i64,
        target_id: i64,
    },
    /// The call was cancelled from an invite message
    CallMenuCancel {
        room_id: String,
        initiator_id: i64,
        target_id: i64,
    },
}

impl CallbackAction {
    /// Decodes a callback data string.
    pub fn parse(data: &str) -> Result<Self, CallbackParseError> {
        let (action, payload) = match data.split_once(':') {
            Some((action, payload)) => (action, Some(payload)),
            None => (data, None),
        };

        match (action, payload) {
            ("add_contact", None) => Ok(Self::AddContact),
            ("start_call", None) => Ok(Self::StartCall),
            ("back_to_main", None) => Ok(Self::BackToMain),
            ("create_link", None) => Ok(Self::CreateLink),
            ("choose_from_contacts", None) => Ok(Self::ChooseFromContacts),
            ("choose_contact", Some(payload)) => {
                let contact_id = payload
                    .parse::<i64>()
                    .map_err(|_| Self::invalid(action, payload))?;
                Ok(Self::ChooseContact { contact_id })
            }
            ("call_decline", Some(payload)) => {
                let (room_id, initiator_id, target_id) = Self::parse_invite_payload(action, payload)?;
                Ok(Self::CallDecline {
                    room_id,
                    initiator_id,
                    target_id,
                })
            }
            ("call_menu_cancel", Some(payload)) => {
                let (room_id, initiator_id, target_id) = Self::parse_invite_payload(action, payload)?;
                Ok(Self::CallMenuCancel {
                    room_id,
                    initiator_id,
                    target_id,
                })
            }
            _ => Err(CallbackParseError::UnknownAction(data.to_string())),
        }
    }

    /// Encodes the action back into its callback data string.
    pub fn as_data(&self) -> String {
        match self {
            Self::AddContact => "add_contact".to_string(),
            Self::StartCall => "start_call".to_string(),
            Self::BackToMain => "back_to_main".to_string(),
            Self::CreateLink => "create_link".to_string(),
            Self::ChooseFromContacts => "choose_from_contacts".to_string(),
            Self::ChooseContact { contact_id } => format!("choose_contact:{}", contact_id),
            Self::CallDecline {
                room_id,
                initiator_id,
                target_id,
            } => format!("call_decline:{}:{}:{}", room_id, initiator_id, target_id),
            Self::CallMenuCancel {
                room_id,
                initiator_id,
                target_id,
            } => format!("call_menu_cancel:{}:{}:{}", room_id, initiator_id, target_id),
        }
    }

    /// Decodes `<room>:<initiator>:<target>`.
    ///
    /// Room tokens are base64url, so the first colon-free segment is always
    /// the whole token.
    fn parse_invite_payload(action: &str, payload: &str) -> Result<(String, i64, i64), CallbackParseError> {
        let mut parts = payload.splitn(3, ':');
        let (Some(room_id), Some(initiator), Some(target)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Self::invalid(action, payload));
        };
        if room_id.is_empty() {
            return Err(Self::invalid(action, payload));
        }
        let initiator_id = initiator.parse::<i64>().map_err(|_| Self::invalid(action, payload))?;
        let target_id = target.parse::<i64>().map_err(|_| Self::invalid(action, payload))?;
        Ok((room_id.to_string(), initiator_id, target_id))
    }

    fn invalid(action: &str, payload: &str) -> CallbackParseError {
        CallbackParseError::InvalidPayload {
            action: action.to_string(),
            payload: payload.to_string(),
        }
    }
}
