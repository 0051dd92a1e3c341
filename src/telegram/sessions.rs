//! Per-user conversational state
//!
//! Dialog state lives outside the framework, keyed by Telegram user id.
//! A user is either idle (no entry), naming themselves during
//! registration, or typing a contact-search query. The registration state
//! carries the deferred invite payload from a `?start=add_<id>` deep link,
//! so the contact edge is created once naming completes.

use dashmap::DashMap;

/// One user's position in a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    /// Registration: waiting for a display name; `invite_owner_id` is the
    /// deferred contact link to apply after the name is accepted.
    AwaitingName { invite_owner_id: Option<i64> },
    /// Call menu: waiting for a contact-search query.
    AwaitingSearchQuery,
}

/// Externally-keyed session store: user id -> dialog state.
#[derive(Debug, Default)]
pub struct Sessions {
    states: DashMap<i64, DialogState>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts the user into the given state, replacing any previous one.
    pub fn set(&self, user_id: i64, state: DialogState) {
        self.states.insert(user_id, state);
    }

    /// Returns the user's current state, if any.
    pub fn get(&self, user_id: i64) -> Option<DialogState> {
        self.states.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Returns the user to the idle state.
    pub fn clear(&self, user_id: i64) {
        self.states.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_idle_by_default() {
        let sessions = Sessions::new();
        assert_eq!(sessions.get(1), None);
    }

    #[test]
    fn test_set_and_get() {
        let sessions = Sessions::new();
        sessions.set(1, DialogState::AwaitingName { invite_owner_id: Some(9) });

        assert_eq!(
            sessions.get(1),
            Some(DialogState::AwaitingName { invite_owner_id: Some(9) })
        );
        // Other users stay idle
        assert_eq!(sessions.get(2), None);
    }

    #[test]
    fn test_set_replaces_previous_state() {
        let sessions = Sessions::new();
        sessions.set(1, DialogState::AwaitingName { invite_owner_id: None });
        sessions.set(1, DialogState::AwaitingSearchQuery);

        assert_eq!(sessions.get(1), Some(DialogState::AwaitingSearchQuery));
    }

    #[test]
    fn test_clear() {
        let sessions = Sessions::new();
        sessions.set(1, DialogState::AwaitingSearchQuery);
        sessions.clear(1);

        assert_eq!(sessions.get(1), None);
        // Clearing an idle user is a no-op
        sessions.clear(2);
    }
}
