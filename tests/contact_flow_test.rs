//! End-to-end flows over the storage layer and session store
//!
//! Exercises the registration, contact-linking, and call-initiation flows
//! the way the handlers drive them, without a live Bot API.

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use zvonilka::core::generate_room_id;
use zvonilka::storage::db;
use zvonilka::storage::{create_pool, get_connection, DbPool};
use zvonilka::telegram::{DialogState, Sessions};

fn file_pool(dir: &TempDir) -> DbPool {
    let path = dir.path().join("test.sqlite");
    create_pool(path.to_str().unwrap()).expect("Failed to create pool")
}

#[test]
fn registration_with_deferred_invite() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir);
    let sessions = Sessions::new();

    let inviter = 100;
    let newcomer = 200;
    {
        let conn = get_connection(&pool).unwrap();
        db::upsert_user(&conn, inviter, "inviter").unwrap();
    }

    // /start add_100 from an unregistered user: prompt for a name and
    // defer the invite payload into the dialog state
    {
        let conn = get_connection(&pool).unwrap();
        assert_eq!(db::get_user(&conn, newcomer).unwrap(), None);
    }
    sessions.set(
        newcomer,
        DialogState::AwaitingName {
            invite_owner_id: Some(inviter),
        },
    );

    // A blank name is rejected: nothing persisted, state kept
    let blank = "   ".trim();
    assert!(blank.is_empty());
    {
        let conn = get_connection(&pool).unwrap();
        assert_eq!(db::get_user(&conn, newcomer).unwrap(), None);
    }
    assert!(sessions.get(newcomer).is_some());

    // A real name completes registration and applies the deferred edge
    let Some(DialogState::AwaitingName { invite_owner_id }) = sessions.get(newcomer) else {
        panic!("expected AwaitingName state");
    };
    {
        let conn = get_connection(&pool).unwrap();
        db::upsert_user(&conn, newcomer, "newcomer").unwrap();
        db::add_contact(&conn, invite_owner_id.unwrap(), newcomer).unwrap();
    }
    sessions.clear(newcomer);

    let conn = get_connection(&pool).unwrap();
    assert_eq!(db::get_user(&conn, newcomer).unwrap().unwrap().username, "newcomer");
    assert_eq!(sessions.get(newcomer), None);

    // The inviter can now find the newcomer; the edge is one-way
    assert_eq!(db::search_contacts(&conn, inviter, "new").unwrap().len(), 1);
    assert_eq!(db::search_contacts(&conn, newcomer, "inv").unwrap().len(), 0);
}

#[test]
fn own_invite_link_creates_no_edge() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir);

    let conn = get_connection(&pool).unwrap();
    db::upsert_user(&conn, 1, "loner").unwrap();
    // Following your own add_<id> link reduces to a self-edge, which the
    // storage layer silently rejects
    db::add_contact(&conn, 1, 1).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn registered_user_invite_is_immediate_and_idempotent() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir);

    let conn = get_connection(&pool).unwrap();
    db::upsert_user(&conn, 1, "owner").unwrap();
    db::upsert_user(&conn, 2, "guest").unwrap();

    // Re-opening the same deep link twice must not duplicate the edge
    db::add_contact(&conn, 1, 2).unwrap();
    db::add_contact(&conn, 1, 2).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn single_search_match_yields_one_room() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir);
    let sessions = Sessions::new();

    let caller = 10;
    let callee = 20;
    {
        let conn = get_connection(&pool).unwrap();
        db::upsert_user(&conn, caller, "caller").unwrap();
        db::upsert_user(&conn, callee, "maria").unwrap();
        db::add_contact(&conn, caller, callee).unwrap();
    }

    sessions.set(caller, DialogState::AwaitingSearchQuery);

    let conn = get_connection(&pool).unwrap();
    let matches = db::search_contacts(&conn, caller, "mar").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].telegram_id, callee);

    // Exactly one match starts the call: one fresh room row
    let room_id = generate_room_id();
    db::create_room(&conn, &room_id, caller).unwrap();
    sessions.clear(caller);

    let (count, stored_id): (i64, String) = conn
        .query_row("SELECT COUNT(*), MAX(id) FROM rooms", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(stored_id, room_id);
    assert_eq!(room_id.len(), 12);
    assert_eq!(sessions.get(caller), None);
}

#[test]
fn re_registration_renames_without_duplicating() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir);

    let conn = get_connection(&pool).unwrap();
    db::upsert_user(&conn, 5, "old name").unwrap();
    db::upsert_user(&conn, 5, "new name").unwrap();

    let users: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);
    assert_eq!(db::get_user(&conn, 5).unwrap().unwrap().username, "new name");
}
