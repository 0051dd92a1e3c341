use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result;

use crate::core::config;
use crate::core::error::AppResult;

/// Структура, представляющая пользователя в базе данных.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Telegram ID пользователя
    pub telegram_id: i64,
    /// Отображаемое имя, выбранное при регистрации (не уникально)
    pub username: String,
    /// Дата создания записи
    pub created_at: String,
}

/// Строка результата поиска по контактам: контакт и его имя.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEntry {
    /// Telegram ID контакта
    pub telegram_id: i64,
    /// Сохранённое имя контакта
    pub username: String,
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a pool of up to 10 connections with `foreign_keys` enabled
/// per connection, and creates the schema on first use.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let conn = pool.get()?;
    migrate_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Creates the schema if it does not exist yet.
///
/// Contact edges are ordered pairs (owner, contact); removing either
/// endpoint cascades into the edge. Rooms are a one-shot link registry
/// with no expiration or state.
fn migrate_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            telegram_id INTEGER PRIMARY KEY,
            username    TEXT NOT NULL,
            created_at  DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS contacts (
            owner_telegram_id   INTEGER NOT NULL,
            contact_telegram_id INTEGER NOT NULL,
            created_at          DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (owner_telegram_id, contact_telegram_id),
            FOREIGN KEY (owner_telegram_id) REFERENCES users(telegram_id) ON DELETE CASCADE,
            FOREIGN KEY (contact_telegram_id) REFERENCES users(telegram_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_contacts_owner ON contacts(owner_telegram_id);

        CREATE TABLE IF NOT EXISTS rooms (
            id         TEXT PRIMARY KEY,
            created_by INTEGER NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )?;
    Ok(())
}

/// Создаёт пользователя или обновляет его имя при повторной регистрации.
///
/// # Arguments
///
/// * `conn` - Соединение с базой данных
/// * `telegram_id` - Telegram ID пользователя
/// * `username` - Отображаемое имя
///
/// # Returns
///
/// Возвращает `Ok(())` при успехе или ошибку базы данных.
pub fn upsert_user(conn: &DbConnection, telegram_id: i64, username: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (telegram_id, username) VALUES (?1, ?2)
         ON CONFLICT(telegram_id) DO UPDATE SET username = excluded.username",
        &[&telegram_id as &dyn rusqlite::ToSql, &username as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Получает пользователя из базы данных по Telegram ID.
///
/// # Arguments
///
/// * `conn` - Соединение с базой данных
/// * `telegram_id` - Telegram ID пользователя
///
/// # Returns
///
/// Возвращает `Ok(Some(User))` если пользователь найден, `Ok(None)` если не найден,
/// или ошибку базы данных.
pub fn get_user(conn: &DbConnection, telegram_id: i64) -> Result<Option<User>> {
    let mut stmt = conn.prepare("SELECT telegram_id, username, created_at FROM users WHERE telegram_id = ?")?;
    let mut rows = stmt.query(&[&telegram_id as &dyn rusqlite::ToSql])?;

    if let Some(row) = rows.next()? {
        Ok(Some(User {
            telegram_id: row.get(0)?,
            username: row.get(1)?,
            created_at: row.get(2)?,
        }))
    } else {
        Ok(None)
    }
}

/// Добавляет направленное ребро контакта «owner может звонить contact».
///
/// Связь несимметричная. Контакт самому себе молча отбрасывается, повторная
/// вставка той же пары игнорируется (INSERT OR IGNORE).
///
/// # Arguments
///
/// * `conn` - Соединение с базой данных
/// * `owner_id` - Telegram ID владельца списка контактов
/// * `contact_id` - Telegram ID добавляемого контакта
pub fn add_contact(conn: &DbConnection, owner_id: i64, contact_id: i64) -> Result<()> {
    if owner_id == contact_id {
        return Ok(());
    }
    conn.execute(
        "INSERT OR IGNORE INTO contacts (owner_telegram_id, contact_telegram_id) VALUES (?1, ?2)",
        &[&owner_id as &dyn rusqlite::ToSql, &contact_id as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Ищет контакты владельца по подстроке имени (без учёта регистра).
///
/// Результат отсортирован по имени по возрастанию и ограничен 25 строками.
///
/// # Arguments
///
/// * `conn` - Соединение с базой данных
/// * `owner_id` - Telegram ID владельца списка контактов
/// * `query` - Подстрока для поиска
pub fn search_contacts(conn: &DbConnection, owner_id: i64, query: &str) -> Result<Vec<ContactEntry>> {
    let like = format!("%{}%", query.to_lowercase());
    let mut stmt = conn.prepare(
        "SELECT u.telegram_id, u.username
         FROM contacts c
         JOIN users u ON u.telegram_id = c.contact_telegram_id
         WHERE c.owner_telegram_id = ?1 AND LOWER(u.username) LIKE ?2
         ORDER BY u.username ASC
         LIMIT ?3",
    )?;
    let rows = stmt.query_map(
        &[
            &owner_id as &dyn rusqlite::ToSql,
            &like as &dyn rusqlite::ToSql,
            &config::search::MAX_RESULTS as &dyn rusqlite::ToSql,
        ],
        |row| {
            Ok(ContactEntry {
                telegram_id: row.get(0)?,
                username: row.get(1)?,
            })
        },
    )?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

/// Регистрирует комнату звонка.
///
/// Идентификатор приходит уже сгенерированным; конфликт по ключу молча
/// игнорируется, повторных попыток на уровне приложения нет.
///
/// # Arguments
///
/// * `conn` - Соединение с базой данных
/// * `room_id` - Токен комнаты
/// * `created_by` - Telegram ID инициатора
pub fn create_room(conn: &DbConnection, room_id: &str, created_by: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO rooms (id, created_by) VALUES (?1, ?2)",
        &[&room_id as &dyn rusqlite::ToSql, &created_by as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_pool() -> DbPool {
        // A single shared in-memory connection: more than one would give
        // each pooled connection its own empty database.
        let manager =
            SqliteConnectionManager::memory().with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        migrate_schema(&pool.get().unwrap()).unwrap();
        pool
    }

    #[test]
    fn test_upsert_user_updates_name_only() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        upsert_user(&conn, 100, "alice").unwrap();
        let first = get_user(&conn, 100).unwrap().unwrap();
        assert_eq!(first.username, "alice");

        upsert_user(&conn, 100, "alisa").unwrap();
        let second = get_user(&conn, 100).unwrap().unwrap();
        assert_eq!(second.username, "alisa");
        assert_eq!(second.created_at, first.created_at);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_get_user_missing_returns_none() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        assert_eq!(get_user(&conn, 42).unwrap(), None);
    }

    #[test]
    fn test_add_contact_rejects_self() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        upsert_user(&conn, 1, "solo").unwrap();

        add_contact(&conn, 1, 1).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_add_contact_is_idempotent() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        upsert_user(&conn, 1, "owner").unwrap();
        upsert_user(&conn, 2, "friend").unwrap();

        add_contact(&conn, 1, 2).unwrap();
        add_contact(&conn, 1, 2).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_contact_edge_is_one_directional() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        upsert_user(&conn, 1, "owner").unwrap();
        upsert_user(&conn, 2, "friend").unwrap();
        add_contact(&conn, 1, 2).unwrap();

        assert_eq!(search_contacts(&conn, 1, "friend").unwrap().len(), 1);
        assert_eq!(search_contacts(&conn, 2, "owner").unwrap().len(), 0);
    }

    #[test]
    fn test_search_contacts_case_insensitive_substring() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        upsert_user(&conn, 1, "owner").unwrap();
        upsert_user(&conn, 2, "Boris").unwrap();
        upsert_user(&conn, 3, "Barbara").unwrap();
        upsert_user(&conn, 4, "ingeborg").unwrap();
        add_contact(&conn, 1, 2).unwrap();
        add_contact(&conn, 1, 3).unwrap();
        add_contact(&conn, 1, 4).unwrap();

        let found = search_contacts(&conn, 1, "BOR").unwrap();
        let names: Vec<&str> = found.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["Boris", "ingeborg"]);
    }

    #[test]
    fn test_search_contacts_scoped_to_owner() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        upsert_user(&conn, 1, "owner").unwrap();
        upsert_user(&conn, 2, "other").unwrap();
        upsert_user(&conn, 3, "mutual friend").unwrap();
        add_contact(&conn, 2, 3).unwrap();

        // User 1 has no edge to user 3, so the search must not leak it
        assert_eq!(search_contacts(&conn, 1, "friend").unwrap().len(), 0);
        assert_eq!(search_contacts(&conn, 2, "friend").unwrap().len(), 1);
    }

    #[test]
    fn test_search_contacts_ordered_and_capped() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        upsert_user(&conn, 1, "owner").unwrap();
        for i in 0..30 {
            let id = 100 + i;
            upsert_user(&conn, id, &format!("user{:02}", i)).unwrap();
            add_contact(&conn, 1, id).unwrap();
        }

        let found = search_contacts(&conn, 1, "user").unwrap();
        assert_eq!(found.len(), 25);
        let mut sorted = found.clone();
        sorted.sort_by(|a, b| a.username.cmp(&b.username));
        assert_eq!(found, sorted);
    }

    #[test]
    fn test_create_room_conflict_is_ignored() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        create_room(&conn, "abc123", 1).unwrap();
        create_room(&conn, "abc123", 2).unwrap();

        let (count, created_by): (i64, i64) = conn
            .query_row("SELECT COUNT(*), MAX(created_by) FROM rooms", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        // First writer wins
        assert_eq!(created_by, 1);
    }

    #[test]
    fn test_removing_user_cascades_into_edges() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        upsert_user(&conn, 1, "owner").unwrap();
        upsert_user(&conn, 2, "friend").unwrap();
        add_contact(&conn, 1, 2).unwrap();

        conn.execute("DELETE FROM users WHERE telegram_id = 2", []).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
