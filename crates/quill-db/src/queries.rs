use crate::Database;
use crate::models::{NOTE_COLUMNS, UserRow, note_from_row};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use quill_core::{Note, ViewKind};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, full_name, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, full_name, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Returns false if the user no longer exists.
    pub fn update_user_name(&self, id: &str, full_name: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "UPDATE users SET full_name = ?1 WHERE id = ?2",
                (full_name, id),
            )?;
            Ok(affected > 0)
        })
    }

    /// Store or clear the secondary private-notes credential hash.
    pub fn set_private_password(&self, user_id: &str, hash: Option<&str>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "UPDATE users SET private_notes_password = ?1 WHERE id = ?2",
                (hash, user_id),
            )?;
            Ok(affected > 0)
        })
    }

    // -- Notes --

    pub fn insert_note(&self, note: &Note) -> Result<()> {
        let tags = serde_json::to_string(&note.tags)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO notes (id, user_id, title, content, tags, pinned, favorite, \
                 archived, private, trashed, created_at, updated_at, deleted_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    note.id.to_string(),
                    note.user_id.to_string(),
                    note.title,
                    note.content,
                    tags,
                    note.flags.pinned,
                    note.flags.favorite,
                    note.flags.archived,
                    note.flags.private,
                    note.flags.trashed,
                    note.created_at.timestamp_millis(),
                    note.updated_at.timestamp_millis(),
                    note.deleted_at.map(|t| t.timestamp_millis()),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_note(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND user_id = ?2");
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt
                .query_row((id.to_string(), user_id.to_string()), note_from_row)
                .optional()?;
            Ok(row)
        })
    }

    /// Write a note back in full (read-modify-write model). Returns false if
    /// the id + owner no longer resolves.
    pub fn update_note(&self, note: &Note) -> Result<bool> {
        let tags = serde_json::to_string(&note.tags)?;
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "UPDATE notes SET title = ?1, content = ?2, tags = ?3, pinned = ?4, \
                 favorite = ?5, archived = ?6, private = ?7, trashed = ?8, \
                 updated_at = ?9, deleted_at = ?10 \
                 WHERE id = ?11 AND user_id = ?12",
                rusqlite::params![
                    note.title,
                    note.content,
                    tags,
                    note.flags.pinned,
                    note.flags.favorite,
                    note.flags.archived,
                    note.flags.private,
                    note.flags.trashed,
                    note.updated_at.timestamp_millis(),
                    note.deleted_at.map(|t| t.timestamp_millis()),
                    note.id.to_string(),
                    note.user_id.to_string(),
                ],
            )?;
            Ok(affected > 0)
        })
    }

    /// Permanent delete. Returns false if the id + owner no longer resolves.
    pub fn delete_note(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
                (id.to_string(), user_id.to_string()),
            )?;
            Ok(affected > 0)
        })
    }

    /// View-filtered, owner-scoped listing. `tag` must already be normalized
    /// (exact match against the stored set); `text` is a case-insensitive
    /// substring search over title and content.
    pub fn list_notes(
        &self,
        user_id: Uuid,
        view: ViewKind,
        tag: Option<&str>,
        text: Option<&str>,
    ) -> Result<Vec<Note>> {
        let mut sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ?1");
        let mut params: Vec<String> = vec![user_id.to_string()];

        sql.push_str(match view {
            ViewKind::All => " AND trashed = 0 AND archived = 0 AND private = 0",
            ViewKind::Favorites => {
                " AND favorite = 1 AND trashed = 0 AND archived = 0 AND private = 0"
            }
            ViewKind::Archive => " AND archived = 1 AND trashed = 0 AND private = 0",
            ViewKind::Trash => " AND trashed = 1",
            ViewKind::Private => " AND private = 1 AND trashed = 0",
        });

        if let Some(tag) = tag {
            params.push(tag.to_string());
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM json_each(notes.tags) WHERE json_each.value = ?{})",
                params.len()
            ));
        }

        if let Some(text) = text {
            params.push(format!("%{}%", text.to_lowercase()));
            let n = params.len();
            sql.push_str(&format!(
                " AND (lower(title) LIKE ?{n} OR lower(content) LIKE ?{n})"
            ));
        }

        if view.pinned_first() {
            sql.push_str(" ORDER BY pinned DESC, updated_at DESC");
        } else {
            sql.push_str(" ORDER BY updated_at DESC");
        }

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), note_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Distinct tags across all of a user's notes, deduped case-insensitively
    /// keeping the first spelling seen in `updated_at DESC` order.
    pub fn list_tags(&self, user_id: Uuid) -> Result<Vec<String>> {
        let tag_lists: Vec<String> = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT tags FROM notes WHERE user_id = ?1 ORDER BY updated_at DESC")?;
            let rows = stmt
                .query_map([user_id.to_string()], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        let mut seen = std::collections::HashSet::new();
        let mut tags = Vec::new();
        for list in tag_lists {
            let parsed: Vec<String> = serde_json::from_str(&list).unwrap_or_default();
            for tag in parsed {
                if seen.insert(tag.to_lowercase()) {
                    tags.push(tag);
                }
            }
        }
        Ok(tags)
    }

    /// Delete every trashed note whose trash timestamp is older than
    /// `cutoff`. Idempotent; the sweeper calls this on a timer.
    pub fn purge_expired_trash(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM notes \
                 WHERE trashed = 1 AND deleted_at IS NOT NULL AND deleted_at < ?1",
                [cutoff.timestamp_millis()],
            )?;
            Ok(affected)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, full_name, email, password, private_notes_password, created_at \
         FROM users WHERE {column} = ?1"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                full_name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                private_notes_password: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
