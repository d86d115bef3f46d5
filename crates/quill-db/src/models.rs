//! Database row types and row-to-domain mapping. The `Note` domain type
//! lives in quill-core; this module only knows how to get it in and out of
//! SQLite.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use quill_core::{Note, NoteFlags};

pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub private_notes_password: Option<String>,
    pub created_at: String,
}

/// Column list every note SELECT uses, in the order `note_from_row` expects.
pub(crate) const NOTE_COLUMNS: &str =
    "id, user_id, title, content, tags, pinned, favorite, archived, private, trashed, \
     created_at, updated_at, deleted_at";

pub(crate) fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let tags_json: String = row.get(4)?;
    let deleted_at: Option<i64> = row.get(12)?;

    Ok(Note {
        id: parse_uuid(&id, "id"),
        user_id: parse_uuid(&user_id, "user_id"),
        title: row.get(2)?,
        content: row.get(3)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_else(|e| {
            warn!("Corrupt tags '{}' on note '{}': {}", tags_json, id, e);
            Vec::new()
        }),
        flags: NoteFlags {
            pinned: row.get(5)?,
            favorite: row.get(6)?,
            archived: row.get(7)?,
            private: row.get(8)?,
            trashed: row.get(9)?,
        },
        created_at: millis_to_utc(row.get(10)?),
        updated_at: millis_to_utc(row.get(11)?),
        deleted_at: deleted_at.map(millis_to_utc),
    })
}

fn parse_uuid(raw: &str, field: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", field, raw, e);
        Uuid::default()
    })
}

fn millis_to_utc(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
