use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The five independent status booleans. Cross-field invariants between them
/// are enforced by the engine, never by ad-hoc writes to this struct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteFlags {
    pub pinned: bool,
    pub favorite: bool,
    pub archived: bool,
    pub private: bool,
    pub trashed: bool,
}

/// A user-owned note. Ownership is exclusive: every store lookup is filtered
/// by `user_id`, so a note belonging to someone else is indistinguishable
/// from a nonexistent one.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub flags: NoteFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the note is moved to trash, cleared on restore.
    /// Invariant: `Some` iff `flags.trashed`.
    pub deleted_at: Option<DateTime<Utc>>,
}
