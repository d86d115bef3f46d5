//! Note lifecycle engine: creation, partial edits, and the status-flag state
//! machine. All cross-field invariants live here as a table-driven cascade,
//! so the persistence and transport layers never touch flags directly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineError;
use crate::note::{Note, NoteFlags};
use crate::tags;

/// Status flags a dedicated endpoint can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Pinned,
    Favorite,
    Archived,
    Private,
}

/// Flags forced off by the cascade. `Trashed` appears here but not in
/// [`Flag`]: trash state changes only through soft delete / restore.
#[derive(Debug, Clone, Copy)]
enum Cleared {
    Pinned,
    Archived,
    Private,
    Trashed,
}

impl Flag {
    /// The flags force-cleared when this one is set to true. Setting a flag
    /// to false never cascades. `Favorite` is deliberately decoupled from
    /// every other flag.
    fn clears(self) -> &'static [Cleared] {
        match self {
            Flag::Pinned => &[Cleared::Private],
            Flag::Favorite => &[],
            Flag::Archived => &[Cleared::Pinned, Cleared::Trashed, Cleared::Private],
            Flag::Private => &[Cleared::Pinned, Cleared::Archived, Cleared::Trashed],
        }
    }
}

/// Input for [`create`]. Initial flags default to false; `trashed` cannot be
/// set at creation.
#[derive(Debug, Clone, Default)]
pub struct CreateNote {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub flags: InitialFlags,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InitialFlags {
    pub pinned: bool,
    pub favorite: bool,
    pub archived: bool,
    pub private: bool,
}

/// A partial update. `None` means "leave untouched"; `tags`, when present,
/// fully replaces the existing set.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
    pub favorite: Option<bool>,
    pub archived: Option<bool>,
    pub private: Option<bool>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.pinned.is_none()
            && self.favorite.is_none()
            && self.archived.is_none()
            && self.private.is_none()
    }
}

/// Build a new note. Tags are normalized and initial flags are applied
/// through the same cascade as the status endpoints, so a contradictory
/// combination (e.g. pinned + private) cannot survive creation.
pub fn create(user_id: Uuid, req: CreateNote, now: DateTime<Utc>) -> Result<Note, EngineError> {
    if req.title.trim().is_empty() {
        return Err(EngineError::Validation("title is required".into()));
    }
    if req.content.trim().is_empty() {
        return Err(EngineError::Validation("content is required".into()));
    }

    let mut note = Note {
        id: Uuid::new_v4(),
        user_id,
        title: req.title,
        content: req.content,
        tags: tags::normalize(&req.tags),
        flags: NoteFlags::default(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };

    let initial = [
        (Flag::Favorite, req.flags.favorite),
        (Flag::Pinned, req.flags.pinned),
        (Flag::Archived, req.flags.archived),
        (Flag::Private, req.flags.private),
    ];
    for (flag, on) in initial {
        if on {
            set_flag(&mut note, flag, true, now);
        }
    }

    Ok(note)
}

/// Apply a partial update. Fields absent from the patch are left untouched;
/// flag changes route through the cascade so the invariants hold after the
/// edit. Always advances `updated_at`.
pub fn apply_edit(note: &mut Note, patch: NotePatch, now: DateTime<Utc>) -> Result<(), EngineError> {
    if patch.is_empty() {
        return Err(EngineError::NoChanges);
    }

    if let Some(title) = patch.title {
        if title.trim().is_empty() {
            return Err(EngineError::Validation("title cannot be empty".into()));
        }
        note.title = title;
    }
    if let Some(content) = patch.content {
        if content.trim().is_empty() {
            return Err(EngineError::Validation("content cannot be empty".into()));
        }
        note.content = content;
    }
    if let Some(raw_tags) = patch.tags {
        note.tags = tags::normalize(&raw_tags);
    }

    let flag_changes = [
        (Flag::Pinned, patch.pinned),
        (Flag::Favorite, patch.favorite),
        (Flag::Archived, patch.archived),
        (Flag::Private, patch.private),
    ];
    for (flag, change) in flag_changes {
        if let Some(value) = change {
            set_flag(note, flag, value, now);
        }
    }

    touch(note, now);
    Ok(())
}

/// Set one status flag, applying its cascade in the same mutation. Clearing
/// `trashed` through the cascade also nulls the trash timestamp.
pub fn set_flag(note: &mut Note, flag: Flag, value: bool, now: DateTime<Utc>) {
    match flag {
        Flag::Pinned => note.flags.pinned = value,
        Flag::Favorite => note.flags.favorite = value,
        Flag::Archived => note.flags.archived = value,
        Flag::Private => note.flags.private = value,
    }

    if value {
        for cleared in flag.clears() {
            match cleared {
                Cleared::Pinned => note.flags.pinned = false,
                Cleared::Archived => note.flags.archived = false,
                Cleared::Private => note.flags.private = false,
                Cleared::Trashed => {
                    note.flags.trashed = false;
                    note.deleted_at = None;
                }
            }
        }
    }

    touch(note, now);
}

/// Move a note to trash. Other flags are left as-is: a trashed note may
/// carry stale pinned/archived/private flags that listing queries simply
/// never surface.
pub fn soft_delete(note: &mut Note, now: DateTime<Utc>) {
    note.flags.trashed = true;
    note.deleted_at = Some(now);
    touch(note, now);
}

/// Bring a note back from trash. Restoring always exits archive state as
/// well, so the note reappears in the default listing.
pub fn restore(note: &mut Note, now: DateTime<Utc>) {
    note.flags.trashed = false;
    note.flags.archived = false;
    note.deleted_at = None;
    touch(note, now);
}

/// `updated_at` is monotonically non-decreasing even if the caller's clock
/// steps backwards between requests.
fn touch(note: &mut Note, now: DateTime<Utc>) {
    if now > note.updated_at {
        note.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(now: DateTime<Utc>) -> Note {
        create(
            Uuid::new_v4(),
            CreateNote {
                title: "A".into(),
                content: "b".into(),
                tags: vec![],
                flags: InitialFlags::default(),
            },
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_create_normalizes_tags() {
        let note = create(
            Uuid::new_v4(),
            CreateNote {
                title: "A".into(),
                content: "b".into(),
                tags: vec!["  work ".into(), "WORK".into()],
                flags: InitialFlags::default(),
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(note.tags, vec!["Work"]);
    }

    #[test]
    fn test_create_requires_title_and_content() {
        let err = create(
            Uuid::new_v4(),
            CreateNote {
                title: "  ".into(),
                content: "b".into(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = create(
            Uuid::new_v4(),
            CreateNote {
                title: "A".into(),
                content: "".into(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_create_cascades_initial_flags() {
        // Pinned and private both requested: private is applied last and
        // forces pinned off.
        let note = create(
            Uuid::new_v4(),
            CreateNote {
                title: "A".into(),
                content: "b".into(),
                tags: vec![],
                flags: InitialFlags {
                    pinned: true,
                    private: true,
                    ..Default::default()
                },
            },
            Utc::now(),
        )
        .unwrap();
        assert!(note.flags.private);
        assert!(!note.flags.pinned);
    }

    #[test]
    fn test_private_clears_pinned_archived_trashed() {
        let now = Utc::now();
        let mut note = sample(now);
        note.flags.pinned = true;
        note.flags.archived = true;
        soft_delete(&mut note, now);

        set_flag(&mut note, Flag::Private, true, now);
        assert!(note.flags.private);
        assert!(!note.flags.pinned);
        assert!(!note.flags.archived);
        assert!(!note.flags.trashed);
        assert_eq!(note.deleted_at, None);
    }

    #[test]
    fn test_archive_clears_pinned_trashed_private() {
        let now = Utc::now();
        let mut note = sample(now);
        note.flags.pinned = true;
        note.flags.private = true;

        set_flag(&mut note, Flag::Archived, true, now);
        assert!(note.flags.archived);
        assert!(!note.flags.pinned);
        assert!(!note.flags.private);
        assert!(!note.flags.trashed);
    }

    #[test]
    fn test_pin_clears_private() {
        let now = Utc::now();
        let mut note = sample(now);
        set_flag(&mut note, Flag::Private, true, now);

        set_flag(&mut note, Flag::Pinned, true, now);
        assert!(note.flags.pinned);
        assert!(!note.flags.private);
    }

    #[test]
    fn test_favorite_is_decoupled() {
        let now = Utc::now();
        let mut note = sample(now);
        set_flag(&mut note, Flag::Private, true, now);

        set_flag(&mut note, Flag::Favorite, true, now);
        assert!(note.flags.favorite);
        assert!(note.flags.private);
    }

    #[test]
    fn test_clearing_a_flag_never_cascades() {
        let now = Utc::now();
        let mut note = sample(now);
        set_flag(&mut note, Flag::Archived, true, now);
        set_flag(&mut note, Flag::Archived, false, now);
        // Nothing else was touched by unsetting.
        assert_eq!(note.flags, NoteFlags::default());
    }

    #[test]
    fn test_soft_delete_then_restore_round_trip() {
        let now = Utc::now();
        let mut note = sample(now);
        note.tags = vec!["Work".into()];
        note.flags.favorite = true;
        let before = note.clone();

        soft_delete(&mut note, now);
        assert!(note.flags.trashed);
        assert_eq!(note.deleted_at, Some(now));

        restore(&mut note, now);
        assert!(!note.flags.trashed);
        assert!(!note.flags.archived);
        assert_eq!(note.deleted_at, None);
        assert_eq!(note.title, before.title);
        assert_eq!(note.content, before.content);
        assert_eq!(note.tags, before.tags);
        assert_eq!(note.flags, before.flags);
    }

    #[test]
    fn test_restore_exits_archive() {
        let now = Utc::now();
        let mut note = sample(now);
        note.flags.archived = true;
        soft_delete(&mut note, now);

        restore(&mut note, now);
        assert!(!note.flags.archived);
    }

    #[test]
    fn test_soft_delete_keeps_stale_flags() {
        let now = Utc::now();
        let mut note = sample(now);
        set_flag(&mut note, Flag::Private, true, now);

        soft_delete(&mut note, now);
        assert!(note.flags.trashed);
        assert!(note.flags.private);
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        let now = Utc::now();
        let mut note = sample(now);
        let err = apply_edit(&mut note, NotePatch::default(), now).unwrap_err();
        assert_eq!(err, EngineError::NoChanges);
    }

    #[test]
    fn test_patch_replaces_tags() {
        let now = Utc::now();
        let mut note = sample(now);
        note.tags = vec!["Old".into()];

        apply_edit(
            &mut note,
            NotePatch {
                tags: Some(vec!["new".into(), "NEW".into(), "other".into()]),
                ..Default::default()
            },
            now,
        )
        .unwrap();
        assert_eq!(note.tags, vec!["New", "Other"]);
    }

    #[test]
    fn test_patch_rejects_empty_title() {
        let now = Utc::now();
        let mut note = sample(now);
        let err = apply_edit(
            &mut note,
            NotePatch {
                title: Some("   ".into()),
                ..Default::default()
            },
            now,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_patch_flags_cascade() {
        let now = Utc::now();
        let mut note = sample(now);
        apply_edit(
            &mut note,
            NotePatch {
                pinned: Some(true),
                private: Some(true),
                ..Default::default()
            },
            now,
        )
        .unwrap();
        // Private is applied after pinned and wins.
        assert!(note.flags.private);
        assert!(!note.flags.pinned);
    }

    #[test]
    fn test_updated_at_is_monotonic() {
        let now = Utc::now();
        let mut note = sample(now);
        let later = now + Duration::seconds(10);

        apply_edit(
            &mut note,
            NotePatch {
                content: Some("c".into()),
                ..Default::default()
            },
            later,
        )
        .unwrap();
        assert_eq!(note.updated_at, later);

        // A clock that stepped backwards must not rewind the timestamp.
        let earlier = now - Duration::seconds(10);
        apply_edit(
            &mut note,
            NotePatch {
                content: Some("d".into()),
                ..Default::default()
            },
            earlier,
        )
        .unwrap();
        assert_eq!(note.updated_at, later);
    }
}
