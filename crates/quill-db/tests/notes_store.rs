use chrono::{Duration, Utc};
use uuid::Uuid;

use quill_core::engine::{self, CreateNote, Flag, InitialFlags};
use quill_core::{Note, ViewKind};
use quill_db::Database;

fn open_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("quill.db")).unwrap();
    (dir, db)
}

fn seed_user(db: &Database) -> Uuid {
    let id = Uuid::new_v4();
    db.create_user(&id.to_string(), "Test User", &format!("{id}@example.com"), "hash")
        .unwrap();
    id
}

fn make_note(user_id: Uuid, title: &str, tags: &[&str]) -> Note {
    engine::create(
        user_id,
        CreateNote {
            title: title.into(),
            content: "content".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            flags: InitialFlags::default(),
        },
        Utc::now(),
    )
    .unwrap()
}

#[test]
fn insert_and_get_round_trip() {
    let (_dir, db) = open_db();
    let user = seed_user(&db);

    let note = make_note(user, "Groceries", &["  shopping ", "SHOPPING", "home"]);
    db.insert_note(&note).unwrap();

    let loaded = db.get_note(note.id, user).unwrap().unwrap();
    assert_eq!(loaded.title, "Groceries");
    assert_eq!(loaded.tags, vec!["Shopping", "Home"]);
    assert_eq!(loaded.flags, note.flags);
    assert_eq!(loaded.deleted_at, None);
    assert_eq!(
        loaded.created_at.timestamp_millis(),
        note.created_at.timestamp_millis()
    );
}

#[test]
fn lookups_are_owner_scoped() {
    let (_dir, db) = open_db();
    let owner = seed_user(&db);
    let stranger = seed_user(&db);

    let note = make_note(owner, "Mine", &[]);
    db.insert_note(&note).unwrap();

    assert!(db.get_note(note.id, owner).unwrap().is_some());
    assert!(db.get_note(note.id, stranger).unwrap().is_none());
    assert!(!db.delete_note(note.id, stranger).unwrap());
    assert!(db.get_note(note.id, owner).unwrap().is_some());
}

#[test]
fn update_note_writes_back_all_fields() {
    let (_dir, db) = open_db();
    let user = seed_user(&db);

    let mut note = make_note(user, "Draft", &[]);
    db.insert_note(&note).unwrap();

    engine::set_flag(&mut note, Flag::Favorite, true, Utc::now());
    note.title = "Final".into();
    note.tags = vec!["Work".into()];
    assert!(db.update_note(&note).unwrap());

    let loaded = db.get_note(note.id, user).unwrap().unwrap();
    assert_eq!(loaded.title, "Final");
    assert_eq!(loaded.tags, vec!["Work"]);
    assert!(loaded.flags.favorite);
}

#[test]
fn update_missing_note_reports_false() {
    let (_dir, db) = open_db();
    let user = seed_user(&db);
    let note = make_note(user, "Never stored", &[]);
    assert!(!db.update_note(&note).unwrap());
}

#[test]
fn list_views_filter_and_sort() {
    let (_dir, db) = open_db();
    let user = seed_user(&db);
    let now = Utc::now();

    let mut plain = make_note(user, "plain", &[]);
    plain.updated_at = now - Duration::minutes(3);

    let mut pinned = make_note(user, "pinned", &[]);
    engine::set_flag(&mut pinned, Flag::Pinned, true, now);
    pinned.updated_at = now - Duration::minutes(10);

    let mut favorite = make_note(user, "favorite", &[]);
    engine::set_flag(&mut favorite, Flag::Favorite, true, now);
    favorite.updated_at = now - Duration::minutes(1);

    let mut archived = make_note(user, "archived", &[]);
    engine::set_flag(&mut archived, Flag::Archived, true, now);

    let mut private = make_note(user, "private", &[]);
    engine::set_flag(&mut private, Flag::Private, true, now);

    let mut trashed_private = make_note(user, "trashed private", &[]);
    engine::set_flag(&mut trashed_private, Flag::Private, true, now);
    engine::soft_delete(&mut trashed_private, now);

    for n in [&plain, &pinned, &favorite, &archived, &private, &trashed_private] {
        db.insert_note(n).unwrap();
    }

    // Default view: pinned first despite being the oldest, no archived,
    // private, or trashed notes.
    let all = db.list_notes(user, ViewKind::All, None, None).unwrap();
    let titles: Vec<&str> = all.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["pinned", "favorite", "plain"]);

    let favs = db.list_notes(user, ViewKind::Favorites, None, None).unwrap();
    assert_eq!(favs.len(), 1);
    assert_eq!(favs[0].title, "favorite");

    let archive = db.list_notes(user, ViewKind::Archive, None, None).unwrap();
    assert_eq!(archive.len(), 1);
    assert_eq!(archive[0].title, "archived");

    // Trash view surfaces trashed notes regardless of other flags.
    let trash = db.list_notes(user, ViewKind::Trash, None, None).unwrap();
    assert_eq!(trash.len(), 1);
    assert_eq!(trash[0].title, "trashed private");
    assert!(trash[0].flags.private);

    let priv_view = db.list_notes(user, ViewKind::Private, None, None).unwrap();
    assert_eq!(priv_view.len(), 1);
    assert_eq!(priv_view[0].title, "private");
}

#[test]
fn list_filters_by_tag_and_text() {
    let (_dir, db) = open_db();
    let user = seed_user(&db);

    let work = make_note(user, "standup notes", &["work"]);
    let home = make_note(user, "fix the fence", &["home"]);
    db.insert_note(&work).unwrap();
    db.insert_note(&home).unwrap();

    // Tag filter expects a normalized tag.
    let tagged = db.list_notes(user, ViewKind::All, Some("Work"), None).unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].title, "standup notes");

    let found = db.list_notes(user, ViewKind::All, None, Some("FENCE")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "fix the fence");

    let none = db.list_notes(user, ViewKind::All, None, Some("missing")).unwrap();
    assert!(none.is_empty());
}

#[test]
fn list_tags_dedupes_case_insensitively() {
    let (_dir, db) = open_db();
    let user = seed_user(&db);
    let now = Utc::now();

    let mut older = make_note(user, "older", &["Work", "Home"]);
    older.updated_at = now - Duration::minutes(5);
    let newer = make_note(user, "newer", &["work", "Errands"]);

    db.insert_note(&older).unwrap();
    db.insert_note(&newer).unwrap();

    let tags = db.list_tags(user).unwrap();
    assert_eq!(tags, vec!["Work", "Errands", "Home"]);
}

#[test]
fn purge_respects_retention_window() {
    let (_dir, db) = open_db();
    let user = seed_user(&db);
    let now = Utc::now();

    let mut expired = make_note(user, "expired", &[]);
    engine::soft_delete(&mut expired, now - Duration::days(31));

    let mut recent = make_note(user, "recent", &[]);
    engine::soft_delete(&mut recent, now - Duration::days(29));

    let untouched = make_note(user, "untouched", &[]);

    db.insert_note(&expired).unwrap();
    db.insert_note(&recent).unwrap();
    db.insert_note(&untouched).unwrap();

    let purged = db.purge_expired_trash(now - Duration::days(30)).unwrap();
    assert_eq!(purged, 1);

    assert!(db.get_note(expired.id, user).unwrap().is_none());
    assert!(db.get_note(recent.id, user).unwrap().is_some());
    assert!(db.get_note(untouched.id, user).unwrap().is_some());

    // A second sweep finds nothing; the filter is idempotent.
    let purged = db.purge_expired_trash(now - Duration::days(30)).unwrap();
    assert_eq!(purged, 0);
}

#[test]
fn user_credential_updates() {
    let (_dir, db) = open_db();
    let user = seed_user(&db);
    let id = user.to_string();

    assert!(db.update_user_name(&id, "Renamed").unwrap());
    let row = db.get_user_by_id(&id).unwrap().unwrap();
    assert_eq!(row.full_name, "Renamed");
    assert_eq!(row.private_notes_password, None);

    assert!(db.set_private_password(&id, Some("hash-value")).unwrap());
    let row = db.get_user_by_id(&id).unwrap().unwrap();
    assert_eq!(row.private_notes_password.as_deref(), Some("hash-value"));

    assert!(db.set_private_password(&id, None).unwrap());
    let row = db.get_user_by_id(&id).unwrap().unwrap();
    assert_eq!(row.private_notes_password, None);

    assert!(!db.update_user_name(&Uuid::new_v4().to_string(), "Nope").unwrap());
}
