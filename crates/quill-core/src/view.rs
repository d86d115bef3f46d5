/// Which slice of a user's notes a listing returns. The filter is applied at
/// the SQL level by quill-db; this enum is the single source of truth for
/// what each view means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewKind {
    /// Everything except trashed, archived, and private notes.
    #[default]
    All,
    /// Favorite notes that are not trashed, archived, or private.
    Favorites,
    /// Archived notes that are not trashed or private.
    Archive,
    /// Trashed notes, irrespective of other flags.
    Trash,
    /// Private notes that are not trashed. Served behind the private gate.
    Private,
}

impl ViewKind {
    /// Parse the `view` query parameter. Unknown values fall back to the
    /// default listing.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("favorites") => ViewKind::Favorites,
            Some("archive") => ViewKind::Archive,
            Some("trash") => ViewKind::Trash,
            Some("private") => ViewKind::Private,
            _ => ViewKind::All,
        }
    }

    /// Trash and private listings sort by recency alone; everything else
    /// surfaces pinned notes first.
    pub fn pinned_first(self) -> bool {
        !matches!(self, ViewKind::Trash | ViewKind::Private)
    }
}
