use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use quill_core::engine::{self, CreateNote, Flag, InitialFlags, NotePatch};
use quill_core::{Note, ViewKind, tags};
use quill_types::api::{
    Claims, CreateNoteRequest, NoteResponse, SetFlagRequest, TagListResponse, UpdateNoteRequest,
};

use crate::AppState;
use crate::error::{ApiError, ApiResult, join_error};

#[derive(Debug, Deserialize)]
pub struct ListNotesQuery {
    pub view: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let note = engine::create(
        claims.sub,
        CreateNote {
            title: req.title,
            content: req.content,
            tags: req.tags,
            flags: InitialFlags {
                pinned: req.pinned,
                favorite: req.favorite,
                archived: req.archived,
                private: req.private,
            },
        },
        Utc::now(),
    )?;

    let db = state.db.clone();
    let stored = note.clone();
    tokio::task::spawn_blocking(move || db.insert_note(&stored))
        .await
        .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(to_response(note))))
}

pub async fn get_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<NoteResponse>> {
    let id = parse_note_id(&raw_id)?;
    let db = state.db.clone();
    let note = tokio::task::spawn_blocking(move || db.get_note(id, claims.sub))
        .await
        .map_err(join_error)??
        .ok_or(ApiError::NotFound("note not found"))?;

    Ok(Json(to_response(note)))
}

pub async fn edit_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
    Json(req): Json<UpdateNoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let patch = NotePatch {
        title: req.title,
        content: req.content,
        tags: req.tags,
        pinned: req.pinned,
        favorite: req.favorite,
        archived: req.archived,
        private: req.private,
    };

    let note = mutate_note(&state, claims.sub, &raw_id, move |note| {
        engine::apply_edit(note, patch, Utc::now()).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(to_response(note)))
}

pub async fn set_pinned(
    state: State<AppState>,
    claims: Extension<Claims>,
    path: Path<String>,
    req: Json<SetFlagRequest>,
) -> ApiResult<Json<NoteResponse>> {
    set_flag_endpoint(state, claims, path, Flag::Pinned, req.value).await
}

pub async fn set_favorite(
    state: State<AppState>,
    claims: Extension<Claims>,
    path: Path<String>,
    req: Json<SetFlagRequest>,
) -> ApiResult<Json<NoteResponse>> {
    set_flag_endpoint(state, claims, path, Flag::Favorite, req.value).await
}

pub async fn set_archived(
    state: State<AppState>,
    claims: Extension<Claims>,
    path: Path<String>,
    req: Json<SetFlagRequest>,
) -> ApiResult<Json<NoteResponse>> {
    set_flag_endpoint(state, claims, path, Flag::Archived, req.value).await
}

pub async fn set_private(
    state: State<AppState>,
    claims: Extension<Claims>,
    path: Path<String>,
    req: Json<SetFlagRequest>,
) -> ApiResult<Json<NoteResponse>> {
    set_flag_endpoint(state, claims, path, Flag::Private, req.value).await
}

async fn set_flag_endpoint(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
    flag: Flag,
    value: bool,
) -> ApiResult<Json<NoteResponse>> {
    let note = mutate_note(&state, claims.sub, &raw_id, move |note| {
        engine::set_flag(note, flag, value, Utc::now());
        Ok(())
    })
    .await?;

    Ok(Json(to_response(note)))
}

pub async fn soft_delete_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    mutate_note(&state, claims.sub, &raw_id, |note| {
        engine::soft_delete(note, Utc::now());
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<NoteResponse>> {
    let note = mutate_note(&state, claims.sub, &raw_id, |note| {
        engine::restore(note, Utc::now());
        Ok(())
    })
    .await?;

    Ok(Json(to_response(note)))
}

pub async fn permanent_delete_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_note_id(&raw_id)?;
    let db = state.db.clone();
    let existed = tokio::task::spawn_blocking(move || db.delete_note(id, claims.sub))
        .await
        .map_err(join_error)??;
    if !existed {
        return Err(ApiError::NotFound("note not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListNotesQuery>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let view = ViewKind::parse(query.view.as_deref());
    // The stored tags are normalized, so normalize the filter too and match
    // exactly.
    let tag = query.tag.and_then(|t| tags::normalize(&[t]).pop());
    let text = query.q.and_then(|q| {
        let trimmed = q.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    });

    let db = state.db.clone();
    let notes = tokio::task::spawn_blocking(move || {
        db.list_notes(claims.sub, view, tag.as_deref(), text.as_deref())
    })
    .await
    .map_err(join_error)??;

    Ok(Json(notes.into_iter().map(to_response).collect()))
}

pub async fn list_tags(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<TagListResponse>> {
    let db = state.db.clone();
    let tags = tokio::task::spawn_blocking(move || db.list_tags(claims.sub))
        .await
        .map_err(join_error)??;

    Ok(Json(TagListResponse { tags }))
}

/// Read-modify-write over a single owner-scoped note, run off the async
/// runtime. Concurrent writers race last-write-wins, which is acceptable for
/// single-user-per-note ownership.
async fn mutate_note<F>(state: &AppState, user_id: Uuid, raw_id: &str, op: F) -> ApiResult<Note>
where
    F: FnOnce(&mut Note) -> Result<(), ApiError> + Send + 'static,
{
    let id = parse_note_id(raw_id)?;
    let db = state.db.clone();

    tokio::task::spawn_blocking(move || -> Result<Note, ApiError> {
        let mut note = db
            .get_note(id, user_id)?
            .ok_or(ApiError::NotFound("note not found"))?;
        op(&mut note)?;
        if !db.update_note(&note)? {
            return Err(ApiError::NotFound("note not found"));
        }
        Ok(note)
    })
    .await
    .map_err(join_error)?
}

/// Malformed ids are rejected before any store lookup, distinct from
/// not-found.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId)
}

pub(crate) fn to_response(note: Note) -> NoteResponse {
    NoteResponse {
        id: note.id,
        user_id: note.user_id,
        title: note.title,
        content: note.content,
        tags: note.tags,
        pinned: note.flags.pinned,
        favorite: note.flags.favorite,
        archived: note.flags.archived,
        private: note.flags.private,
        trashed: note.flags.trashed,
        created_at: note.created_at,
        updated_at: note.updated_at,
        deleted_at: note.deleted_at,
    }
}
