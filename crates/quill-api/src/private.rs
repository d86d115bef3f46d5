//! Private-notes gate: a secondary password, independent of the account
//! credential, that the client must verify before showing private notes.
//! Unlock state is client-held; the server only verifies and never issues a
//! token of its own.

use axum::{Extension, Json, extract::State, http::StatusCode};
use uuid::Uuid;

use quill_core::ViewKind;
use quill_db::models::UserRow;
use quill_types::api::{
    ChangePrivatePasswordRequest, Claims, NoteResponse, PasswordStatusResponse,
    ResetPrivatePasswordRequest, SetPrivatePasswordRequest, VerifyPrivatePasswordRequest,
    VerifyPrivatePasswordResponse,
};

use crate::AppState;
use crate::auth::hash_password;
use crate::error::{ApiError, ApiResult, join_error};
use crate::notes::to_response;

pub async fn password_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<PasswordStatusResponse>> {
    let user = load_user(&state, claims.sub).await?;
    Ok(Json(PasswordStatusResponse {
        is_password_set: user.private_notes_password.is_some(),
    }))
}

/// Set (or silently overwrite) the private-notes password. No check against
/// a prior credential is required; that is the documented contract.
pub async fn set_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SetPrivatePasswordRequest>,
) -> ApiResult<StatusCode> {
    if req.password.is_empty() {
        return Err(ApiError::Validation("password is required".into()));
    }

    let hash = hash_password(&req.password)?;
    store_private_hash(&state, claims.sub, Some(hash)).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<VerifyPrivatePasswordRequest>,
) -> ApiResult<Json<VerifyPrivatePasswordResponse>> {
    let user = load_user(&state, claims.sub).await?;
    let hash = user
        .private_notes_password
        .ok_or(ApiError::Precondition("private password not set"))?;

    // A mismatch is a negative verification, not an error.
    let verified = crate::auth::verify_password(&req.password, &hash)?;
    Ok(Json(VerifyPrivatePasswordResponse { verified }))
}

/// Clear the private-notes password back to unset. Requires the primary
/// account credential, verified against its stored hash.
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ResetPrivatePasswordRequest>,
) -> ApiResult<StatusCode> {
    if req.account_password.is_empty() {
        return Err(ApiError::Validation("account password is required".into()));
    }

    let user = load_user(&state, claims.sub).await?;
    if !crate::auth::verify_password(&req.account_password, &user.password)? {
        return Err(ApiError::AuthMismatch("incorrect account password"));
    }

    store_private_hash(&state, claims.sub, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePrivatePasswordRequest>,
) -> ApiResult<StatusCode> {
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(ApiError::Validation(
            "current and new passwords are required".into(),
        ));
    }

    let user = load_user(&state, claims.sub).await?;
    let hash = user
        .private_notes_password
        .ok_or(ApiError::Precondition("private password not set"))?;

    if !crate::auth::verify_password(&req.current_password, &hash)? {
        return Err(ApiError::AuthMismatch("incorrect current private password"));
    }

    let new_hash = hash_password(&req.new_password)?;
    store_private_hash(&state, claims.sub, Some(new_hash)).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_private_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let db = state.db.clone();
    let notes =
        tokio::task::spawn_blocking(move || db.list_notes(claims.sub, ViewKind::Private, None, None))
            .await
            .map_err(join_error)??;

    Ok(Json(notes.into_iter().map(to_response).collect()))
}

async fn load_user(state: &AppState, user_id: Uuid) -> ApiResult<UserRow> {
    let db = state.db.clone();
    let id = user_id.to_string();
    tokio::task::spawn_blocking(move || db.get_user_by_id(&id))
        .await
        .map_err(join_error)??
        .ok_or(ApiError::Unauthorized)
}

async fn store_private_hash(state: &AppState, user_id: Uuid, hash: Option<String>) -> ApiResult<()> {
    let db = state.db.clone();
    let id = user_id.to_string();
    let found = tokio::task::spawn_blocking(move || db.set_private_password(&id, hash.as_deref()))
        .await
        .map_err(join_error)??;
    if !found {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}
