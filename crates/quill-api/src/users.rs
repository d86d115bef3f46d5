use axum::{Extension, Json, extract::State};

use quill_types::api::{Claims, UpdateUserRequest, UserResponse};

use crate::AppState;
use crate::error::{ApiError, ApiResult, join_error};

pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<UserResponse>> {
    let db = state.db.clone();
    let id = claims.sub.to_string();
    let user = tokio::task::spawn_blocking(move || db.get_user_by_id(&id))
        .await
        .map_err(join_error)??
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(UserResponse {
        id: claims.sub,
        full_name: user.full_name,
        email: user.email,
        created_at: user.created_at,
    }))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let full_name = req.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(ApiError::Validation("full name is required".into()));
    }

    let db = state.db.clone();
    let id = claims.sub.to_string();
    let user = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        if !db.update_user_name(&id, &full_name)? {
            return Err(ApiError::NotFound("user not found"));
        }
        db.get_user_by_id(&id)?.ok_or(ApiError::NotFound("user not found"))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(UserResponse {
        id: claims.sub,
        full_name: user.full_name,
        email: user.email,
        created_at: user.created_at,
    }))
}
