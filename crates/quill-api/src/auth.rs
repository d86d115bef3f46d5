use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use quill_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::AppState;
use crate::error::{ApiError, ApiResult, join_error};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.full_name.trim().is_empty() {
        return Err(ApiError::Validation("full name is required".into()));
    }
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::Validation("email is required".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    let db = state.db.clone();
    let lookup = email.clone();
    let existing = tokio::task::spawn_blocking(move || db.get_user_by_email(&lookup))
        .await
        .map_err(join_error)??;
    if existing.is_some() {
        return Err(ApiError::Conflict("user already exists"));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    let db = state.db.clone();
    let (uid, name, em) = (user_id.to_string(), req.full_name.clone(), email.clone());
    tokio::task::spawn_blocking(move || db.create_user(&uid, &name, &em, &password_hash))
        .await
        .map_err(join_error)??;

    let token = create_token(&state.jwt_secret, user_id, &email)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::Validation("email is required".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::Validation("password is required".into()));
    }

    let db = state.db.clone();
    let lookup = email.clone();
    let user = tokio::task::spawn_blocking(move || db.get_user_by_email(&lookup))
        .await
        .map_err(join_error)??
        .ok_or(ApiError::AuthMismatch("invalid credentials"))?;

    if !verify_password(&req.password, &user.password)? {
        return Err(ApiError::AuthMismatch("invalid credentials"));
    }

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}': {}", user.id, e)))?;

    let token = create_token(&state.jwt_secret, user_id, &user.email)?;

    Ok(Json(LoginResponse {
        user_id,
        full_name: user.full_name,
        email: user.email,
        token,
    }))
}

/// Argon2id hash, also used for the private-notes secondary credential.
pub(crate) fn hash_password(plain: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))
}

/// A mismatch is an Ok(false), not an error; only a corrupt stored hash is.
pub(crate) fn verify_password(plain: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash is corrupt: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
