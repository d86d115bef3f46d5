pub mod auth;
pub mod error;
pub mod middleware;
pub mod notes;
pub mod private;
pub mod users;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use quill_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub jwt_secret: String,
}

/// Assemble the full route tree. CORS and trace layers are applied by the
/// server binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/me", get(users::get_me).put(users::update_me))
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route("/notes/tags", get(notes::list_tags))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .put(notes::edit_note)
                .delete(notes::soft_delete_note),
        )
        .route("/notes/{id}/restore", put(notes::restore_note))
        .route("/notes/{id}/permanent", delete(notes::permanent_delete_note))
        .route("/notes/{id}/pinned", put(notes::set_pinned))
        .route("/notes/{id}/favorite", put(notes::set_favorite))
        .route("/notes/{id}/archived", put(notes::set_archived))
        .route("/notes/{id}/private", put(notes::set_private))
        .route("/private/notes", get(private::list_private_notes))
        .route(
            "/private/password",
            get(private::password_status).post(private::set_password),
        )
        .route("/private/password/verify", post(private::verify_password))
        .route("/private/password/reset", post(private::reset_password))
        .route("/private/password/change", post(private::change_password))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> &'static str {
    "ok"
}
