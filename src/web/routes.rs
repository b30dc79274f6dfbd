use super::handlers;
use super::state::AppState;
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/link",
            get(handlers::links::list)
                .post(handlers::links::create)
                .patch(handlers::links::update_without_id)
                .delete(handlers::links::delete_without_id),
        )
        .route(
            "/link/",
            patch(handlers::links::update_without_id).delete(handlers::links::delete_without_id),
        )
        .route(
            "/link/:id",
            patch(handlers::links::update).delete(handlers::links::delete),
        )
}

pub fn dialog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(handlers::auth::login_form).post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/links",
            get(handlers::dialog::index).post(handlers::dialog::create),
        )
}

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::redirect::home))
        .route("/health", get(handlers::redirect::health))
        .route("/:keyword", get(handlers::redirect::follow))
}
