use crate::models::{CreateLink, Link, UpdateLink};
use crate::services::links::{self, LinkError};
use crate::web::extractors::OptionalUser;
use crate::web::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

/// Header carrying the page title resolved by the client before creation.
pub const TITLE_HEADER: &str = "x-link-title";

fn link_response(status: StatusCode, result: Result<Link, LinkError>) -> Response {
    match result {
        Ok(link) => (
            status,
            Json(serde_json::json!({
                "success": true,
                "link": link,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// A body that fails to decode is treated as empty, so the caller still gets
/// the identity and id checks first and then learns which field is missing.
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!("Ignoring undecodable link body: {}", rejection.body_text());
            T::default()
        }
    }
}

/// GET /link
pub async fn list(State(state): State<Arc<AppState>>, user: OptionalUser) -> Response {
    match links::list_links(&state.db, user.id()) {
        Ok(links) => Json(serde_json::json!({
            "success": true,
            "links": links,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /link
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: OptionalUser,
    headers: HeaderMap,
    payload: Result<Json<CreateLink>, JsonRejection>,
) -> Response {
    let input = body_or_default(payload);
    let title = headers
        .get(TITLE_HEADER)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok());

    link_response(
        StatusCode::CREATED,
        links::create_link(&state.db, user.id(), &input, title),
    )
}

/// PATCH /link/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    user: OptionalUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateLink>, JsonRejection>,
) -> Response {
    let input = body_or_default(payload);
    link_response(
        StatusCode::OK,
        links::update_link(&state.db, user.id(), Some(&id), &input),
    )
}

/// PATCH /link
pub async fn update_without_id(State(state): State<Arc<AppState>>, user: OptionalUser) -> Response {
    link_response(
        StatusCode::OK,
        links::update_link(&state.db, user.id(), None, &UpdateLink::default()),
    )
}

/// DELETE /link/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: OptionalUser,
    Path(id): Path<String>,
) -> Response {
    link_response(
        StatusCode::OK,
        links::delete_link(&state.db, user.id(), Some(&id)),
    )
}

/// DELETE /link
pub async fn delete_without_id(State(state): State<Arc<AppState>>, user: OptionalUser) -> Response {
    link_response(
        StatusCode::OK,
        links::delete_link(&state.db, user.id(), None),
    )
}
