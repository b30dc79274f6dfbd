use crate::services::links;
use crate::web::error::AppResult;
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

pub async fn home() -> Redirect {
    Redirect::to("/links")
}

pub async fn health() -> &'static str {
    "ok"
}

/// Stored URLs are kept as typed; non-ASCII ones are re-serialized by the
/// URL parser, which percent-encodes them, before going into `Location`.
fn location_header(url: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(url).ok().or_else(|| {
        let normalized = url::Url::parse(url).ok()?;
        HeaderValue::from_str(normalized.as_str()).ok()
    })
}

/// GET /:keyword
pub async fn follow(
    State(state): State<Arc<AppState>>,
    Path(keyword): Path<String>,
) -> AppResult<Response> {
    let Ok(keyword) = links::normalize_keyword(&keyword) else {
        return Ok((StatusCode::NOT_FOUND, "Not Found").into_response());
    };

    let Some(link) = links::find_link_by_keyword(&state.db, &keyword)? else {
        return Ok((StatusCode::NOT_FOUND, "Not Found").into_response());
    };

    match location_header(&link.url) {
        Some(location) => {
            Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
        }
        None => {
            tracing::warn!("Link {} has an unusable destination {:?}", link.id, link.url);
            Ok((StatusCode::NOT_FOUND, "Not Found").into_response())
        }
    }
}
