use crate::services::links::LinkError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Application error: {:?}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub fn link_error_status(err: &LinkError) -> StatusCode {
    match err {
        LinkError::Unauthenticated => StatusCode::UNAUTHORIZED,
        LinkError::BadRequest(_) | LinkError::InvalidField { .. } | LinkError::KeywordTaken => {
            StatusCode::BAD_REQUEST
        }
        LinkError::NotFound => StatusCode::NOT_FOUND,
        LinkError::Forbidden => StatusCode::FORBIDDEN,
        LinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{ "success": false, "error": ... }`, plus `"field"` for field-level errors.
impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        let status = link_error_status(&self);
        let mut body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        if let Some(field) = self.field() {
            body["field"] = serde_json::Value::from(field);
        }
        (status, Json(body)).into_response()
    }
}
