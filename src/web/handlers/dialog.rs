//! Server-rendered link creation dialog.
//!
//! Submitting validates the form, resolves the page title (falling back to
//! the URL without telling the user), then hands off to the link service.
//! Keyword conflicts and other field problems are shown next to the field;
//! everything else becomes a generic notice.

use crate::models::{CreateLink, User};
use crate::services::links::{self, LinkError};
use crate::web::error::{link_error_status, AppResult};
use crate::web::extractors::OptionalUser;
use crate::web::state::AppState;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tera::Context;

const GENERIC_FAILURE: &str = "Could not create the link. Please try again.";

#[derive(Deserialize, Default)]
pub struct IndexParams {
    created: Option<String>,
}

fn render_index(
    state: &AppState,
    user: &User,
    form: &CreateLink,
    errors: &HashMap<&'static str, String>,
    flash: Option<&str>,
    notice: Option<String>,
) -> AppResult<String> {
    let links = links::list_links_for_user(&state.db, user.id)?;

    let mut ctx = Context::new();
    ctx.insert("user", user);
    ctx.insert("links", &links);
    ctx.insert(
        "form",
        &serde_json::json!({
            "url": form.url.as_deref().unwrap_or(""),
            "keyword": form.keyword.as_deref().unwrap_or(""),
        }),
    );
    ctx.insert("errors", errors);
    ctx.insert("flash", &flash);
    ctx.insert("notice", &notice);
    ctx.insert("open_dialog", &(!errors.is_empty() || flash.is_some()));

    Ok(state.templates.render("links/index.html", &ctx)?)
}

/// GET /links
pub async fn index(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Query(params): Query<IndexParams>,
) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(Redirect::to("/login").into_response());
    };

    let notice = params
        .created
        .map(|keyword| format!("Short link /{} created.", keyword));
    let html = render_index(
        &state,
        &user,
        &CreateLink::default(),
        &HashMap::new(),
        None,
        notice,
    )?;
    Ok(Html(html).into_response())
}

/// POST /links
pub async fn create(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Form(form): Form<CreateLink>,
) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(Redirect::to("/login").into_response());
    };

    let result = match links::validate_create(&form) {
        Ok((url, _)) => {
            let title = state.titles.resolve(&url).await;
            links::create_link(&state.db, Some(user.id), &form, Some(&title))
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(link) => Ok(Redirect::to(&format!("/links?created={}", link.keyword)).into_response()),
        Err(e) => {
            let status = link_error_status(&e);
            let mut errors = HashMap::new();
            let mut flash = None;
            match e.field() {
                Some(field) => {
                    errors.insert(field, e.to_string());
                }
                None => {
                    if let LinkError::Internal(ref msg) = e {
                        tracing::error!("Link creation failed: {}", msg);
                    }
                    flash = Some(GENERIC_FAILURE);
                }
            }
            let html = render_index(&state, &user, &form, &errors, flash, None)?;
            Ok((status, Html(html)).into_response())
        }
    }
}
