use crate::services::auth;
use crate::web::error::AppResult;
use crate::web::extractors::{OptionalUser, SESSION_COOKIE};
use crate::web::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;
use time::Duration;

fn render_login(state: &AppState, username: &str, error: Option<&str>) -> AppResult<String> {
    let mut ctx = Context::new();
    ctx.insert("username", username);
    ctx.insert("error", &error);
    Ok(state.templates.render("login.html", &ctx)?)
}

pub async fn login_form(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/links").into_response());
    }
    Ok(Html(render_login(&state, "", None)?).into_response())
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let key = form.username.to_lowercase();
    if !state.rate_limiter.check(&key) {
        tracing::warn!("Login rate limit hit for '{}'", form.username);
        let html = render_login(
            &state,
            &form.username,
            Some("Too many login attempts. Please try again later."),
        )?;
        return Ok((StatusCode::TOO_MANY_REQUESTS, Html(html)).into_response());
    }

    match auth::authenticate(&state.db, &form.username, &form.password)? {
        Some(user) => {
            state.rate_limiter.clear(&key);
            let days = state.config.auth.session_days;
            let token = auth::create_session(&state.db, user.id, days)?;
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(Duration::days(days))
                .build();

            tracing::info!("User '{}' signed in", user.username);
            Ok((jar.add(cookie), Redirect::to("/links")).into_response())
        }
        None => {
            state.rate_limiter.record_attempt(&key);
            let html = render_login(&state, &form.username, Some("Invalid username or password"))?;
            Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response())
        }
    }
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> AppResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let _ = auth::delete_session(&state.db, cookie.value());
    }

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build();

    Ok((jar.remove(cookie), Redirect::to("/login")).into_response())
}
