//! Axum route handlers for login, registration and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::session::{clear_session_cookie, session_cookie, session_token};
use crate::errors::AppError;
use crate::state::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

/// GET /login
pub async fn handle_login_page() -> Html<String> {
    Html(views::auth::login_page(None, ""))
}

/// POST /login
///
/// Starts a session and redirects to the upload page; bad credentials re-render the form
/// with a 401.
pub async fn handle_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    match state.users.authenticate(username, &form.password).await? {
        Some(record) => {
            info!("User {username} logged in");
            let token = state.sessions.create(username, &record.name).await;
            Ok(signed_in(&token))
        }
        None => {
            warn!("Failed login for {username}");
            Ok((
                StatusCode::UNAUTHORIZED,
                Html(views::auth::login_page(
                    Some("Invalid user name or password."),
                    username,
                )),
            )
                .into_response())
        }
    }
}

/// GET /register
pub async fn handle_register_page() -> Html<String> {
    Html(views::auth::register_page(None, "", ""))
}

/// POST /register
///
/// Creates the account and signs the user in. Validation and duplicate-name errors
/// re-render the form.
pub async fn handle_register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    match state.users.register(username, &form.name, &form.password).await {
        Ok(record) => {
            let token = state.sessions.create(username, &record.name).await;
            Ok(signed_in(&token))
        }
        Err(AppError::Validation(msg)) => {
            Ok(register_error(StatusCode::BAD_REQUEST, &msg, &form))
        }
        Err(AppError::Conflict(msg)) => Ok(register_error(StatusCode::CONFLICT, &msg, &form)),
        Err(e) => Err(e),
    }
}

/// GET /logout
pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token).await;
    }
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

fn register_error(status: StatusCode, message: &str, form: &RegisterForm) -> Response {
    (
        status,
        Html(views::auth::register_page(
            Some(message),
            form.username.trim(),
            &form.name,
        )),
    )
        .into_response()
}

fn signed_in(token: &str) -> Response {
    (
        [(header::SET_COOKIE, session_cookie(token))],
        Redirect::to("/"),
    )
        .into_response()
}
