use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::user::{normalize_email, DUPLICATE_EMAIL_MESSAGE};
use crate::models::{CreateUser, LoginCredentials, Session, UpdateProfile, User};
use crate::procedure::{ProcedureInput, Success};
use crate::repositories::{SessionRepository, UserRepository};
use crate::session::{client_info, create_session_cookie, remove_session_cookie};

#[derive(Clone)]
pub struct AuthState {
    pub user_repo: UserRepository,
    pub session_repo: SessionRepository,
    pub secure_cookies: bool,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session: Session,
    pub user: User,
}

async fn open_session(
    state: &AuthState,
    headers: &HeaderMap,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let (ip_address, user_agent) = client_info(headers);
    let session = state
        .session_repo
        .create(&user.id, ip_address, user_agent)
        .await?;

    let jar = jar.add(create_session_cookie(&session.token, state.secure_cookies));
    Ok((
        jar,
        Json(AuthResponse {
            token: session.token,
            user,
        }),
    ))
}

pub async fn sign_up(
    State(state): State<AuthState>,
    headers: HeaderMap,
    jar: CookieJar,
    ProcedureInput(form): ProcedureInput<CreateUser>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let (name, email) = form.normalized().map_err(AppError::Validation)?;

    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Validation(DUPLICATE_EMAIL_MESSAGE.to_string()));
    }

    let user = state.user_repo.create(&name, &email, &form.password).await?;
    tracing::info!(user_id = %user.id, "User signed up");

    open_session(&state, &headers, jar, user).await
}

pub async fn sign_in(
    State(state): State<AuthState>,
    headers: HeaderMap,
    jar: CookieJar,
    ProcedureInput(credentials): ProcedureInput<LoginCredentials>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let email = normalize_email(&credentials.email).map_err(|_| AppError::Unauthorized)?;

    let Some(user) = state
        .user_repo
        .verify_password(&email, &credentials.password)
        .await?
    else {
        tracing::warn!("Failed sign-in attempt");
        return Err(AppError::Unauthorized);
    };
    tracing::info!(user_id = %user.id, "User signed in");

    open_session(&state, &headers, jar, user).await
}

pub async fn sign_out(
    State(state): State<AuthState>,
    jar: CookieJar,
    OptionalAuthUser(auth_user): OptionalAuthUser,
) -> Result<(CookieJar, Json<Success>)> {
    if let Some(auth_user) = auth_user {
        state.session_repo.delete(&auth_user.session.token).await?;
        tracing::info!(user_id = %auth_user.id, "User signed out");
    }

    Ok((jar.add(remove_session_cookie()), Json(Success::ok())))
}

/// The current session and its user, or `null` when signed out.
pub async fn get_session(
    State(state): State<AuthState>,
    OptionalAuthUser(auth_user): OptionalAuthUser,
) -> Result<Json<Option<SessionResponse>>> {
    let Some(auth_user) = auth_user else {
        return Ok(Json(None));
    };

    let response = state
        .user_repo
        .find_by_id(&auth_user.id)
        .await?
        .map(|user| SessionResponse {
            session: auth_user.session,
            user,
        });
    Ok(Json(response))
}

pub async fn update_user(
    State(state): State<AuthState>,
    auth_user: AuthUser,
    ProcedureInput(form): ProcedureInput<UpdateProfile>,
) -> Result<Json<User>> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let user = state
        .user_repo
        .update_name(&auth_user.id, name)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}
