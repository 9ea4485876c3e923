use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::models::Session;
use crate::repositories::SessionRepository;
use crate::session::get_session_token;

/// The caller behind a valid session.
///
/// Resolved from the session cookie or bearer token through the
/// `SessionRepository` installed as a router extension.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub session: Session,
}

impl AuthUser {
    /// Reject a request whose `userId` input names someone other than the
    /// session owner.
    pub fn ensure_owner(&self, user_id: &str) -> Result<(), AppError> {
        if self.id == user_id {
            Ok(())
        } else {
            tracing::warn!(
                session_user = %self.id,
                requested_user = %user_id,
                "Rejected request for another user's data"
            );
            Err(AppError::Forbidden(
                "userId does not match the authenticated user".to_string(),
            ))
        }
    }
}

async fn resolve(parts: &Parts) -> Result<Option<AuthUser>, AppError> {
    let Some(token) = get_session_token(&parts.headers) else {
        return Ok(None);
    };
    let sessions = parts
        .extensions
        .get::<SessionRepository>()
        .cloned()
        .ok_or_else(|| AppError::Internal("Session repository not installed".to_string()))?;

    Ok(sessions.find_valid(&token).await?.map(|session| AuthUser {
        id: session.user_id.clone(),
        session,
    }))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        resolve(parts).await?.ok_or(AppError::Unauthorized)
    }
}

// Optional auth - doesn't reject, just returns None if not logged in
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(resolve(parts).await?))
    }
}
