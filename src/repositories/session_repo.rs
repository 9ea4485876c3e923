use chrono::{Duration, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, Session};
use crate::session::SESSION_TTL_DAYS;

#[derive(Clone)]
pub struct SessionRepository {
    pool: DbPool,
}

impl SessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open a session for a user, recording where the login came from.
    pub async fn create(
        &self,
        user_id: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            ip_address,
            user_agent,
            created_at: now,
        };

        let pool = self.pool.clone();
        let row = session.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO sessions (token, user_id, expires_at, ip_address, user_agent, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    row.token,
                    row.user_id,
                    row.expires_at,
                    row.ip_address,
                    row.user_agent,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(session)
    }

    /// Find a non-expired session. An expired one is deleted on the way out.
    pub async fn find_valid(&self, token: &str) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        let token = token.to_string();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let session = conn
                .query_row(
                    "SELECT * FROM sessions WHERE token = ?",
                    [&token],
                    Session::from_row,
                )
                .optional()?;

            match session {
                Some(session) if session.is_expired(now) => {
                    conn.execute("DELETE FROM sessions WHERE token = ?", [&token])?;
                    Ok(None)
                }
                other => Ok(other),
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn delete(&self, token: &str) -> Result<()> {
        let pool = self.pool.clone();
        let token = token.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute("DELETE FROM sessions WHERE token = ?", [&token])?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Batch delete all expired sessions. Returns how many were removed.
    pub async fn cleanup_expired(&self) -> Result<usize> {
        let pool = self.pool.clone();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let removed = conn.execute(
                "DELETE FROM sessions WHERE expires_at <= ?",
                rusqlite::params![now],
            )?;
            Ok(removed)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
