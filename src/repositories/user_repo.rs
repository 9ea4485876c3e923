use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rusqlite::{ErrorCode, OptionalExtension};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::user::{CREDENTIAL_PROVIDER, DUPLICATE_EMAIL_MESSAGE};
use crate::models::{Account, FromSqliteRow, User};

#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?")?;
            let result = stmt.query_row([&id], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let email = email.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?")?;
            let result = stmt.query_row([&email], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// The email/password account of a user, if one exists.
    pub async fn find_credential(&self, user_id: &str) -> Result<Option<Account>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT * FROM accounts WHERE user_id = ? AND provider_id = ?")?;
            let result = stmt
                .query_row([user_id.as_str(), CREDENTIAL_PROVIDER], Account::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Create a user together with its password credential account.
    pub async fn create(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let password_hash = hash_password(password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            email_verified: false,
            image: None,
            created_at: now,
            updated_at: now,
        };

        let pool = self.pool.clone();
        let row = user.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (id, name, email, email_verified, image, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    row.id,
                    row.name,
                    row.email,
                    row.email_verified,
                    row.image,
                    row.created_at,
                    row.updated_at
                ],
            )
            .map_err(duplicate_email)?;
            // The credential account is keyed by the user id itself.
            tx.execute(
                "INSERT INTO accounts (id, account_id, provider_id, user_id, password, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    Uuid::new_v4().to_string(),
                    row.id,
                    CREDENTIAL_PROVIDER,
                    row.id,
                    password_hash,
                    row.created_at,
                    row.updated_at
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(user)
    }

    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let Some(hash) = self
            .find_credential(&user.id)
            .await?
            .and_then(|account| account.password)
        else {
            return Ok(None);
        };

        if verify_password(password, &hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn update_name(&self, id: &str, name: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let id_owned = id.to_string();
        let name = name.to_string();
        let now = Utc::now();
        let rows = tokio::task::spawn_blocking(move || -> Result<usize> {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE users SET name = ?, updated_at = ? WHERE id = ?",
                rusqlite::params![name, now, id_owned],
            )?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        if rows == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Remove a user; sessions, accounts, templates and instances cascade.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute("DELETE FROM users WHERE id = ?", [&id])?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

// A concurrent sign-up can win the race past the email lookup.
fn duplicate_email(err: rusqlite::Error) -> AppError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            AppError::Validation(DUPLICATE_EMAIL_MESSAGE.to_string())
        }
        err => AppError::Database(err),
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHash)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
