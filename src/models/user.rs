use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

/// Provider id of the email/password account linked to every user.
pub const CREDENTIAL_PROVIDER: &str = "credential";

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "An account with this email already exists";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromSqliteRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            email_verified: row.get("email_verified")?,
            image: row.get("image")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// The stored password credential of a user.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: String,
    pub provider_id: String,
    pub password: Option<String>,
}

impl FromSqliteRow for Account {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            provider_id: row.get("provider_id")?,
            password: row.get("password")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl CreateUser {
    /// Trimmed name and lower-cased email, or the first problem found.
    pub fn normalized(&self) -> Result<(String, String), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let email = normalize_email(&self.email)?;
        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }
        Ok((name.to_string(), email))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub name: String,
}

pub fn normalize_email(email: &str) -> Result<String, String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err("A valid email address is required".to_string()),
    }
}
