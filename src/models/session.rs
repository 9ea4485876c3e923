use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::Serialize;

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl FromSqliteRow for Session {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            token: row.get("token")?,
            user_id: row.get("user_id")?,
            expires_at: row.get("expires_at")?,
            ip_address: row.get("ip_address")?,
            user_agent: row.get("user_agent")?,
            created_at: row.get("created_at")?,
        })
    }
}
