use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, RecentActivity, RepRow, RunRow, TimeRow};

/// Read-only queries feeding the statistics endpoints. Rows come back most
/// recent first; summarizing happens in `models::stats`.
#[derive(Clone)]
pub struct StatsRepository {
    pool: DbPool,
}

const MOST_RECENT_FIRST: &str = "ORDER BY COALESCE(wi.completed_at, wi.created_at) DESC, wi.rowid DESC";

impl StatsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn count_completed(&self, user_id: &str) -> Result<i64> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM workout_instances WHERE user_id = ? AND completed = 1",
                [&user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn run_rows(&self, user_id: &str) -> Result<Vec<RunRow>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT t.distance, wi.duration, wi.completed_at
                 FROM workout_instances wi
                 JOIN workout_templates t ON wi.template_id = t.id
                 WHERE wi.user_id = ? AND t.type = 'run' AND wi.completed = 1
                 {MOST_RECENT_FIRST}"
            ))?;
            let rows = stmt
                .query_map([&user_id], RunRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn rep_rows(&self, user_id: &str, template_id: Option<&str>) -> Result<Vec<RepRow>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let template_id = template_id.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT t.name AS template_name, wi.actual_reps, t.target_reps, wi.completed_at
                 FROM workout_instances wi
                 JOIN workout_templates t ON wi.template_id = t.id
                 WHERE wi.user_id = ?1 AND t.type = 'reps' AND wi.completed = 1
                   AND (?2 IS NULL OR wi.template_id = ?2)
                 {MOST_RECENT_FIRST}"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, template_id], RepRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn time_rows(
        &self,
        user_id: &str,
        template_id: Option<&str>,
    ) -> Result<Vec<TimeRow>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let template_id = template_id.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT t.name AS template_name, wi.actual_duration, t.target_duration, wi.completed_at
                 FROM workout_instances wi
                 JOIN workout_templates t ON wi.template_id = t.id
                 WHERE wi.user_id = ?1 AND t.type = 'time' AND wi.completed = 1
                   AND (?2 IS NULL OR wi.template_id = ?2)
                 {MOST_RECENT_FIRST}"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, template_id], TimeRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Latest instances of any kind, completed or not, newest first.
    pub async fn recent_activity(&self, user_id: &str, limit: i64) -> Result<Vec<RecentActivity>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT wi.id AS instance_id, t.name AS template_name, t.type AS workout_type,
                        wi.completed, wi.completed_at, wi.duration, wi.actual_reps, wi.actual_duration
                 FROM workout_instances wi
                 JOIN workout_templates t ON wi.template_id = t.id
                 WHERE wi.user_id = ?
                 ORDER BY wi.created_at DESC, wi.rowid DESC
                 LIMIT ?",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], RecentActivity::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
