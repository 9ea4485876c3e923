use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, ToSql};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::workout_instance::encode_lap_times;
use crate::models::{
    CreateInstance, FromSqliteRow, InstanceWithTemplate, UpdateInstance, WorkoutInstance,
};

pub const DEFAULT_LIST_LIMIT: i64 = 50;

const SELECT_WITH_TEMPLATE: &str = "SELECT wi.*,
        t.id AS t_id, t.user_id AS t_user_id, t.name AS t_name, t.type AS t_type,
        t.description AS t_description, t.distance AS t_distance,
        t.target_reps AS t_target_reps, t.target_duration AS t_target_duration,
        t.created_at AS t_created_at, t.updated_at AS t_updated_at
     FROM workout_instances wi
     JOIN workout_templates t ON wi.template_id = t.id";

#[derive(Clone)]
pub struct InstanceRepository {
    pool: DbPool,
}

impl InstanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Newest first, each paired with its template.
    pub async fn find_all_by_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<InstanceWithTemplate>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "{SELECT_WITH_TEMPLATE}
                 WHERE wi.user_id = ?
                 ORDER BY wi.created_at DESC, wi.rowid DESC
                 LIMIT ?"
            ))?;
            let instances = stmt
                .query_map(rusqlite::params![user_id, limit], InstanceWithTemplate::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(instances)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_template(
        &self,
        template_id: &str,
        user_id: &str,
    ) -> Result<Vec<WorkoutInstance>> {
        let pool = self.pool.clone();
        let template_id = template_id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_instances
                 WHERE template_id = ? AND user_id = ?
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let instances = stmt
                .query_map([&template_id, &user_id], WorkoutInstance::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(instances)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_id(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<InstanceWithTemplate>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "{SELECT_WITH_TEMPLATE} WHERE wi.id = ? AND wi.user_id = ?"
            ))?;
            let result = stmt
                .query_row([&id, &user_id], InstanceWithTemplate::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn create(&self, input: CreateInstance) -> Result<WorkoutInstance> {
        self.create_at(input, Utc::now()).await
    }

    /// Insert with an explicit creation time. Used by the seeder to spread
    /// history over past dates.
    pub async fn create_at(
        &self,
        input: CreateInstance,
        created_at: DateTime<Utc>,
    ) -> Result<WorkoutInstance> {
        let instance = WorkoutInstance {
            id: Uuid::new_v4().to_string(),
            completed_at: input.effective_completed_at(created_at),
            template_id: input.template_id,
            user_id: input.user_id,
            completed: input.completed,
            duration: input.duration,
            lap_times: input.lap_times,
            actual_reps: input.actual_reps,
            actual_duration: input.actual_duration,
            notes: input.notes,
            created_at,
            updated_at: created_at,
        };
        let lap_times = instance
            .lap_times
            .as_deref()
            .map(encode_lap_times)
            .transpose()?;

        let pool = self.pool.clone();
        let row = instance.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workout_instances
                    (id, template_id, user_id, completed, completed_at, duration, lap_times,
                     actual_reps, actual_duration, notes, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    row.id,
                    row.template_id,
                    row.user_id,
                    row.completed,
                    row.completed_at,
                    row.duration,
                    lap_times,
                    row.actual_reps,
                    row.actual_duration,
                    row.notes,
                    row.created_at,
                    row.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(instance)
    }

    /// Apply the supplied fields only. Returns `None` when no instance with
    /// this id belongs to the user.
    pub async fn update(&self, input: UpdateInstance) -> Result<Option<WorkoutInstance>> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql + Send>> = Vec::new();

        if let Some(completed) = input.completed.to_column() {
            sets.push("completed = ?");
            values.push(Box::new(completed.copied().unwrap_or(false)));
        }
        if let Some(completed_at) = input.completed_at.to_column() {
            sets.push("completed_at = ?");
            values.push(Box::new(completed_at.copied()));
        }
        if let Some(duration) = input.duration.to_column() {
            sets.push("duration = ?");
            values.push(Box::new(duration.copied()));
        }
        if let Some(lap_times) = input.lap_times.to_column() {
            sets.push("lap_times = ?");
            let encoded = lap_times.map(|laps| encode_lap_times(laps)).transpose()?;
            values.push(Box::new(encoded));
        }
        if let Some(actual_reps) = input.actual_reps.to_column() {
            sets.push("actual_reps = ?");
            values.push(Box::new(actual_reps.copied()));
        }
        if let Some(actual_duration) = input.actual_duration.to_column() {
            sets.push("actual_duration = ?");
            values.push(Box::new(actual_duration.copied()));
        }
        if let Some(notes) = input.notes.to_column() {
            sets.push("notes = ?");
            values.push(Box::new(notes.cloned()));
        }

        if sets.is_empty() {
            return self.find_instance(&input.id, &input.user_id).await;
        }

        sets.push("updated_at = ?");
        values.push(Box::new(Utc::now()));
        values.push(Box::new(input.id.clone()));
        values.push(Box::new(input.user_id.clone()));

        let query = format!(
            "UPDATE workout_instances SET {} WHERE id = ? AND user_id = ?",
            sets.join(", ")
        );

        let pool = self.pool.clone();
        let updated = tokio::task::spawn_blocking(move || -> Result<usize> {
            let conn = pool.get()?;
            let rows = conn.execute(&query, rusqlite::params_from_iter(values.iter()))?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        if updated == 0 {
            return Ok(None);
        }
        self.find_instance(&input.id, &input.user_id).await
    }

    /// Set completed and stamp the completion time with now, whatever the
    /// previous state was.
    pub async fn mark_complete(&self, id: &str, user_id: &str) -> Result<Option<WorkoutInstance>> {
        let pool = self.pool.clone();
        let id_owned = id.to_string();
        let user_id_owned = user_id.to_string();
        let now = Utc::now();
        let updated = tokio::task::spawn_blocking(move || -> Result<usize> {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE workout_instances
                 SET completed = 1, completed_at = ?, updated_at = ?
                 WHERE id = ? AND user_id = ?",
                rusqlite::params![now, now, id_owned, user_id_owned],
            )?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        if updated == 0 {
            return Ok(None);
        }
        self.find_instance(id, user_id).await
    }

    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM workout_instances WHERE id = ? AND user_id = ?",
                [&id, &user_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    async fn find_instance(&self, id: &str, user_id: &str) -> Result<Option<WorkoutInstance>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT * FROM workout_instances WHERE id = ? AND user_id = ?")?;
            let result = stmt
                .query_row([&id, &user_id], WorkoutInstance::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
