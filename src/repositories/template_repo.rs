use chrono::Utc;
use rusqlite::{OptionalExtension, ToSql};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{CreateTemplate, FromSqliteRow, UpdateTemplate, WorkoutTemplate};

#[derive(Clone)]
pub struct TemplateRepository {
    pool: DbPool,
}

impl TemplateRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_all_by_user(&self, user_id: &str) -> Result<Vec<WorkoutTemplate>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_templates WHERE user_id = ? ORDER BY type, name",
            )?;
            let templates = stmt
                .query_map([&user_id], WorkoutTemplate::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(templates)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_id(&self, id: &str, user_id: &str) -> Result<Option<WorkoutTemplate>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT * FROM workout_templates WHERE id = ? AND user_id = ?")?;
            let result = stmt
                .query_row([&id, &user_id], WorkoutTemplate::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn create(&self, input: CreateTemplate) -> Result<WorkoutTemplate> {
        let now = Utc::now();
        let template = WorkoutTemplate {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            name: input.name.trim().to_string(),
            kind: input.kind,
            description: input.description,
            distance: input.distance,
            target_reps: input.target_reps,
            target_duration: input.target_duration,
            created_at: now,
            updated_at: now,
        };

        let pool = self.pool.clone();
        let row = template.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workout_templates
                    (id, user_id, name, type, description, distance, target_reps, target_duration, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    row.id,
                    row.user_id,
                    row.name,
                    row.kind,
                    row.description,
                    row.distance,
                    row.target_reps,
                    row.target_duration,
                    row.created_at,
                    row.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        tracing::debug!(template_id = %template.id, kind = template.kind.as_str(), "Created workout template");
        Ok(template)
    }

    /// Apply the supplied fields only. Returns `None` when no template with
    /// this id belongs to the user.
    pub async fn update(&self, input: UpdateTemplate) -> Result<Option<WorkoutTemplate>> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql + Send>> = Vec::new();

        if let Some(name) = input.name.to_column() {
            sets.push("name = ?");
            values.push(Box::new(name.map(|n| n.trim().to_string())));
        }
        if let Some(description) = input.description.to_column() {
            sets.push("description = ?");
            values.push(Box::new(description.cloned()));
        }
        if let Some(distance) = input.distance.to_column() {
            sets.push("distance = ?");
            values.push(Box::new(distance.copied()));
        }
        if let Some(target_reps) = input.target_reps.to_column() {
            sets.push("target_reps = ?");
            values.push(Box::new(target_reps.copied()));
        }
        if let Some(target_duration) = input.target_duration.to_column() {
            sets.push("target_duration = ?");
            values.push(Box::new(target_duration.copied()));
        }

        if sets.is_empty() {
            return self.find_by_id(&input.id, &input.user_id).await;
        }

        sets.push("updated_at = ?");
        values.push(Box::new(Utc::now()));
        values.push(Box::new(input.id.clone()));
        values.push(Box::new(input.user_id.clone()));

        let query = format!(
            "UPDATE workout_templates SET {} WHERE id = ? AND user_id = ?",
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
        self.find_by_id(&input.id, &input.user_id).await
    }

    /// Delete a template; its instances go with it through the foreign key.
    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM workout_templates WHERE id = ? AND user_id = ?",
                [&id, &user_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
