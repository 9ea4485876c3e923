use chrono::Utc;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{CreateWorkout, FromSqliteRow, Workout};

/// Access to the standalone `workouts` table kept for older clients.
#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Workout>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workouts WHERE user_id = ? ORDER BY completed_at DESC, rowid DESC",
            )?;
            let workouts = stmt
                .query_map([&user_id], Workout::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(workouts)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn create(&self, input: CreateWorkout) -> Result<Workout> {
        self.create_at(input, Utc::now()).await
    }

    pub async fn create_at(
        &self,
        input: CreateWorkout,
        completed_at: chrono::DateTime<Utc>,
    ) -> Result<Workout> {
        let workout = Workout {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            name: input.name.trim().to_string(),
            description: input.description,
            duration: input.duration,
            calories_burned: input.calories_burned,
            completed_at,
            created_at: completed_at,
            updated_at: completed_at,
        };

        let pool = self.pool.clone();
        let row = workout.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workouts
                    (id, user_id, name, description, duration, calories_burned, completed_at, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    row.id,
                    row.user_id,
                    row.name,
                    row.description,
                    row.duration,
                    row.calories_burned,
                    row.completed_at,
                    row.created_at,
                    row.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(workout)
    }
}
