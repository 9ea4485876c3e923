//! Procedures over the standalone `workouts` table, kept for older clients.

use axum::extract::State;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{CreateWorkout, Workout};
use crate::procedure::{Procedure, ProcedureInput, UserInput};
use crate::repositories::WorkoutRepository;

#[derive(Clone)]
pub struct WorkoutsState {
    pub workout_repo: WorkoutRepository,
}

/// Input is optional here; without it the session user's workouts are listed.
pub async fn get_all(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<Option<UserInput>>,
) -> Result<Procedure<Vec<Workout>>> {
    if let Some(input) = &input {
        auth_user.ensure_owner(&input.user_id)?;
    }

    let workouts = state.workout_repo.find_by_user(&auth_user.id).await?;
    Ok(Procedure(workouts))
}

pub async fn create(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<CreateWorkout>,
) -> Result<Procedure<Workout>> {
    auth_user.ensure_owner(&input.user_id)?;
    input.validate().map_err(AppError::Validation)?;

    let workout = state.workout_repo.create(input).await?;
    Ok(Procedure(workout))
}
