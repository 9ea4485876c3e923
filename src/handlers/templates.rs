use axum::extract::State;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{CreateTemplate, UpdateTemplate, WorkoutTemplate};
use crate::procedure::{EntityInput, Procedure, ProcedureInput, Success, UserInput};
use crate::repositories::TemplateRepository;

#[derive(Clone)]
pub struct TemplatesState {
    pub template_repo: TemplateRepository,
}

pub async fn get_all(
    State(state): State<TemplatesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<UserInput>,
) -> Result<Procedure<Vec<WorkoutTemplate>>> {
    auth_user.ensure_owner(&input.user_id)?;

    let templates = state.template_repo.find_all_by_user(&auth_user.id).await?;
    Ok(Procedure(templates))
}

pub async fn get_by_id(
    State(state): State<TemplatesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<EntityInput>,
) -> Result<Procedure<Option<WorkoutTemplate>>> {
    auth_user.ensure_owner(&input.user_id)?;

    let template = state
        .template_repo
        .find_by_id(&input.id, &auth_user.id)
        .await?;
    Ok(Procedure(template))
}

pub async fn create(
    State(state): State<TemplatesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<CreateTemplate>,
) -> Result<Procedure<WorkoutTemplate>> {
    auth_user.ensure_owner(&input.user_id)?;
    input.validate().map_err(AppError::Validation)?;

    let template = state.template_repo.create(input).await?;
    Ok(Procedure(template))
}

pub async fn update(
    State(state): State<TemplatesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<UpdateTemplate>,
) -> Result<Procedure<Option<WorkoutTemplate>>> {
    auth_user.ensure_owner(&input.user_id)?;

    // Goal fields are only meaningful against the stored kind.
    let Some(existing) = state
        .template_repo
        .find_by_id(&input.id, &auth_user.id)
        .await?
    else {
        return Ok(Procedure(None));
    };
    input
        .validate_for(existing.kind)
        .map_err(AppError::Validation)?;

    if input.is_empty() {
        return Ok(Procedure(Some(existing)));
    }

    let template = state.template_repo.update(input).await?;
    Ok(Procedure(template))
}

pub async fn delete(
    State(state): State<TemplatesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<EntityInput>,
) -> Result<Procedure<Success>> {
    auth_user.ensure_owner(&input.user_id)?;

    let deleted = state.template_repo.delete(&input.id, &auth_user.id).await?;
    if deleted {
        tracing::info!(template_id = %input.id, "Deleted workout template");
    }
    Ok(Procedure(Success::ok()))
}
