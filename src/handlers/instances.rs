use axum::extract::State;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{CreateInstance, InstanceWithTemplate, UpdateInstance, WorkoutInstance};
use crate::procedure::{check_limit, EntityInput, Procedure, ProcedureInput, Success};
use crate::repositories::instance_repo::DEFAULT_LIST_LIMIT;
use crate::repositories::{InstanceRepository, TemplateRepository};

#[derive(Clone)]
pub struct InstancesState {
    pub instance_repo: InstanceRepository,
    pub template_repo: TemplateRepository,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInput {
    user_id: String,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByTemplateInput {
    template_id: String,
    user_id: String,
}

pub async fn get_all(
    State(state): State<InstancesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<ListInput>,
) -> Result<Procedure<Vec<InstanceWithTemplate>>> {
    auth_user.ensure_owner(&input.user_id)?;
    let limit = check_limit(input.limit)?;

    let instances = state
        .instance_repo
        .find_all_by_user(&auth_user.id, limit)
        .await?;
    Ok(Procedure(instances))
}

pub async fn get_by_template(
    State(state): State<InstancesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<ByTemplateInput>,
) -> Result<Procedure<Vec<WorkoutInstance>>> {
    auth_user.ensure_owner(&input.user_id)?;

    let instances = state
        .instance_repo
        .find_by_template(&input.template_id, &auth_user.id)
        .await?;
    Ok(Procedure(instances))
}

pub async fn get_by_id(
    State(state): State<InstancesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<EntityInput>,
) -> Result<Procedure<Option<InstanceWithTemplate>>> {
    auth_user.ensure_owner(&input.user_id)?;

    let instance = state
        .instance_repo
        .find_by_id(&input.id, &auth_user.id)
        .await?;
    Ok(Procedure(instance))
}

pub async fn create(
    State(state): State<InstancesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<CreateInstance>,
) -> Result<Procedure<WorkoutInstance>> {
    auth_user.ensure_owner(&input.user_id)?;

    // Looking the template up under the caller keeps instance and template
    // owners identical.
    let template = state
        .template_repo
        .find_by_id(&input.template_id, &auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workout template not found".to_string()))?;
    input
        .validate_for(template.kind)
        .map_err(AppError::Validation)?;

    let instance = state.instance_repo.create(input).await?;
    tracing::debug!(instance_id = %instance.id, template_id = %template.id, "Recorded workout instance");
    Ok(Procedure(instance))
}

pub async fn update(
    State(state): State<InstancesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<UpdateInstance>,
) -> Result<Procedure<Option<WorkoutInstance>>> {
    auth_user.ensure_owner(&input.user_id)?;

    let Some(existing) = state
        .instance_repo
        .find_by_id(&input.id, &auth_user.id)
        .await?
    else {
        return Ok(Procedure(None));
    };
    input
        .validate_for(existing.template.kind)
        .map_err(AppError::Validation)?;

    if input.is_empty() {
        return Ok(Procedure(Some(existing.instance)));
    }

    let instance = state.instance_repo.update(input).await?;
    Ok(Procedure(instance))
}

pub async fn mark_complete(
    State(state): State<InstancesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<EntityInput>,
) -> Result<Procedure<Option<WorkoutInstance>>> {
    auth_user.ensure_owner(&input.user_id)?;

    let instance = state
        .instance_repo
        .mark_complete(&input.id, &auth_user.id)
        .await?;
    Ok(Procedure(instance))
}

pub async fn delete(
    State(state): State<InstancesState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<EntityInput>,
) -> Result<Procedure<Success>> {
    auth_user.ensure_owner(&input.user_id)?;

    state.instance_repo.delete(&input.id, &auth_user.id).await?;
    Ok(Procedure(Success::ok()))
}
