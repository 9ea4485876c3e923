use axum::extract::State;
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::stats::DEFAULT_RECENT_ACTIVITY_LIMIT;
use crate::models::{OverallStats, RecentActivity, RepStats, RunStats, TimeStats};
use crate::procedure::{check_limit, Procedure, ProcedureInput, UserInput};
use crate::repositories::StatsRepository;

#[derive(Clone)]
pub struct StatsState {
    pub stats_repo: StatsRepository,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFilterInput {
    user_id: String,
    #[serde(default)]
    template_id: Option<String>,
}

impl TemplateFilterInput {
    /// A blank `templateId` means no filter.
    fn template_filter(&self) -> Option<&str> {
        self.template_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityInput {
    user_id: String,
    #[serde(default = "default_recent_limit")]
    limit: i64,
}

fn default_recent_limit() -> i64 {
    DEFAULT_RECENT_ACTIVITY_LIMIT
}

pub async fn overall(
    State(state): State<StatsState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<UserInput>,
) -> Result<Procedure<OverallStats>> {
    auth_user.ensure_owner(&input.user_id)?;

    let total_completed_workouts = state.stats_repo.count_completed(&auth_user.id).await?;
    Ok(Procedure(OverallStats {
        total_completed_workouts,
    }))
}

pub async fn runs(
    State(state): State<StatsState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<UserInput>,
) -> Result<Procedure<RunStats>> {
    auth_user.ensure_owner(&input.user_id)?;

    let rows = state.stats_repo.run_rows(&auth_user.id).await?;
    Ok(Procedure(RunStats::from_rows(&rows)))
}

pub async fn reps(
    State(state): State<StatsState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<TemplateFilterInput>,
) -> Result<Procedure<RepStats>> {
    auth_user.ensure_owner(&input.user_id)?;

    let rows = state
        .stats_repo
        .rep_rows(&auth_user.id, input.template_filter())
        .await?;
    Ok(Procedure(RepStats::from_rows(&rows)))
}

pub async fn time(
    State(state): State<StatsState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<TemplateFilterInput>,
) -> Result<Procedure<TimeStats>> {
    auth_user.ensure_owner(&input.user_id)?;

    let rows = state
        .stats_repo
        .time_rows(&auth_user.id, input.template_filter())
        .await?;
    Ok(Procedure(TimeStats::from_rows(&rows)))
}

pub async fn recent_activity(
    State(state): State<StatsState>,
    auth_user: AuthUser,
    ProcedureInput(input): ProcedureInput<RecentActivityInput>,
) -> Result<Procedure<Vec<RecentActivity>>> {
    auth_user.ensure_owner(&input.user_id)?;
    let limit = check_limit(input.limit)?;

    let activity = state
        .stats_repo
        .recent_activity(&auth_user.id, limit)
        .await?;
    Ok(Procedure(activity))
}
