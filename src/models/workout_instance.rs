use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::workout_template::{check_positive, check_positive_f64};
use super::{FromSqliteRow, Patch, WorkoutKind, WorkoutTemplate};

/// One attempt at a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutInstance {
    pub id: String,
    pub template_id: String,
    pub user_id: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
    pub lap_times: Option<Vec<f64>>,
    pub actual_reps: Option<i64>,
    pub actual_duration: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromSqliteRow for WorkoutInstance {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let lap_times: Option<String> = row.get("lap_times")?;
        let lap_times = lap_times
            .map(|raw| decode_lap_times(&raw))
            .transpose()?;

        Ok(Self {
            id: row.get("id")?,
            template_id: row.get("template_id")?,
            user_id: row.get("user_id")?,
            completed: row.get("completed")?,
            completed_at: row.get("completed_at")?,
            duration: row.get("duration")?,
            lap_times,
            actual_reps: row.get("actual_reps")?,
            actual_duration: row.get("actual_duration")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Lap times live in a TEXT column as a JSON array.
pub fn encode_lap_times(laps: &[f64]) -> serde_json::Result<String> {
    serde_json::to_string(laps)
}

fn decode_lap_times(raw: &str) -> rusqlite::Result<Vec<f64>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceWithTemplate {
    pub instance: WorkoutInstance,
    pub template: WorkoutTemplate,
}

impl FromSqliteRow for InstanceWithTemplate {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            instance: WorkoutInstance::from_row(row)?,
            template: WorkoutTemplate::from_prefixed_row(row, "t_")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstance {
    pub template_id: String,
    pub user_id: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub lap_times: Option<Vec<f64>>,
    #[serde(default)]
    pub actual_reps: Option<i64>,
    #[serde(default)]
    pub actual_duration: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateInstance {
    /// Check the result fields against the kind of the referenced template.
    pub fn validate_for(&self, kind: WorkoutKind) -> Result<(), String> {
        check_result_fields(
            kind,
            self.duration.is_some() || self.lap_times.is_some(),
            self.actual_reps.is_some(),
            self.actual_duration.is_some(),
        )?;
        check_positive("duration", self.duration)?;
        check_positive("actualReps", self.actual_reps)?;
        check_positive("actualDuration", self.actual_duration)?;
        check_lap_times(self.lap_times.as_deref())
    }

    /// Completion time to store: the supplied one, or now when the instance
    /// is recorded as already completed.
    pub fn effective_completed_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.completed_at {
            Some(at) => Some(at),
            None if self.completed => Some(now),
            None => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstance {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub completed: Patch<bool>,
    #[serde(default)]
    pub completed_at: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Patch<i64>,
    #[serde(default)]
    pub lap_times: Patch<Vec<f64>>,
    #[serde(default)]
    pub actual_reps: Patch<i64>,
    #[serde(default)]
    pub actual_duration: Patch<i64>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl UpdateInstance {
    pub fn is_empty(&self) -> bool {
        self.completed.is_unset()
            && self.completed_at.is_unset()
            && self.duration.is_unset()
            && self.lap_times.is_unset()
            && self.actual_reps.is_unset()
            && self.actual_duration.is_unset()
            && self.notes.is_unset()
    }

    pub fn validate_for(&self, kind: WorkoutKind) -> Result<(), String> {
        if self.completed.is_null() {
            return Err("completed cannot be null".to_string());
        }
        check_result_fields(
            kind,
            self.duration.as_value().is_some() || self.lap_times.as_value().is_some(),
            self.actual_reps.as_value().is_some(),
            self.actual_duration.as_value().is_some(),
        )?;
        check_positive("duration", self.duration.as_value().copied())?;
        check_positive("actualReps", self.actual_reps.as_value().copied())?;
        check_positive("actualDuration", self.actual_duration.as_value().copied())?;
        check_lap_times(self.lap_times.as_value().map(Vec::as_slice))
    }
}

fn check_result_fields(
    kind: WorkoutKind,
    run_fields: bool,
    reps_fields: bool,
    time_fields: bool,
) -> Result<(), String> {
    let offending = match kind {
        WorkoutKind::Run if reps_fields => Some("actualReps"),
        WorkoutKind::Run if time_fields => Some("actualDuration"),
        WorkoutKind::Reps if run_fields => Some("duration/lapTimes"),
        WorkoutKind::Reps if time_fields => Some("actualDuration"),
        WorkoutKind::Time if run_fields => Some("duration/lapTimes"),
        WorkoutKind::Time if reps_fields => Some("actualReps"),
        _ => None,
    };
    match offending {
        Some(field) => Err(format!(
            "{field} is not allowed for {} workouts",
            kind.as_str()
        )),
        None => Ok(()),
    }
}

fn check_lap_times(laps: Option<&[f64]>) -> Result<(), String> {
    for lap in laps.unwrap_or_default() {
        check_positive_f64("lapTimes", Some(*lap))?;
    }
    Ok(())
}
