use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{FromSqliteRow, Patch};

/// Workout category. Decides which goal field of a template and which
/// result fields of an instance carry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Run,
    Reps,
    Time,
}

impl WorkoutKind {
    pub const ALL: [WorkoutKind; 3] = [WorkoutKind::Run, WorkoutKind::Reps, WorkoutKind::Time];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Run => "run",
            WorkoutKind::Reps => "reps",
            WorkoutKind::Time => "time",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "run" => Some(WorkoutKind::Run),
            "reps" => Some(WorkoutKind::Reps),
            "time" => Some(WorkoutKind::Time),
            _ => None,
        }
    }

    /// JSON name of the goal field that must be set for this kind.
    pub fn goal_field(&self) -> &'static str {
        match self {
            WorkoutKind::Run => "distance",
            WorkoutKind::Reps => "targetReps",
            WorkoutKind::Time => "targetDuration",
        }
    }
}

impl ToSql for WorkoutKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WorkoutKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        WorkoutKind::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown workout type: {s}").into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
    pub description: Option<String>,
    pub distance: Option<f64>,
    pub target_reps: Option<i64>,
    pub target_duration: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutTemplate {
    /// Read a template whose columns were selected under `prefix`, as done by
    /// joins that also return instance columns.
    pub fn from_prefixed_row(row: &Row, prefix: &str) -> rusqlite::Result<Self> {
        let col = |name: &str| format!("{prefix}{name}");
        Ok(Self {
            id: row.get(col("id").as_str())?,
            user_id: row.get(col("user_id").as_str())?,
            name: row.get(col("name").as_str())?,
            kind: row.get(col("type").as_str())?,
            description: row.get(col("description").as_str())?,
            distance: row.get(col("distance").as_str())?,
            target_reps: row.get(col("target_reps").as_str())?,
            target_duration: row.get(col("target_duration").as_str())?,
            created_at: row.get(col("created_at").as_str())?,
            updated_at: row.get(col("updated_at").as_str())?,
        })
    }
}

impl FromSqliteRow for WorkoutTemplate {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Self::from_prefixed_row(row, "")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplate {
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub target_reps: Option<i64>,
    #[serde(default)]
    pub target_duration: Option<i64>,
}

impl CreateTemplate {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Template name is required".to_string());
        }

        let goals = [
            (WorkoutKind::Run, self.distance.is_some()),
            (WorkoutKind::Reps, self.target_reps.is_some()),
            (WorkoutKind::Time, self.target_duration.is_some()),
        ];
        for (kind, present) in goals {
            if kind == self.kind && !present {
                return Err(format!(
                    "{} is required for {} workouts",
                    kind.goal_field(),
                    self.kind.as_str()
                ));
            }
            if kind != self.kind && present {
                return Err(format!(
                    "{} is not allowed for {} workouts",
                    kind.goal_field(),
                    self.kind.as_str()
                ));
            }
        }

        check_positive_f64("distance", self.distance)?;
        check_positive("targetReps", self.target_reps)?;
        check_positive("targetDuration", self.target_duration)?;
        Ok(())
    }
}

/// Sparse template update. The kind of a template is fixed at creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplate {
    pub id: String,
    pub user_id: String,
    #[serde(default, rename = "type")]
    pub kind: Patch<WorkoutKind>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub distance: Patch<f64>,
    #[serde(default)]
    pub target_reps: Patch<i64>,
    #[serde(default)]
    pub target_duration: Patch<i64>,
}

impl UpdateTemplate {
    pub fn is_empty(&self) -> bool {
        self.name.is_unset()
            && self.description.is_unset()
            && self.distance.is_unset()
            && self.target_reps.is_unset()
            && self.target_duration.is_unset()
    }

    /// Check the patch against the kind of the stored template.
    pub fn validate_for(&self, kind: WorkoutKind) -> Result<(), String> {
        if !self.kind.is_unset() {
            return Err("Workout type cannot be changed".to_string());
        }

        match &self.name {
            Patch::Null => return Err("Template name cannot be null".to_string()),
            Patch::Value(name) if name.trim().is_empty() => {
                return Err("Template name is required".to_string())
            }
            _ => {}
        }

        let goals = [
            (WorkoutKind::Run, self.distance.is_unset(), self.distance.is_null()),
            (
                WorkoutKind::Reps,
                self.target_reps.is_unset(),
                self.target_reps.is_null(),
            ),
            (
                WorkoutKind::Time,
                self.target_duration.is_unset(),
                self.target_duration.is_null(),
            ),
        ];
        for (goal_kind, unset, null) in goals {
            if goal_kind == kind && null {
                return Err(format!(
                    "{} cannot be cleared on {} workouts",
                    goal_kind.goal_field(),
                    kind.as_str()
                ));
            }
            if goal_kind != kind && !unset && !null {
                return Err(format!(
                    "{} is not allowed for {} workouts",
                    goal_kind.goal_field(),
                    kind.as_str()
                ));
            }
        }

        check_positive_f64("distance", self.distance.as_value().copied())?;
        check_positive("targetReps", self.target_reps.as_value().copied())?;
        check_positive("targetDuration", self.target_duration.as_value().copied())?;
        Ok(())
    }
}

pub(crate) fn check_positive(field: &str, value: Option<i64>) -> Result<(), String> {
    match value {
        Some(v) if v <= 0 => Err(format!("{field} must be positive")),
        _ => Ok(()),
    }
}

pub(crate) fn check_positive_f64(field: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(format!("{field} must be positive")),
        _ => Ok(()),
    }
}
