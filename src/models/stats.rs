//! Summary statistics over a user's completed workout instances.
//!
//! Rows arrive from the repository ordered most recent first. Aggregates
//! cover every row; chart series keep only the latest [`CHART_POINTS`] rows
//! and flip them so the oldest of that window is plotted first.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::Serialize;

use super::{FromSqliteRow, WorkoutKind};

pub const CHART_POINTS: usize = 30;

pub const DEFAULT_RECENT_ACTIVITY_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_completed_workouts: i64,
}

// Run statistics

#[derive(Debug, Clone)]
pub struct RunRow {
    /// Goal distance of the template, in miles.
    pub distance: Option<f64>,
    pub duration: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FromSqliteRow for RunRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            distance: row.get("distance")?,
            duration: row.get("duration")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunChartPoint {
    pub date: Option<DateTime<Utc>>,
    pub duration: i64,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total_miles: f64,
    pub total_runs: i64,
    /// Seconds, averaged over runs that recorded a duration.
    pub avg_duration: f64,
    pub chart_data: Vec<RunChartPoint>,
}

impl RunStats {
    pub fn from_rows(rows: &[RunRow]) -> Self {
        let total_miles = rows.iter().map(|r| r.distance.unwrap_or(0.0)).sum();
        let durations: Vec<i64> = rows.iter().filter_map(|r| r.duration).collect();
        let avg_duration = average(durations.iter().sum(), durations.len());

        let chart_data = chart_window(rows)
            .map(|r| RunChartPoint {
                date: r.completed_at,
                duration: r.duration.unwrap_or(0),
                distance: r.distance.unwrap_or(0.0),
            })
            .collect();

        Self {
            total_miles,
            total_runs: rows.len() as i64,
            avg_duration,
            chart_data,
        }
    }
}

// Rep statistics

#[derive(Debug, Clone)]
pub struct RepRow {
    pub template_name: String,
    pub actual_reps: Option<i64>,
    pub target_reps: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FromSqliteRow for RepRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            template_name: row.get("template_name")?,
            actual_reps: row.get("actual_reps")?,
            target_reps: row.get("target_reps")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepChartPoint {
    pub date: Option<DateTime<Utc>>,
    pub reps: i64,
    pub target: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepStats {
    pub total_reps: i64,
    pub total_workouts: i64,
    pub avg_reps: f64,
    pub chart_data: Vec<RepChartPoint>,
}

impl RepStats {
    pub fn from_rows(rows: &[RepRow]) -> Self {
        let total_reps: i64 = rows.iter().map(|r| r.actual_reps.unwrap_or(0)).sum();

        let chart_data = chart_window(rows)
            .map(|r| RepChartPoint {
                date: r.completed_at,
                reps: r.actual_reps.unwrap_or(0),
                target: r.target_reps.unwrap_or(0),
            })
            .collect();

        Self {
            total_reps,
            total_workouts: rows.len() as i64,
            avg_reps: average(total_reps, rows.len()),
            chart_data,
        }
    }
}

// Time statistics

#[derive(Debug, Clone)]
pub struct TimeRow {
    pub template_name: String,
    pub actual_duration: Option<i64>,
    pub target_duration: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FromSqliteRow for TimeRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            template_name: row.get("template_name")?,
            actual_duration: row.get("actual_duration")?,
            target_duration: row.get("target_duration")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeChartPoint {
    pub date: Option<DateTime<Utc>>,
    pub duration: i64,
    pub target: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStats {
    /// Seconds.
    pub total_duration: i64,
    pub total_workouts: i64,
    /// Seconds per workout.
    pub avg_duration: f64,
    pub chart_data: Vec<TimeChartPoint>,
}

impl TimeStats {
    pub fn from_rows(rows: &[TimeRow]) -> Self {
        let total_duration: i64 = rows.iter().filter_map(|r| r.actual_duration).sum();

        let chart_data = chart_window(rows)
            .map(|r| TimeChartPoint {
                date: r.completed_at,
                duration: r.actual_duration.unwrap_or(0),
                target: r.target_duration.unwrap_or(0),
            })
            .collect();

        Self {
            total_duration,
            total_workouts: rows.len() as i64,
            avg_duration: average(total_duration, rows.len()),
            chart_data,
        }
    }
}

// Recent activity

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub instance_id: String,
    pub template_name: String,
    pub workout_type: WorkoutKind,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
    pub actual_reps: Option<i64>,
    pub actual_duration: Option<i64>,
}

impl FromSqliteRow for RecentActivity {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            instance_id: row.get("instance_id")?,
            template_name: row.get("template_name")?,
            workout_type: row.get("workout_type")?,
            completed: row.get("completed")?,
            completed_at: row.get("completed_at")?,
            duration: row.get("duration")?,
            actual_reps: row.get("actual_reps")?,
            actual_duration: row.get("actual_duration")?,
        })
    }
}

fn average(total: i64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

fn chart_window<T>(rows: &[T]) -> impl Iterator<Item = &T> {
    rows.iter().take(CHART_POINTS).rev()
}
