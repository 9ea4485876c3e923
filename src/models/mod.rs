pub mod from_row;
pub mod patch;
pub mod session;
pub mod stats;
pub mod user;
pub mod workout;
pub mod workout_instance;
pub mod workout_template;

pub use from_row::FromSqliteRow;
pub use patch::Patch;
pub use session::Session;
pub use stats::{
    OverallStats, RecentActivity, RepRow, RepStats, RunRow, RunStats, TimeRow, TimeStats,
};
pub use user::{Account, CreateUser, LoginCredentials, UpdateProfile, User};
pub use workout::{CreateWorkout, Workout};
pub use workout_instance::{CreateInstance, InstanceWithTemplate, UpdateInstance, WorkoutInstance};
pub use workout_template::{CreateTemplate, UpdateTemplate, WorkoutKind, WorkoutTemplate};
