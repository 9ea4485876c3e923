pub mod instance_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod template_repo;
pub mod user_repo;
pub mod workout_repo;

pub use instance_repo::InstanceRepository;
pub use session_repo::SessionRepository;
pub use stats_repo::StatsRepository;
pub use template_repo::TemplateRepository;
pub use user_repo::UserRepository;
pub use workout_repo::WorkoutRepository;
