pub mod auth;
pub mod health;
pub mod instances;
pub mod stats;
pub mod templates;
pub mod workouts;
