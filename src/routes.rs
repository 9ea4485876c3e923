use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{auth, health, instances, stats, templates, workouts};
use crate::repositories::SessionRepository;

pub struct AppStates {
    pub auth: auth::AuthState,
    pub workouts: workouts::WorkoutsState,
    pub templates: templates::TemplatesState,
    pub instances: instances::InstancesState,
    pub stats: stats::StatsState,
}

/// Queries answer `GET`, mutations answer `POST`.
pub fn create_router(
    states: AppStates,
    session_repo: SessionRepository,
    frontend_url: &str,
) -> Router {
    Router::new()
        // Health
        .route("/trpc/health.check", get(health::check))
        .route("/trpc/health.echo", get(health::echo))
        // Auth routes
        .route("/api/auth/sign-up/email", post(auth::sign_up))
        .route("/api/auth/sign-in/email", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/get-session", get(auth::get_session))
        .route("/api/auth/update-user", post(auth::update_user))
        .with_state(states.auth)
        // Legacy workouts
        .route("/trpc/workouts.getAll", get(workouts::get_all))
        .route("/trpc/workouts.create", post(workouts::create))
        .with_state(states.workouts)
        // Templates
        .route("/trpc/workoutTemplates.getAll", get(templates::get_all))
        .route("/trpc/workoutTemplates.getById", get(templates::get_by_id))
        .route("/trpc/workoutTemplates.create", post(templates::create))
        .route("/trpc/workoutTemplates.update", post(templates::update))
        .route("/trpc/workoutTemplates.delete", post(templates::delete))
        .with_state(states.templates)
        // Instances
        .route("/trpc/workoutInstances.getAll", get(instances::get_all))
        .route(
            "/trpc/workoutInstances.getByTemplate",
            get(instances::get_by_template),
        )
        .route("/trpc/workoutInstances.getById", get(instances::get_by_id))
        .route("/trpc/workoutInstances.create", post(instances::create))
        .route("/trpc/workoutInstances.update", post(instances::update))
        .route(
            "/trpc/workoutInstances.markComplete",
            post(instances::mark_complete),
        )
        .route("/trpc/workoutInstances.delete", post(instances::delete))
        .with_state(states.instances)
        // Stats
        .route("/trpc/stats.getOverallStats", get(stats::overall))
        .route("/trpc/stats.getRunStats", get(stats::runs))
        .route("/trpc/stats.getRepStats", get(stats::reps))
        .route("/trpc/stats.getTimeStats", get(stats::time))
        .route(
            "/trpc/stats.getRecentActivity",
            get(stats::recent_activity),
        )
        .with_state(states.stats)
        // Session lookup for the AuthUser extractor
        .layer(Extension(session_repo))
        .layer(cors_layer(frontend_url))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let frontend_url = frontend_url.trim_end_matches('/').to_string();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &axum::http::request::Parts| {
                origin.to_str().is_ok_and(|origin| origin == frontend_url)
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}
