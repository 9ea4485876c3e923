#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ralphie::db::{create_memory_pool, DbPool};
use ralphie::handlers::{auth, instances, stats, templates, workouts};
use ralphie::migrations::run_migrations_for_tests;
use ralphie::models::{
    CreateInstance, CreateTemplate, User, WorkoutInstance, WorkoutKind, WorkoutTemplate,
};
use ralphie::repositories::{
    InstanceRepository, SessionRepository, StatsRepository, TemplateRepository, UserRepository,
    WorkoutRepository,
};
use ralphie::routes::{create_router, AppStates};

pub const FRONTEND_URL: &str = "http://localhost:5173";

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    let template_repo = TemplateRepository::new(pool.clone());
    let session_repo = SessionRepository::new(pool.clone());

    let states = AppStates {
        auth: auth::AuthState {
            user_repo: UserRepository::new(pool.clone()),
            session_repo: session_repo.clone(),
            secure_cookies: false,
        },
        workouts: workouts::WorkoutsState {
            workout_repo: WorkoutRepository::new(pool.clone()),
        },
        templates: templates::TemplatesState {
            template_repo: template_repo.clone(),
        },
        instances: instances::InstancesState {
            instance_repo: InstanceRepository::new(pool.clone()),
            template_repo,
        },
        stats: stats::StatsState {
            stats_repo: StatsRepository::new(pool.clone()),
        },
    };

    create_router(states, session_repo, FRONTEND_URL)
}

pub async fn create_test_user(pool: &DbPool, name: &str, email: &str) -> User {
    let user_repo = UserRepository::new(pool.clone());
    user_repo.create(name, email, "password123").await.unwrap()
}

pub async fn create_session_cookie(pool: &DbPool, user: &User) -> String {
    let session_repo = SessionRepository::new(pool.clone());
    let session = session_repo.create(&user.id, None, None).await.unwrap();
    format!("session={}", session.token)
}

/// A signed-in user and the cookie header that authenticates them.
pub async fn signed_in_user(pool: &DbPool, email: &str) -> (User, String) {
    let user = create_test_user(pool, "Test User", email).await;
    let cookie = create_session_cookie(pool, &user).await;
    (user, cookie)
}

pub fn extract_cookie_header(set_cookie: &str) -> String {
    // Extract just the cookie name=value part for use in Cookie header
    set_cookie.split(';').next().unwrap_or("").to_string()
}

/// `GET /trpc/<procedure>` with the input URL-encoded into `?input=`.
pub fn query(procedure: &str, input: &Value, cookie: Option<&str>) -> Request<Body> {
    let uri = format!(
        "/trpc/{}?input={}",
        procedure,
        urlencoding::encode(&input.to_string())
    );
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `POST /trpc/<procedure>` with a JSON body.
pub fn mutation(procedure: &str, input: &Value, cookie: Option<&str>) -> Request<Body> {
    post_json(&format!("/trpc/{procedure}"), input, cookie)
}

pub fn post_json(uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// The `result.data` payload of a successful procedure call.
pub async fn call(app: Router, request: Request<Body>) -> Value {
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    body["result"]["data"].clone()
}

// Test data creation helpers
pub async fn create_test_template(
    pool: &DbPool,
    user_id: &str,
    name: &str,
    kind: WorkoutKind,
    goal: f64,
) -> WorkoutTemplate {
    let template_repo = TemplateRepository::new(pool.clone());
    let mut input = CreateTemplate {
        user_id: user_id.to_string(),
        name: name.to_string(),
        kind,
        description: None,
        distance: None,
        target_reps: None,
        target_duration: None,
    };
    match kind {
        WorkoutKind::Run => input.distance = Some(goal),
        WorkoutKind::Reps => input.target_reps = Some(goal as i64),
        WorkoutKind::Time => input.target_duration = Some(goal as i64),
    }
    template_repo.create(input).await.unwrap()
}

pub fn instance_input(template: &WorkoutTemplate, completed: bool) -> CreateInstance {
    CreateInstance {
        template_id: template.id.clone(),
        user_id: template.user_id.clone(),
        completed,
        completed_at: None,
        duration: None,
        lap_times: None,
        actual_reps: None,
        actual_duration: None,
        notes: None,
    }
}

pub async fn create_test_instance(pool: &DbPool, input: CreateInstance) -> WorkoutInstance {
    let instance_repo = InstanceRepository::new(pool.clone());
    instance_repo.create(input).await.unwrap()
}
