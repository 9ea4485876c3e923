mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use ralphie::models::WorkoutKind;
use serde_json::json;

#[tokio::test]
async fn test_stats_requires_auth() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "Test", "u1@example.com").await;
    let app = common::create_test_app(pool);

    let (status, _) = common::send(
        app,
        common::query("stats.getOverallStats", &json!({"userId": user.id}), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stats_for_other_user_is_forbidden() {
    let pool = common::setup_test_db();
    let (_, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let other = common::create_test_user(&pool, "Other", "u2@example.com").await;
    let app = common::create_test_app(pool);

    let (status, _) = common::send(
        app,
        common::query(
            "stats.getRunStats",
            &json!({"userId": other.id}),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_overall_counts_completed_only() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let other = common::create_test_user(&pool, "Other", "u2@example.com").await;
    let mine = common::create_test_template(&pool, &user.id, "5K", WorkoutKind::Run, 3.1).await;
    let theirs =
        common::create_test_template(&pool, &other.id, "5K", WorkoutKind::Run, 3.1).await;
    common::create_test_instance(&pool, common::instance_input(&mine, true)).await;
    common::create_test_instance(&pool, common::instance_input(&mine, true)).await;
    common::create_test_instance(&pool, common::instance_input(&mine, false)).await;
    common::create_test_instance(&pool, common::instance_input(&theirs, true)).await;
    let app = common::create_test_app(pool);

    let data = common::call(
        app,
        common::query(
            "stats.getOverallStats",
            &json!({"userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(data, json!({"totalCompletedWorkouts": 2}));
}

#[tokio::test]
async fn test_single_5k_run_stats() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let app = common::create_test_app(pool);

    let template = common::call(
        app.clone(),
        common::mutation(
            "workoutTemplates.create",
            &json!({"userId": user.id, "name": "5K", "type": "run", "distance": 3.1}),
            Some(&cookie),
        ),
    )
    .await;
    common::call(
        app.clone(),
        common::mutation(
            "workoutInstances.create",
            &json!({
                "templateId": template["id"],
                "userId": user.id,
                "completed": true,
                "duration": 1800
            }),
            Some(&cookie),
        ),
    )
    .await;

    let stats = common::call(
        app,
        common::query("stats.getRunStats", &json!({"userId": user.id}), Some(&cookie)),
    )
    .await;

    assert_eq!(stats["totalRuns"], 1);
    assert_eq!(stats["totalMiles"], 3.1);
    assert_eq!(stats["avgDuration"], 1800.0);
    assert_eq!(stats["chartData"].as_array().unwrap().len(), 1);
    assert_eq!(stats["chartData"][0]["duration"], 1800);
    assert_eq!(stats["chartData"][0]["distance"], 3.1);
}

#[tokio::test]
async fn test_run_stats_without_runs_are_zero() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let app = common::create_test_app(pool);

    let stats = common::call(
        app,
        common::query("stats.getRunStats", &json!({"userId": user.id}), Some(&cookie)),
    )
    .await;

    assert_eq!(stats["totalRuns"], 0);
    assert_eq!(stats["totalMiles"], 0.0);
    assert_eq!(stats["avgDuration"], 0.0);
    assert_eq!(stats["chartData"], json!([]));
}

#[tokio::test]
async fn test_run_average_skips_missing_durations() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let template =
        common::create_test_template(&pool, &user.id, "2 Mile", WorkoutKind::Run, 2.0).await;
    let mut timed = common::instance_input(&template, true);
    timed.duration = Some(1000);
    common::create_test_instance(&pool, timed).await;
    common::create_test_instance(&pool, common::instance_input(&template, true)).await;
    let app = common::create_test_app(pool);

    let stats = common::call(
        app,
        common::query("stats.getRunStats", &json!({"userId": user.id}), Some(&cookie)),
    )
    .await;

    assert_eq!(stats["totalRuns"], 2);
    assert_eq!(stats["totalMiles"], 4.0);
    assert_eq!(stats["avgDuration"], 1000.0);
}

#[tokio::test]
async fn test_chart_is_last_30_oldest_first() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let template =
        common::create_test_template(&pool, &user.id, "Push-ups", WorkoutKind::Reps, 50.0).await;
    let start = Utc::now() - Duration::days(40);
    for day in 0..35 {
        let mut input = common::instance_input(&template, true);
        input.completed_at = Some(start + Duration::days(day));
        input.actual_reps = Some(day + 1);
        common::create_test_instance(&pool, input).await;
    }
    let app = common::create_test_app(pool);

    let stats = common::call(
        app,
        common::query("stats.getRepStats", &json!({"userId": user.id}), Some(&cookie)),
    )
    .await;

    assert_eq!(stats["totalWorkouts"], 35);
    // 1 + 2 + ... + 35
    assert_eq!(stats["totalReps"], 630);
    let avg = stats["avgReps"].as_f64().unwrap();
    assert!((avg * 35.0 - 630.0).abs() < 1e-9);

    let chart = stats["chartData"].as_array().unwrap();
    assert_eq!(chart.len(), 30);
    // The five oldest fall off; the window starts at day 5
    assert_eq!(chart[0]["reps"], 6);
    assert_eq!(chart[29]["reps"], 35);
    assert_eq!(chart[0]["target"], 50);
}

#[tokio::test]
async fn test_rep_stats_filter_by_template() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let push =
        common::create_test_template(&pool, &user.id, "Push-ups", WorkoutKind::Reps, 50.0).await;
    let squats =
        common::create_test_template(&pool, &user.id, "Squats", WorkoutKind::Reps, 75.0).await;
    let mut input = common::instance_input(&push, true);
    input.actual_reps = Some(40);
    common::create_test_instance(&pool, input).await;
    let mut input = common::instance_input(&squats, true);
    input.actual_reps = Some(70);
    common::create_test_instance(&pool, input).await;
    // Completed without a count contributes zero reps
    common::create_test_instance(&pool, common::instance_input(&squats, true)).await;
    let app = common::create_test_app(pool);

    let all = common::call(
        app.clone(),
        common::query("stats.getRepStats", &json!({"userId": user.id}), Some(&cookie)),
    )
    .await;
    assert_eq!(all["totalReps"], 110);
    assert_eq!(all["totalWorkouts"], 3);

    let filtered = common::call(
        app,
        common::query(
            "stats.getRepStats",
            &json!({"userId": user.id, "templateId": squats.id}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(filtered["totalReps"], 70);
    assert_eq!(filtered["totalWorkouts"], 2);
    assert_eq!(filtered["avgReps"], 35.0);
}

#[tokio::test]
async fn test_blank_template_filter_matches_all() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let push =
        common::create_test_template(&pool, &user.id, "Push-ups", WorkoutKind::Reps, 50.0).await;
    let plank =
        common::create_test_template(&pool, &user.id, "Plank", WorkoutKind::Time, 60.0).await;
    let mut input = common::instance_input(&push, true);
    input.actual_reps = Some(40);
    common::create_test_instance(&pool, input).await;
    let mut input = common::instance_input(&plank, true);
    input.actual_duration = Some(55);
    common::create_test_instance(&pool, input).await;
    let app = common::create_test_app(pool);

    let reps = common::call(
        app.clone(),
        common::query(
            "stats.getRepStats",
            &json!({"userId": user.id, "templateId": ""}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(reps["totalWorkouts"], 1);
    assert_eq!(reps["totalReps"], 40);

    let time = common::call(
        app,
        common::query(
            "stats.getTimeStats",
            &json!({"userId": user.id, "templateId": "  "}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(time["totalWorkouts"], 1);
}

#[tokio::test]
async fn test_time_stats() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let plank =
        common::create_test_template(&pool, &user.id, "Plank", WorkoutKind::Time, 120.0).await;
    let mut input = common::instance_input(&plank, true);
    input.actual_duration = Some(90);
    common::create_test_instance(&pool, input).await;
    let mut input = common::instance_input(&plank, true);
    input.actual_duration = Some(150);
    common::create_test_instance(&pool, input).await;
    // Not completed, ignored
    let mut input = common::instance_input(&plank, false);
    input.actual_duration = Some(500);
    common::create_test_instance(&pool, input).await;
    let app = common::create_test_app(pool);

    let stats = common::call(
        app,
        common::query("stats.getTimeStats", &json!({"userId": user.id}), Some(&cookie)),
    )
    .await;

    assert_eq!(stats["totalDuration"], 240);
    assert_eq!(stats["totalWorkouts"], 2);
    assert_eq!(stats["avgDuration"], 120.0);
    assert_eq!(stats["chartData"][0]["duration"], 90);
    assert_eq!(stats["chartData"][1]["target"], 120);
}

#[tokio::test]
async fn test_recent_activity() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let run = common::create_test_template(&pool, &user.id, "5K", WorkoutKind::Run, 3.1).await;
    let plank =
        common::create_test_template(&pool, &user.id, "Plank", WorkoutKind::Time, 60.0).await;
    common::create_test_instance(&pool, common::instance_input(&run, true)).await;
    let latest = common::create_test_instance(&pool, common::instance_input(&plank, false)).await;
    let app = common::create_test_app(pool);

    let data = common::call(
        app.clone(),
        common::query(
            "stats.getRecentActivity",
            &json!({"userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;
    let rows = data.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["instanceId"], latest.id);
    assert_eq!(rows[0]["templateName"], "Plank");
    assert_eq!(rows[0]["workoutType"], "time");
    assert_eq!(rows[1]["workoutType"], "run");

    let limited = common::call(
        app,
        common::query(
            "stats.getRecentActivity",
            &json!({"userId": user.id, "limit": 1}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
}
