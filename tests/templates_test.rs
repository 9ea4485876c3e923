mod common;

use axum::http::StatusCode;
use ralphie::models::WorkoutKind;
use serde_json::json;

#[tokio::test]
async fn test_create_run_template_round_trip() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let app = common::create_test_app(pool);

    let created = common::call(
        app.clone(),
        common::mutation(
            "workoutTemplates.create",
            &json!({"userId": user.id, "name": "5K", "type": "run", "distance": 3.1}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(created["type"], "run");

    let fetched = common::call(
        app,
        common::query(
            "workoutTemplates.getById",
            &json!({"id": created["id"], "userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(fetched["name"], "5K");
    assert_eq!(fetched["distance"], 3.1);
    assert!(fetched["targetReps"].is_null());
    assert!(fetched["targetDuration"].is_null());
}

#[tokio::test]
async fn test_create_rejects_mismatched_goal() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let app = common::create_test_app(pool);

    let (status, body) = common::send(
        app,
        common::mutation(
            "workoutTemplates.create",
            &json!({
                "userId": user.id,
                "name": "Push-ups",
                "type": "reps",
                "targetReps": 50,
                "distance": 2.0
            }),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_rejects_missing_goal_and_blank_name() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let app = common::create_test_app(pool);

    let (status, _) = common::send(
        app.clone(),
        common::mutation(
            "workoutTemplates.create",
            &json!({"userId": user.id, "name": "Plank", "type": "time"}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(
        app,
        common::mutation(
            "workoutTemplates.create",
            &json!({"userId": user.id, "name": "   ", "type": "time", "targetDuration": 60}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_unknown_kind() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let app = common::create_test_app(pool);

    let (status, _) = common::send(
        app,
        common::mutation(
            "workoutTemplates.create",
            &json!({"userId": user.id, "name": "Swim", "type": "swim"}),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_all_returns_only_own_templates() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let other = common::create_test_user(&pool, "Other", "u2@example.com").await;
    common::create_test_template(&pool, &user.id, "Plank", WorkoutKind::Time, 60.0).await;
    common::create_test_template(&pool, &user.id, "5K", WorkoutKind::Run, 3.1).await;
    common::create_test_template(&pool, &other.id, "Squats", WorkoutKind::Reps, 75.0).await;
    let app = common::create_test_app(pool);

    let data = common::call(
        app,
        common::query(
            "workoutTemplates.getAll",
            &json!({"userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;

    let names: Vec<&str> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Plank"));
    assert!(names.contains(&"5K"));
}

#[tokio::test]
async fn test_get_all_empty_is_array() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let app = common::create_test_app(pool);

    let data = common::call(
        app,
        common::query(
            "workoutTemplates.getAll",
            &json!({"userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(data, json!([]));
}

#[tokio::test]
async fn test_get_by_id_of_other_user_is_null() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let other = common::create_test_user(&pool, "Other", "u2@example.com").await;
    let theirs =
        common::create_test_template(&pool, &other.id, "Squats", WorkoutKind::Reps, 75.0).await;
    let app = common::create_test_app(pool);

    let data = common::call(
        app,
        common::query(
            "workoutTemplates.getById",
            &json!({"id": theirs.id, "userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;

    assert!(data.is_null());
}

#[tokio::test]
async fn test_update_changes_only_supplied_fields() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let template =
        common::create_test_template(&pool, &user.id, "Push-ups", WorkoutKind::Reps, 50.0).await;
    let app = common::create_test_app(pool);

    let updated = common::call(
        app,
        common::mutation(
            "workoutTemplates.update",
            &json!({"id": template.id, "userId": user.id, "targetReps": 60, "description": "Chest"}),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(updated["name"], "Push-ups");
    assert_eq!(updated["targetReps"], 60);
    assert_eq!(updated["description"], "Chest");
    assert_eq!(updated["type"], "reps");
}

#[tokio::test]
async fn test_update_can_clear_description() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let template =
        common::create_test_template(&pool, &user.id, "Plank", WorkoutKind::Time, 60.0).await;
    let app = common::create_test_app(pool);

    common::call(
        app.clone(),
        common::mutation(
            "workoutTemplates.update",
            &json!({"id": template.id, "userId": user.id, "description": "Core"}),
            Some(&cookie),
        ),
    )
    .await;
    let cleared = common::call(
        app,
        common::mutation(
            "workoutTemplates.update",
            &json!({"id": template.id, "userId": user.id, "description": null}),
            Some(&cookie),
        ),
    )
    .await;

    assert!(cleared["description"].is_null());
    assert_eq!(cleared["targetDuration"], 60);
}

#[tokio::test]
async fn test_update_rejects_goal_of_other_kind() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let template =
        common::create_test_template(&pool, &user.id, "5K", WorkoutKind::Run, 3.1).await;
    let app = common::create_test_app(pool);

    let (status, _) = common::send(
        app,
        common::mutation(
            "workoutTemplates.update",
            &json!({"id": template.id, "userId": user.id, "targetReps": 10}),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_rejects_kind_change() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let template =
        common::create_test_template(&pool, &user.id, "5K", WorkoutKind::Run, 3.1).await;
    let app = common::create_test_app(pool);

    let (status, body) = common::send(
        app.clone(),
        common::mutation(
            "workoutTemplates.update",
            &json!({"id": template.id, "userId": user.id, "type": "reps", "targetReps": 20}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let stored = common::call(
        app,
        common::query(
            "workoutTemplates.getById",
            &json!({"id": template.id, "userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(stored["type"], "run");
}

#[tokio::test]
async fn test_update_missing_template_is_null() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let app = common::create_test_app(pool);

    let data = common::call(
        app,
        common::mutation(
            "workoutTemplates.update",
            &json!({"id": "missing", "userId": user.id, "name": "New"}),
            Some(&cookie),
        ),
    )
    .await;

    assert!(data.is_null());
}

#[tokio::test]
async fn test_delete_cascades_to_instances() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let template =
        common::create_test_template(&pool, &user.id, "5K", WorkoutKind::Run, 3.1).await;
    common::create_test_instance(&pool, common::instance_input(&template, true)).await;
    common::create_test_instance(&pool, common::instance_input(&template, false)).await;
    let app = common::create_test_app(pool);

    let before = common::call(
        app.clone(),
        common::query(
            "workoutInstances.getByTemplate",
            &json!({"templateId": template.id, "userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(before.as_array().unwrap().len(), 2);

    let deleted = common::call(
        app.clone(),
        common::mutation(
            "workoutTemplates.delete",
            &json!({"id": template.id, "userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(deleted, json!({"success": true}));

    let after = common::call(
        app,
        common::query(
            "workoutInstances.getByTemplate",
            &json!({"templateId": template.id, "userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(after, json!([]));
}

#[tokio::test]
async fn test_delete_other_users_template_leaves_it() {
    let pool = common::setup_test_db();
    let (user, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let other = common::create_test_user(&pool, "Other", "u2@example.com").await;
    let theirs =
        common::create_test_template(&pool, &other.id, "Squats", WorkoutKind::Reps, 75.0).await;
    let app = common::create_test_app(pool.clone());

    let data = common::call(
        app,
        common::mutation(
            "workoutTemplates.delete",
            &json!({"id": theirs.id, "userId": user.id}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(data["success"], true);

    let repo = ralphie::repositories::TemplateRepository::new(pool);
    assert!(repo.find_by_id(&theirs.id, &other.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_mismatched_user_id_is_forbidden() {
    let pool = common::setup_test_db();
    let (_, cookie) = common::signed_in_user(&pool, "u1@example.com").await;
    let other = common::create_test_user(&pool, "Other", "u2@example.com").await;
    let app = common::create_test_app(pool);

    let (status, body) = common::send(
        app,
        common::query(
            "workoutTemplates.getAll",
            &json!({"userId": other.id}),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_requires_authentication() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "Test", "u1@example.com").await;
    let app = common::create_test_app(pool);

    let (status, body) = common::send(
        app,
        common::query("workoutTemplates.getAll", &json!({"userId": user.id}), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}
