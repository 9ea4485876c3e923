//! Fill the database with a demo account and six months of history.
//!
//! Wipes every table first. Sign in afterwards as `test@ralphie.fitness`
//! with password `TestPassword123!`.

use chrono::{Duration, Utc};
use rand::Rng;

use ralphie::config::Config;
use ralphie::db::{self, DbPool};
use ralphie::migrations;
use ralphie::models::{CreateInstance, CreateTemplate, CreateWorkout, WorkoutKind, WorkoutTemplate};
use ralphie::repositories::{
    InstanceRepository, TemplateRepository, UserRepository, WorkoutRepository,
};

const TEST_USER_NAME: &str = "Test User";
const TEST_USER_EMAIL: &str = "test@ralphie.fitness";
const TEST_USER_PASSWORD: &str = "TestPassword123!";

const HISTORY_DAYS: i64 = 180;
const INSTANCE_COUNT: usize = 120;
const LEGACY_WORKOUT_COUNT: usize = 30;
const RANDOM_USER_COUNT: usize = 10;

// (name, miles, description)
const RUN_TEMPLATES: &[(&str, f64, &str)] = &[
    ("5K Run", 3.1, "Standard 5 kilometer run"),
    ("10K Run", 6.2, "Standard 10 kilometer run"),
    ("Half Marathon", 13.1, "Half marathon distance"),
    ("Easy 2 Mile", 2.0, "Easy recovery run"),
    ("Sprint Mile", 1.0, "Fast mile sprint"),
];

// (name, target reps, description)
const REPS_TEMPLATES: &[(&str, i64, &str)] = &[
    ("Push-ups", 50, "Standard push-ups"),
    ("Sit-ups", 100, "Standard sit-ups"),
    ("Squats", 75, "Bodyweight squats"),
    ("Pull-ups", 20, "Dead hang pull-ups"),
    ("Burpees", 30, "Full burpees"),
    ("Lunges", 40, "Walking lunges (per leg)"),
];

// (name, target seconds, description)
const TIME_TEMPLATES: &[(&str, i64, &str)] = &[
    ("Plank", 120, "Standard plank hold"),
    ("Wall Sit", 90, "Isometric wall sit"),
    ("Side Plank (Left)", 60, "Left side plank"),
    ("Side Plank (Right)", 60, "Right side plank"),
    ("Dead Hang", 45, "Dead hang from bar"),
];

// (name, minutes, calories)
const LEGACY_WORKOUTS: &[(&str, i64, i64)] = &[
    ("Yoga Session", 45, 200),
    ("Cycling", 60, 400),
    ("Swimming", 30, 300),
    ("Weight Training", 50, 250),
    ("HIIT Cardio", 25, 350),
];

const NOTES: &[&str] = &[
    "Felt great!",
    "Struggled a bit today",
    "New personal record!",
    "Weather was perfect",
    "Need to improve form",
    "Solid workout",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Chioma", "Dmitri", "Elena", "Farah", "Goran", "Hana", "Ivan", "Jun",
];
const LAST_NAMES: &[&str] = &[
    "Okafor", "Lindqvist", "Moreau", "Tanaka", "Silva", "Novak", "Haddad", "Keller",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,ralphie=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url)?;
    migrations::run_migrations(&pool)?;

    tracing::info!("Clearing existing data");
    clear_tables(&pool)?;

    let user_repo = UserRepository::new(pool.clone());
    let template_repo = TemplateRepository::new(pool.clone());
    let instance_repo = InstanceRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

    let user = user_repo
        .create(TEST_USER_NAME, TEST_USER_EMAIL, TEST_USER_PASSWORD)
        .await?;
    mark_email_verified(&pool, &user.id)?;
    tracing::info!(user_id = %user.id, "Created test user {}", TEST_USER_EMAIL);

    let mut templates: Vec<WorkoutTemplate> = Vec::new();
    for (name, distance, description) in RUN_TEMPLATES {
        let input = template_input(&user.id, name, description, WorkoutKind::Run);
        templates.push(
            template_repo
                .create(CreateTemplate {
                    distance: Some(*distance),
                    ..input
                })
                .await?,
        );
    }
    for (name, target_reps, description) in REPS_TEMPLATES {
        let input = template_input(&user.id, name, description, WorkoutKind::Reps);
        templates.push(
            template_repo
                .create(CreateTemplate {
                    target_reps: Some(*target_reps),
                    ..input
                })
                .await?,
        );
    }
    for (name, target_duration, description) in TIME_TEMPLATES {
        let input = template_input(&user.id, name, description, WorkoutKind::Time);
        templates.push(
            template_repo
                .create(CreateTemplate {
                    target_duration: Some(*target_duration),
                    ..input
                })
                .await?,
        );
    }
    tracing::info!("Created {} workout templates", templates.len());

    let mut rng = rand::rng();
    let now = Utc::now();
    let window_secs = HISTORY_DAYS * 24 * 60 * 60;

    for _ in 0..INSTANCE_COUNT {
        let when = now - Duration::seconds(rng.random_range(0..window_secs));
        let kind = if rng.random_bool(0.33) {
            WorkoutKind::Run
        } else if rng.random_bool(0.5) {
            WorkoutKind::Reps
        } else {
            WorkoutKind::Time
        };
        let candidates: Vec<&WorkoutTemplate> =
            templates.iter().filter(|t| t.kind == kind).collect();
        let template = candidates[rng.random_range(0..candidates.len())];

        let mut input = CreateInstance {
            template_id: template.id.clone(),
            user_id: user.id.clone(),
            completed: rng.random_bool(0.85),
            completed_at: None,
            duration: None,
            lap_times: None,
            actual_reps: None,
            actual_duration: None,
            notes: None,
        };

        match kind {
            WorkoutKind::Run => {
                let miles = template.distance.unwrap_or(3.0);
                // 5 to 15 minutes per mile
                let duration = (miles * rng.random_range(300.0..900.0)).floor() as i64;
                let laps = miles.floor() as i64;
                if laps > 0 {
                    let split = duration as f64 / laps as f64;
                    input.lap_times = Some(
                        (0..laps)
                            .map(|_| (split + rng.random_range(-30.0..30.0)).floor())
                            .collect(),
                    );
                }
                input.duration = Some(duration);
            }
            WorkoutKind::Reps => {
                let target = template.target_reps.unwrap_or(50) as f64;
                input.actual_reps = Some((target * rng.random_range(0.7..1.1)).floor() as i64);
            }
            WorkoutKind::Time => {
                let target = template.target_duration.unwrap_or(60) as f64;
                input.actual_duration = Some((target * rng.random_range(0.6..1.2)).floor() as i64);
            }
        }

        if rng.random_bool(0.3) {
            input.notes = Some(NOTES[rng.random_range(0..NOTES.len())].to_string());
        }

        instance_repo.create_at(input, when).await?;
    }
    tracing::info!("Created {} workout instances", INSTANCE_COUNT);

    for _ in 0..LEGACY_WORKOUT_COUNT {
        let when = now - Duration::seconds(rng.random_range(0..window_secs));
        let (name, duration, calories) = LEGACY_WORKOUTS[rng.random_range(0..LEGACY_WORKOUTS.len())];
        let input = CreateWorkout {
            user_id: user.id.clone(),
            name: name.to_string(),
            description: Some(format!("Completed {}", name.to_lowercase())),
            duration: Some(duration),
            calories_burned: Some(calories + rng.random_range(-50..50)),
        };
        workout_repo.create_at(input, when).await?;
    }
    tracing::info!("Created {} legacy workouts", LEGACY_WORKOUT_COUNT);

    for i in 0..RANDOM_USER_COUNT {
        let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
        let email = format!(
            "{}.{}{}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            i
        );
        let password: String = (0..16)
            .map(|_| char::from(rng.random_range(b'a'..=b'z')))
            .collect();
        user_repo
            .create(&format!("{first} {last}"), &email, &password)
            .await?;
    }
    tracing::info!("Added {} random users", RANDOM_USER_COUNT);

    tracing::info!(
        "Seed complete. Sign in with {} / {}",
        TEST_USER_EMAIL,
        TEST_USER_PASSWORD
    );
    Ok(())
}

fn template_input(user_id: &str, name: &str, description: &str, kind: WorkoutKind) -> CreateTemplate {
    CreateTemplate {
        user_id: user_id.to_string(),
        name: name.to_string(),
        kind,
        description: Some(description.to_string()),
        distance: None,
        target_reps: None,
        target_duration: None,
    }
}

fn clear_tables(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;
    conn.execute_batch(
        "DELETE FROM workout_instances;
         DELETE FROM workout_templates;
         DELETE FROM workouts;
         DELETE FROM sessions;
         DELETE FROM accounts;
         DELETE FROM users;",
    )?;
    Ok(())
}

fn mark_email_verified(pool: &DbPool, user_id: &str) -> anyhow::Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE users SET email_verified = 1 WHERE id = ?",
        [user_id],
    )?;
    Ok(())
}
