use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ralphie::config::Config;
use ralphie::handlers::{auth, instances, stats, templates, workouts};
use ralphie::repositories::{
    InstanceRepository, SessionRepository, StatsRepository, TemplateRepository, UserRepository,
    WorkoutRepository,
};
use ralphie::routes::{self, AppStates};
use ralphie::version::GIT_VERSION;
use ralphie::{db, migrations};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ralphie=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!(version = GIT_VERSION, "Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;
    migrations::run_migrations(&pool)?;

    // Create repositories
    let user_repo = UserRepository::new(pool.clone());
    let session_repo = SessionRepository::new(pool.clone());
    let template_repo = TemplateRepository::new(pool.clone());
    let instance_repo = InstanceRepository::new(pool.clone());
    let stats_repo = StatsRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

    spawn_session_cleanup(session_repo.clone());

    let states = AppStates {
        auth: auth::AuthState {
            user_repo,
            session_repo: session_repo.clone(),
            secure_cookies: config.secure_cookies,
        },
        workouts: workouts::WorkoutsState { workout_repo },
        templates: templates::TemplatesState {
            template_repo: template_repo.clone(),
        },
        instances: instances::InstancesState {
            instance_repo,
            template_repo,
        },
        stats: stats::StatsState { stats_repo },
    };

    let app = routes::create_router(states, session_repo, &config.frontend_url);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn spawn_session_cleanup(session_repo: SessionRepository) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match session_repo.cleanup_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Removed expired sessions"),
                Err(e) => tracing::error!("Session cleanup failed: {}", e),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
