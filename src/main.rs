//! vcs-autopilot server entry point.
//!
//! Wires the git and database adapters, starts the backup scheduler, and
//! serves the REST endpoints.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vcs_autopilot::api;
use vcs_autopilot::app_state::AppState;
use vcs_autopilot::config::{AutopilotConfig, LogFormat};
use vcs_autopilot::database::{DatabaseBackup, PgDumpBackup};
use vcs_autopilot::deadline::{TimeoutDatabaseBackup, TimeoutVersionControl};
use vcs_autopilot::domain::{ActivityLog, CycleLocks};
use vcs_autopilot::persistence::{
    InMemoryRecordStore, PostgresRecordStore, RecordStore, spawn_activity_writer,
};
use vcs_autopilot::scheduler::{BackupScheduler, default_table};
use vcs_autopilot::service::{BackupSequencer, ConfigGate, SyncSequencer};
use vcs_autopilot::vcs::{GitCli, VersionControl};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = AutopilotConfig::from_env()?;
    init_tracing(config.log_format);
    tracing::info!(
        addr = %config.listen_addr,
        repo = %config.repo_path.display(),
        "starting vcs-autopilot"
    );

    // Collaborators
    let budget = config.collaborator_timeout();
    let git: Arc<dyn VersionControl> = Arc::new(GitCli::new(
        &config.git_binary,
        &config.repo_path,
        &config.remote_name,
    ));
    let dump: Arc<dyn DatabaseBackup> = Arc::new(PgDumpBackup::new(
        &config.pg_dump_binary,
        &config.database_url,
        &config.db_dump_dir,
        Arc::clone(&git),
    ));
    let vcs: Arc<dyn VersionControl> = Arc::new(TimeoutVersionControl::new(git, budget));
    let db: Arc<dyn DatabaseBackup> = Arc::new(TimeoutDatabaseBackup::new(dump, budget));

    // Record store
    let records: Arc<dyn RecordStore> = if config.persistence_enabled {
        let store = PostgresRecordStore::connect(&config).await?;
        store.migrate().await?;
        tracing::info!("record store connected");
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, records are kept in memory");
        Arc::new(InMemoryRecordStore::with_activity_capacity(
            config.activity_log_capacity,
        ))
    };

    let activity = ActivityLog::new(config.activity_log_capacity);
    spawn_activity_writer(&activity, Arc::clone(&records));

    // Service layer
    let locks = Arc::new(CycleLocks::new());
    let gate = ConfigGate::new(Arc::clone(&vcs), &config.config_namespace);
    let backup = Arc::new(BackupSequencer::new(
        Arc::clone(&vcs),
        Arc::clone(&db),
        Arc::clone(&records),
        gate.clone(),
        activity.clone(),
        Arc::clone(&locks),
    ));
    let sync = Arc::new(SyncSequencer::new(
        vcs,
        db,
        gate.clone(),
        activity,
        locks,
    ));

    let schedules = Arc::new(default_table());
    if config.scheduler_enabled {
        BackupScheduler::new(
            Arc::clone(&backup),
            gate,
            schedules.as_ref().clone(),
            config.scheduler_tick(),
        )
        .spawn();
    }

    // Build application state
    let app_state = AppState {
        backup,
        sync,
        records,
        schedules,
    };

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
