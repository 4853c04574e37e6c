use std::{
    fs::{self, OpenOptions},
    net::SocketAddr,
    path::Path,
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use cheque_tracker::{
    AppState, Config, build_router, count_users, graceful_shutdown, logging_middleware,
    spawn_backup_scheduler, spawn_notification_scheduler,
};

#[tokio::main]
async fn main() {
    let config = Config::parse();
    setup_logging();

    if let Err(error) = config.validate() {
        tracing::error!("invalid configuration: {error}");
        exit(1);
    }

    for dir in [&config.workbook_dir, &config.upload_dir] {
        create_dir(dir);
    }
    if let Some(parent) = config.db_path.parent() {
        create_dir(parent);
    }

    let connection = Connection::open(&config.db_path).unwrap_or_else(|error| {
        tracing::error!(
            "could not open the database at {}: {error}",
            config.db_path.display()
        );
        exit(1);
    });
    let state = AppState::new(connection, &config).unwrap_or_else(|error| {
        tracing::error!("could not initialize the database: {error}");
        exit(1);
    });

    match state.db_connection.lock().map(|connection| count_users(&connection)) {
        Ok(Ok(0)) => tracing::warn!(
            "there are no users yet, add one with `cargo run --bin create_user -- --db-path {}`",
            config.db_path.display()
        ),
        Ok(Err(error)) => tracing::error!("could not count users: {error}"),
        Err(error) => tracing::error!("could not acquire database lock: {error}"),
        Ok(Ok(_)) => {}
    }

    if config.notifications_enabled {
        spawn_notification_scheduler(
            state.db_connection.clone(),
            config.timezone.clone(),
            config.due_soon_days,
            config.notification_interval_hours,
        );
        tracing::info!(
            "notification checks run every {} hour(s)",
            config.notification_interval_hours
        );
    }

    if config.backups_enabled() {
        spawn_backup_scheduler(
            state.db_connection.clone(),
            config.backup_dir.clone(),
            config.timezone.clone(),
            config.backup_interval_hours,
            config.backup_retention,
        );
        tracing::info!(
            "database backups run every {} hour(s) into {}",
            config.backup_interval_hours,
            config.backup_dir.display()
        );
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("server error: {error}");
        exit(1);
    }
}

fn create_dir(dir: &Path) {
    if dir.as_os_str().is_empty() {
        return;
    }

    if let Err(error) = fs::create_dir_all(dir) {
        tracing::error!("could not create {}: {error}", dir.display());
        exit(1);
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
