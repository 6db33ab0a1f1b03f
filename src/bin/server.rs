use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    process::ExitCode,
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

use g_audit::{
    AppState, DashboardConfig, build_router, graceful_shutdown, logging_middleware,
    seed_mock_data,
};

/// The web server for G-Audit.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database, uses an in-memory database if not set.
    #[arg(long)]
    db_path: Option<String>,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Asia/Manila".
    #[arg(long, default_value = "Asia/Manila")]
    timezone: String,

    /// The currency symbol shown in front of amounts.
    #[arg(long, default_value = "₱")]
    currency: String,

    /// The starting wallet balance shown on the employee dashboard.
    #[arg(long, default_value_t = 10_000.0)]
    employee_starting_balance: f64,

    /// The starting wallet balance shown on the owner dashboard.
    #[arg(long, default_value_t = 50_000.0)]
    owner_starting_balance: f64,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        tracing::error!(
            "\"{}\" is not a valid canonical timezone name, e.g. \"Asia/Manila\"",
            args.timezone
        );
        return ExitCode::FAILURE;
    }

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        return ExitCode::FAILURE;
    };

    let connection = match &args.db_path {
        Some(db_path) => Connection::open(db_path),
        None => Connection::open_in_memory(),
    };
    let connection = match connection {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open the database: {error}");
            return ExitCode::FAILURE;
        }
    };

    let dashboard_config = DashboardConfig {
        currency_symbol: args.currency,
        employee_starting_balance: args.employee_starting_balance,
        owner_starting_balance: args.owner_starting_balance,
    };

    let state = match AppState::new(connection, &secret, &args.timezone, dashboard_config) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            return ExitCode::FAILURE;
        }
    };

    let seed_result = match state.db_connection.lock() {
        Ok(connection) => seed_mock_data(&connection),
        Err(error) => {
            tracing::error!("Could not acquire the database lock: {error}");
            return ExitCode::FAILURE;
        }
    };

    match seed_result {
        Ok(true) => tracing::info!("Seeded the database with mock employees and transactions"),
        Ok(false) => tracing::debug!("Database already has data, skipped seeding"),
        Err(error) => {
            tracing::error!("Could not seed the database: {error}");
            return ExitCode::FAILURE;
        }
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
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
