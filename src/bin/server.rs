use std::{env, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::{Parser, ValueEnum};
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack_rs::{
    AppState, EngineConfig, ProjectionConfig, RecurrencePolicy, TracingObserver, build_router,
    graceful_shutdown, logging_middleware,
};

/// How recurring transactions count towards each projected month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Every recurring transaction counts once per month.
    Flat,
    /// Recurring transactions are scaled by how often they repeat in `--period-days`.
    Interval,
}

/// The REST API server for fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The default log filter, overridden by `RUST_LOG` when set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// How many months ahead balance projections look by default.
    #[arg(long, default_value_t = 3)]
    projection_horizon: u32,

    /// How recurring transactions count towards each projected month.
    #[arg(long, value_enum, default_value_t = PolicyArg::Flat)]
    recurrence_policy: PolicyArg,

    /// The length of a projection period in days when using the interval policy.
    #[arg(long, default_value_t = 30)]
    period_days: u32,

    /// Log full request and response bodies with redacted cookies.
    #[arg(long)]
    log_bodies: bool,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let policy = match self.recurrence_policy {
            PolicyArg::Flat => RecurrencePolicy::FlatPerPeriod,
            PolicyArg::Interval => RecurrencePolicy::IntervalScaled {
                period_days: self.period_days,
            },
        };

        EngineConfig {
            projection: ProjectionConfig {
                horizon_months: self.projection_horizon,
                policy,
            },
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_level);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    let engine_config = args.engine_config();
    tracing::info!("Starting with {engine_config:?}");
    let app_state = AppState::new(conn, &secret, engine_config, Arc::new(TracingObserver))
        .expect("Could not initialize the database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let mut router = build_router(app_state);
    if args.log_bodies {
        router = router.layer(middleware::from_fn(logging_middleware));
    }
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly.");
}

fn setup_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
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
        // Errors are logged when they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
