use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::io;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use personalization_service::app::{build_state, Backends};
use personalization_service::config::Config;
use personalization_service::handlers;

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,personalization_service=debug,actix_web=info".into());

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.app.json_logs);

    tracing::info!(
        "Starting personalization-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        env = %config.app.env,
        storage = %config.storage.backend,
        refresh_mode = ?config.ranking.refresh_mode,
        "Configuration loaded"
    );

    let backends = match Backends::connect(&config).await {
        Ok(backends) => backends,
        Err(e) => {
            tracing::error!("Backend initialization failed: {:#}", e);
            eprintln!("ERROR: Failed to initialize backends: {:#}", e);
            std::process::exit(1);
        }
    };

    let (state, refresher) = build_state(backends, &config.ranking);
    if refresher.is_some() {
        tracing::info!("Feed rebuilds deferred to background refresher");
    }
    let state = web::Data::new(state);

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("HTTP server listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
