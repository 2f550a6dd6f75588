use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{info, warn};

use roster_api::{build_router, AppState, Backends};
use roster_core::ports::Mailer;
use roster_infrastructure::{HttpSheetFetcher, JsonFileStore, LogMailer, SmtpMailer};
use roster_shared::config::AppConfig;
use roster_shared::telemetry::init_telemetry;

/// CSV uploads are the largest bodies.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
const SHEET_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let _log_guard = init_telemetry(&config.logging)?;
    info!("{} starting ({})", config.app.name, config.app.env);

    if config.is_production() && config.session.secret == "dev_secret" {
        anyhow::bail!("session.secret must be set in production");
    }

    let store = Arc::new(JsonFileStore::open(&config.storage.data_dir).await?);

    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        Arc::new(SmtpMailer::from_settings(&config.mail)?)
    } else {
        warn!("Mail delivery disabled; password links are only returned to the admin");
        Arc::new(LogMailer)
    };

    let backends = Backends {
        tenants: store.clone(),
        developers: store.clone(),
        workspace: store,
        fetcher: Arc::new(HttpSheetFetcher::new(SHEET_FETCH_TIMEOUT)),
        mailer,
    };
    let state = AppState::new(config.clone(), backends)?;

    if let Some(bootstrap) = &config.bootstrap {
        let created = state
            .auth
            .bootstrap_developer(&bootstrap.username, &bootstrap.password, &bootstrap.full_name)
            .await?;
        if created {
            info!("Bootstrap developer account created: {}", bootstrap.username);
        }
    }

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(false)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(Duration::from_secs(config.app.request_timeout_seconds)));

    let mut app = build_router(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware);
    if let Some(cors) = cors_layer(&config.security.allowed_origins) {
        app = app.layer(cors);
    }

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Cookies need explicit origins; with none configured only same-origin
/// browsers can call the API.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", o);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
