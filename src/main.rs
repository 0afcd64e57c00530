use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::{
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use leadflow_backend::config::Config;
use leadflow_backend::responses::JsonResponse;
use leadflow_backend::routes::handle_signup;
use leadflow_backend::services::analytics::{AnalyticsSink, MixpanelConfig, MixpanelSink};
use leadflow_backend::state::AppState;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let config = Arc::new(Config::from_env());

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(config.rate_limit_ms)
            .burst_size(config.rate_limit_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .unwrap(),
    );

    // Background task to cleanup old IPs
    let governor_limiter = governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = std::time::Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            governor_limiter.retain_recent();
        }
    });

    let mut analytics_config = MixpanelConfig::new(config.analytics_token.clone());
    analytics_config.ignore_do_not_track = config.analytics_ignore_dnt;
    let analytics = Arc::new(
        MixpanelSink::new(Client::new(), analytics_config, false)
            .expect("Failed to initialize analytics client"),
    ) as Arc<dyn AnalyticsSink>;

    let state = AppState {
        analytics: analytics.clone(),
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(config.frontend_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(root))
        .route("/api/signup", any(handle_signup))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer {
            config: governor_conf.clone(),
        })
        .layer(cors);

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let listener = TcpListener::bind(config.listen_addr).await.unwrap();
    info!("Listening at http://{}", config.listen_addr);

    axum::serve(listener, make_service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // Explicit analytics teardown before exit.
    if let Err(err) = analytics.shutdown().await {
        tracing::warn!(%err, "analytics shutdown failed");
    }
}

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("Hello, Leadflow!").into_response()
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
}
