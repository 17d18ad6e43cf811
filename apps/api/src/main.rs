use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use schedule_cell::services::{
    FacilityProvider, InMemoryScheduleStore, ScheduleRepository, SchedulingService,
    SupabaseScheduleStore,
};
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic scheduling API server");

    let config = AppConfig::from_env();

    // Pick the schedule store
    let (repository, facilities): (Arc<dyn ScheduleRepository>, Arc<dyn FacilityProvider>) =
        if config.is_configured() {
            info!("Using Supabase schedule store at {}", config.supabase_url);
            let store = Arc::new(SupabaseScheduleStore::new(&config));
            (store.clone() as Arc<dyn ScheduleRepository>, store as Arc<dyn FacilityProvider>)
        } else {
            info!("Using in-memory schedule store");
            let store = Arc::new(InMemoryScheduleStore::new());
            (store.clone() as Arc<dyn ScheduleRepository>, store as Arc<dyn FacilityProvider>)
        };

    let service = Arc::new(SchedulingService::new(
        repository,
        facilities,
        config.scheduling.clone(),
    ));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(service)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
