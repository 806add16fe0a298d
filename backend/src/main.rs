use backend::{build_rocket, config::Config, database::PgConnector, routes::AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("🚀 Starting voting API on port {}", config.port);

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.port));
    let state = AppState::new(config.options(), PgConnector::new(config.connect_options()));

    if let Err(e) = build_rocket(figment, state).launch().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
