// bazaar_server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use bazaar_server::{configure_app_routes, storage, AppConfig, AppState};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting marketplace server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  let repos = match storage::connect(&app_config).await {
    Ok(repos) => repos,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise storage.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  let app_state = AppState::new(app_config.clone(), repos);
  tracing::info!("Access pipelines registered.");

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
