use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use log::{error, info, warn};

use rail_fare_api::{routes, AppConfig, ModelHolder};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting Indian Railways Price Prediction API v{}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{:#}", e)));
        }
    };

    let model = web::Data::new(ModelHolder::load(&config.model_path));
    if !model.is_loaded() {
        warn!("Serving in degraded mode: /predict will answer 503 until a model is deployed");
    }

    let bind_address = config.bind_address();

    info!("Server listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Endpoints:");
    info!("   GET  /            - Welcome message");
    info!("   POST /predict     - Base fare prediction");
    info!("   GET  /health      - Model load state");
    info!("   GET  /model-info  - Model type and feature order");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(model.clone())
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
