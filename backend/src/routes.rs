use std::time::Instant;

use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};

use crate::error::{json_error_handler, ApiError};
use crate::inference::ModelHolder;
use crate::models::{HealthStatus, PredictionOut, TrainInput, WelcomeMessage};

pub const WELCOME_MESSAGE: &str = "Welcome to the Indian Railways Price Prediction API!";

const JSON_LIMIT: usize = 64 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(json_error_handler),
    )
    .route("/", web::get().to(welcome))
    .route("/predict", web::post().to(predict_fare))
    .route("/health", web::get().to(health_check))
    .route("/model-info", web::get().to(model_info))
    .default_service(web::route().to(not_found));
}

async fn welcome() -> impl Responder {
    HttpResponse::Ok().json(WelcomeMessage {
        message: WELCOME_MESSAGE.to_string(),
    })
}

async fn predict_fare(
    model: web::Data<ModelHolder>,
    req: web::Json<TrainInput>,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let input = req.into_inner();

    if let Err(e) = input.validate() {
        warn!("Validation failed: {}", e);
        return Err(ApiError::Validation(e));
    }

    if !model.is_loaded() {
        warn!("Prediction requested while the model is not loaded");
        return Err(ApiError::ModelUnloaded);
    }

    let class_code = input.class_code;
    let model_clone = model.clone();

    let fare = match web::block(move || model_clone.predict(&input)).await {
        Ok(result) => result.map_err(|e| {
            error!("Prediction error: {}", e);
            e
        })?,
        Err(e) => {
            error!("Blocking prediction task failed: {}", e);
            return Err(ApiError::Prediction("prediction task was cancelled".to_string()));
        }
    };

    info!(
        "Predicted base fare {:.2} for class {} in {} µs",
        fare,
        class_code.as_str(),
        start_time.elapsed().as_micros()
    );

    Ok(HttpResponse::Ok().json(PredictionOut {
        predicted_base_fare: fare,
    }))
}

async fn health_check(model: web::Data<ModelHolder>) -> impl Responder {
    HttpResponse::Ok().json(HealthStatus::new(model.is_loaded()))
}

async fn model_info(model: web::Data<ModelHolder>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(model.info()?))
}

async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}
