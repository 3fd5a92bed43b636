use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use rail_fare_api::inference::ModelSpec;
use rail_fare_api::regressor::LinearModel;
use rail_fare_api::routes::{self, WELCOME_MESSAGE};
use rail_fare_api::{Artifact, LoadedModel, ModelHolder};

const UNLOADED: &str = "Model is not loaded. Please check the server logs.";

fn feature_order() -> Vec<String> {
    [
        "distance",
        "duration",
        "if_offering_catering",
        "if_dynamic_fare",
        "class_1A",
        "class_2A",
        "class_3A",
        "class_3E",
        "class_CC",
        "class_SL",
        "class_2S",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// fare = 50 + 0.6 * distance + 120 * catering + 500 * class_1A + 250 * class_3A
fn linear_holder() -> ModelHolder {
    let artifact = Artifact {
        feature_order: feature_order(),
        model: ModelSpec::Linear(LinearModel {
            intercept: 50.0,
            coefficients: vec![0.6, 0.0, 120.0, 0.0, 500.0, 0.0, 250.0, 0.0, 0.0, 0.0, 0.0],
        }),
    };
    let model = LoadedModel::from_artifact(artifact, std::path::Path::new(".")).unwrap();
    ModelHolder::from_model(model)
}

fn payload(class_code: &str, distance: i64, duration: i64) -> Value {
    json!({
        "class_code": class_code,
        "distance": distance,
        "duration": duration,
        "has_catering": true,
        "is_dynamic": false
    })
}

macro_rules! app {
    ($holder:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($holder))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn root_greets_when_loaded() {
    let app = app!(linear_holder());
    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "message": WELCOME_MESSAGE }));
}

#[actix_web::test]
async fn root_greets_when_unloaded() {
    let app = app!(ModelHolder::unloaded());
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], WELCOME_MESSAGE);
}

#[actix_web::test]
async fn predicts_reference_journey() {
    let app = app!(linear_holder());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("3A", 1250, 1500))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    // 50 + 750 + 120 + 250
    assert_eq!(body, json!({ "predicted_base_fare": 1170.0 }));
}

#[actix_web::test]
async fn class_without_column_is_zero_filled() {
    let app = app!(linear_holder());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("FC", 100, 90))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    // 50 + 60 + 120, no class contribution
    assert_eq!(body["predicted_base_fare"], 230.0);
}

#[actix_web::test]
async fn unloaded_model_answers_with_error_body() {
    let app = app!(ModelHolder::unloaded());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("SL", 500, 600))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": UNLOADED }));
}

#[actix_web::test]
async fn zero_distance_is_rejected() {
    let app = app!(linear_holder());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("3A", 0, 100))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("distance"));
}

#[actix_web::test]
async fn zero_duration_is_rejected_even_when_unloaded() {
    let app = app!(ModelHolder::unloaded());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("3A", 10, 0))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn distance_of_one_is_accepted() {
    let app = app!(linear_holder());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("2S", 1, 1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn distance_beyond_32_bits_is_accepted() {
    let app = app!(linear_holder());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("2S", 5_000_000_000, 4_300_000_000))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["predicted_base_fare"].as_f64().unwrap() > 1e9);
}

#[actix_web::test]
async fn malformed_payloads_are_rejected() {
    let app = app!(linear_holder());

    let bodies = [
        payload("XX", 100, 100),
        payload("3A", -4, 100),
        json!({ "class_code": "3A", "distance": 100, "has_catering": true, "is_dynamic": false }),
        json!({ "class_code": "3A", "distance": "far", "duration": 10, "has_catering": true, "is_dynamic": false }),
    ];

    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
        let error: Value = test::read_body_json(resp).await;
        assert!(error["error"].is_string());
    }
}

#[actix_web::test]
async fn health_reports_load_state() {
    let app = app!(linear_holder());
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "ok", "model_loaded": true }));

    let app = app!(ModelHolder::unloaded());
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "degraded", "model_loaded": false }));
}

#[actix_web::test]
async fn model_info_lists_feature_order() {
    let app = app!(linear_holder());
    let req = test::TestRequest::get().uri("/model-info").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["model_type"], "linear");
    assert_eq!(body["feature_order"], json!(feature_order()));
    assert_eq!(body["unmapped_classes"], json!(["FC"]));

    let app = app!(ModelHolder::unloaded());
    let req = test::TestRequest::get().uri("/model-info").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn unknown_path_is_not_found() {
    let app = app!(linear_holder());
    let req = test::TestRequest::get().uri("/api/nothing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Endpoint not found" }));
}

#[actix_web::test]
async fn missing_artifact_file_serves_degraded_mode() {
    let dir = tempfile::tempdir().unwrap();
    let holder = ModelHolder::load(dir.path().join("price_prediction_model.json"));
    let app = app!(holder);

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("1A", 1400, 1200))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], UNLOADED);
}

#[actix_web::test]
async fn artifact_on_disk_drives_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(
        &path,
        json!({
            "feature_order": ["distance", "class_1A"],
            "model": {
                "type": "tree_ensemble",
                "aggregation": "sum",
                "base_score": 100.0,
                "learning_rate": 0.5,
                "trees": [
                    {"nodes": [
                        {"feature": 1, "threshold": 0.5, "left": 1, "right": 2},
                        {"value": 200.0},
                        {"value": 2000.0}
                    ]},
                    {"nodes": [
                        {"feature": 0, "threshold": 1000.0, "left": 1, "right": 2},
                        {"value": 0.0},
                        {"value": 333.34}
                    ]}
                ]
            }
        })
        .to_string(),
    )
    .unwrap();

    let app = app!(ModelHolder::load(&path));
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(payload("1A", 1400, 1200))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    // 100 + 0.5 * (2000 + 333.34)
    assert_eq!(body["predicted_base_fare"], 1266.67);
}
