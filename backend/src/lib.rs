//! Indian Railways base fare prediction API.
//!
//! One trained regressor, loaded once at startup, behind a small actix-web
//! surface: `GET /`, `POST /predict`, `GET /health` and `GET /model-info`.

pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod models;
pub mod onnx;
pub mod regressor;
pub mod routes;

pub use config::AppConfig;
pub use error::ApiError;
pub use features::{FeatureLayout, FeatureVector};
pub use inference::{load_artifact, Artifact, ArtifactError, LoadedModel, ModelHolder, ModelSpec};
pub use models::{ClassCode, PredictionOut, TrainInput};
