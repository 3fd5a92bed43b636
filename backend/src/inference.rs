//! Model holder: loads the artifact once and serves predictions from it.
//!
//! A failed load does not stop the process; the holder stays in the unloaded
//! state and every prediction answers with [`ApiError::ModelUnloaded`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;
use crate::features::FeatureLayout;
use crate::models::{ModelInfo, TrainInput};
use crate::onnx::OnnxRegressor;
use crate::regressor::{LinearModel, TreeEnsemble};

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("model artifact '{}' not found", .0.display())]
    Missing(PathBuf),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] io::Error),

    #[error("model artifact is not valid: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("failed to load ONNX graph '{}': {reason}", .path.display())]
    Onnx { path: PathBuf, reason: String },
}

/// On-disk artifact: the trained model plus the column order it expects.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Artifact {
    pub feature_order: Vec<String>,
    pub model: ModelSpec,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
    /// Path is resolved relative to the artifact's directory.
    Onnx { path: PathBuf },
}

#[derive(Debug)]
enum Regressor {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
    Onnx(OnnxRegressor),
}

impl Regressor {
    fn predict(&self, row: &[f32]) -> anyhow::Result<f64> {
        match self {
            Regressor::Linear(model) => model.predict(row),
            Regressor::TreeEnsemble(model) => model.predict(row),
            Regressor::Onnx(model) => model.predict(row),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Regressor::Linear(_) => "linear",
            Regressor::TreeEnsemble(_) => "tree_ensemble",
            Regressor::Onnx(_) => "onnx",
        }
    }
}

#[derive(Debug)]
pub struct LoadedModel {
    layout: FeatureLayout,
    regressor: Regressor,
}

impl LoadedModel {
    pub fn from_artifact(artifact: Artifact, base_dir: &Path) -> Result<Self, ArtifactError> {
        let layout =
            FeatureLayout::from_order(&artifact.feature_order).map_err(ArtifactError::Corrupt)?;
        let width = layout.len();

        let regressor = match artifact.model {
            ModelSpec::Linear(model) => {
                model.validate(width).map_err(ArtifactError::Corrupt)?;
                Regressor::Linear(model)
            }
            ModelSpec::TreeEnsemble(mut model) => {
                model.validate(width).map_err(ArtifactError::Corrupt)?;
                Regressor::TreeEnsemble(model)
            }
            ModelSpec::Onnx { path } => {
                let path = base_dir.join(path);
                let model = OnnxRegressor::load(&path, width).map_err(|e| ArtifactError::Onnx {
                    path: path.clone(),
                    reason: format!("{:#}", e),
                })?;
                Regressor::Onnx(model)
            }
        };

        Ok(Self { layout, regressor })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn kind(&self) -> &'static str {
        self.regressor.kind()
    }

    /// Encode, predict, and round to two decimals.
    pub fn predict_fare(&self, input: &TrainInput) -> anyhow::Result<f64> {
        let vector = self.layout.encode(input);
        let fare = self.regressor.predict(vector.values())?;
        Ok(round_fare(fare))
    }
}

/// Two decimals, ties to even.
pub fn round_fare(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Read and validate an artifact without touching any holder.
pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<LoadedModel, ArtifactError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ArtifactError::Missing(path.to_path_buf()),
        _ => ArtifactError::Io(e),
    })?;

    let artifact: Artifact = serde_json::from_str(&raw)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    LoadedModel::from_artifact(artifact, base_dir)
}

/// Shared, read-only model state for the lifetime of the server.
#[derive(Debug)]
pub struct ModelHolder {
    model: Option<LoadedModel>,
}

impl ModelHolder {
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match load_artifact(path) {
            Ok(model) => {
                info!(
                    "Model loaded successfully from {} ({} model, {} features)",
                    path.display(),
                    model.kind(),
                    model.layout().len()
                );
                for class in model.layout().missing_classes() {
                    warn!(
                        "Class code {} has no feature column; predictions for it use an all-zero class encoding",
                        class.as_str()
                    );
                }
                Self::from_model(model)
            }
            Err(e) => {
                error!("{}", e);
                if let ArtifactError::Missing(_) = e {
                    error!("Train and export the model first, or point MODEL_PATH at an existing artifact.");
                }
                Self::unloaded()
            }
        }
    }

    pub fn from_model(model: LoadedModel) -> Self {
        Self { model: Some(model) }
    }

    pub fn unloaded() -> Self {
        Self { model: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Result<&LoadedModel, ApiError> {
        self.model.as_ref().ok_or(ApiError::ModelUnloaded)
    }

    pub fn predict(&self, input: &TrainInput) -> Result<f64, ApiError> {
        self.model()?
            .predict_fare(input)
            .map_err(|e| ApiError::Prediction(format!("{:#}", e)))
    }

    pub fn info(&self) -> Result<ModelInfo, ApiError> {
        let model = self.model()?;
        Ok(ModelInfo {
            model_type: model.kind().to_string(),
            feature_order: model.layout().names().to_vec(),
            unmapped_classes: model
                .layout()
                .missing_classes()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        })
    }
}
