use serde::{Deserialize, Serialize};

/// Prefix carried by every one-hot travel-class column.
pub const CLASS_PREFIX: &str = "class_";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassCode {
    #[serde(rename = "1A")]
    FirstAc,
    #[serde(rename = "2A")]
    SecondAc,
    #[serde(rename = "3A")]
    ThirdAc,
    #[serde(rename = "3E")]
    ThirdAcEconomy,
    #[serde(rename = "CC")]
    ChairCar,
    #[serde(rename = "SL")]
    Sleeper,
    #[serde(rename = "2S")]
    SecondSitting,
    #[serde(rename = "FC")]
    FirstClass,
}

impl ClassCode {
    pub const ALL: [ClassCode; 8] = [
        ClassCode::FirstAc,
        ClassCode::SecondAc,
        ClassCode::ThirdAc,
        ClassCode::ThirdAcEconomy,
        ClassCode::ChairCar,
        ClassCode::Sleeper,
        ClassCode::SecondSitting,
        ClassCode::FirstClass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassCode::FirstAc => "1A",
            ClassCode::SecondAc => "2A",
            ClassCode::ThirdAc => "3A",
            ClassCode::ThirdAcEconomy => "3E",
            ClassCode::ChairCar => "CC",
            ClassCode::Sleeper => "SL",
            ClassCode::SecondSitting => "2S",
            ClassCode::FirstClass => "FC",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    /// Position in `ALL`, used to index per-class lookup tables.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// One-hot column name the model was trained with, e.g. `class_3A`.
    pub fn column_name(&self) -> String {
        format!("{}{}", CLASS_PREFIX, self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrainInput {
    pub class_code: ClassCode,
    /// Kilometers.
    pub distance: u64,
    /// Minutes.
    pub duration: u64,
    pub has_catering: bool,
    pub is_dynamic: bool,
}

impl TrainInput {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [("distance", self.distance), ("duration", self.duration)];

        for (name, value) in fields.iter() {
            if *value == 0 {
                return Err(format!("{} must be greater than 0 (value: {})", name, value));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionOut {
    pub predicted_base_fare: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody {
            error: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WelcomeMessage {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn new(model_loaded: bool) -> Self {
        HealthStatus {
            status: if model_loaded { "ok" } else { "degraded" }.to_string(),
            model_loaded,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelInfo {
    pub model_type: String,
    pub feature_order: Vec<String>,
    pub unmapped_classes: Vec<String>,
}
