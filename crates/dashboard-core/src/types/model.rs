//! Model definitions managed by the backend.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ValidationError;

/// File extensions the backend accepts for uploaded model weights.
pub const MODEL_FILE_EXTENSIONS: &[&str] = &["pth", "pt"];

/// Check that a file name looks like serialized model weights.
pub fn validate_model_file(file_name: &str) -> Result<(), ValidationError> {
    ValidationError::check_not_empty("file", file_name)?;

    let extension = Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension {
        Some(ext) if MODEL_FILE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::Invalid {
            field: "file",
            reason: format!("'{}' is not a .pth or .pt file", file_name),
        }),
    }
}

/// Activation function of a linear layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Activation {
    #[serde(rename = "ReLU")]
    #[default]
    Relu,
    #[serde(rename = "Tanh")]
    Tanh,
    #[serde(rename = "GELU")]
    Gelu,
}

/// A single layer of a sequential model, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelLayer {
    Linear {
        output_size: u32,
        #[serde(default)]
        activation: Activation,
        #[serde(default)]
        dropout: f64,
    },
    Lstm {
        hidden_size: u32,
        num_layers: u32,
        #[serde(default)]
        dropout: f64,
        #[serde(default)]
        bidirectional: bool,
    },
    Gru {
        hidden_size: u32,
        num_layers: u32,
        #[serde(default)]
        dropout: f64,
        #[serde(default)]
        bidirectional: bool,
    },
    Attention {
        hidden_size: u32,
        num_heads: u32,
        #[serde(default)]
        dropout: f64,
    },
    Tcn {
        hidden_size: u32,
        kernel_size: u32,
        dilation: u32,
        #[serde(default)]
        dropout: f64,
    },
    Transformer {
        hidden_size: u32,
        num_heads: u32,
        #[serde(default)]
        dropout: f64,
    },
}

impl ModelLayer {
    /// Layer type name as used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelLayer::Linear { .. } => "linear",
            ModelLayer::Lstm { .. } => "lstm",
            ModelLayer::Gru { .. } => "gru",
            ModelLayer::Attention { .. } => "attention",
            ModelLayer::Tcn { .. } => "tcn",
            ModelLayer::Transformer { .. } => "transformer",
        }
    }

    pub fn dropout(&self) -> f64 {
        match self {
            ModelLayer::Linear { dropout, .. }
            | ModelLayer::Lstm { dropout, .. }
            | ModelLayer::Gru { dropout, .. }
            | ModelLayer::Attention { dropout, .. }
            | ModelLayer::Tcn { dropout, .. }
            | ModelLayer::Transformer { dropout, .. } => *dropout,
        }
    }

    /// Integer parameters that must be at least 1, by name.
    fn sizes(&self) -> Vec<(&'static str, u32)> {
        match self {
            ModelLayer::Linear { output_size, .. } => vec![("output_size", *output_size)],
            ModelLayer::Lstm {
                hidden_size,
                num_layers,
                ..
            }
            | ModelLayer::Gru {
                hidden_size,
                num_layers,
                ..
            } => vec![("hidden_size", *hidden_size), ("num_layers", *num_layers)],
            ModelLayer::Attention {
                hidden_size,
                num_heads,
                ..
            }
            | ModelLayer::Transformer {
                hidden_size,
                num_heads,
                ..
            } => vec![("hidden_size", *hidden_size), ("num_heads", *num_heads)],
            ModelLayer::Tcn {
                hidden_size,
                kernel_size,
                dilation,
                ..
            } => vec![
                ("hidden_size", *hidden_size),
                ("kernel_size", *kernel_size),
                ("dilation", *dilation),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.sizes() {
            if value == 0 {
                return Err(ValidationError::NotPositive { field });
            }
        }
        ValidationError::check_range("dropout", self.dropout(), 0.0, 1.0)
    }
}

/// Model definition posted to `/models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Name to save the model under; the backend generates one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Number of input features
    pub input_size: u32,
    pub layers: Vec<ModelLayer>,
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            ValidationError::check_not_empty("name", name)?;
        }
        if self.input_size == 0 {
            return Err(ValidationError::NotPositive { field: "input_size" });
        }
        if self.layers.is_empty() {
            return Err(ValidationError::Empty { field: "layers" });
        }
        self.layers.iter().try_for_each(ModelLayer::validate)
    }
}

/// Training run settings posted to `/models/{name}/train`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: u32,
    pub batch_size: u32,
    pub learning_rate: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            batch_size: 32,
            learning_rate: 0.001,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.epochs == 0 {
            return Err(ValidationError::NotPositive { field: "epochs" });
        }
        if self.batch_size == 0 {
            return Err(ValidationError::NotPositive { field: "batch_size" });
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ValidationError::NotPositive { field: "learning_rate" });
        }
        Ok(())
    }
}

/// Entry of the model listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// Body of `GET /models`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_wire_format() {
        let json = r#"{
            "input_size": 32,
            "layers": [
                {"type": "lstm", "hidden_size": 64, "num_layers": 2, "dropout": 0.2, "bidirectional": true},
                {"type": "linear", "output_size": 1, "activation": "GELU"}
            ]
        }"#;

        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.layers[0].kind(), "lstm");
        assert_eq!(
            config.layers[1],
            ModelLayer::Linear {
                output_size: 1,
                activation: Activation::Gelu,
                dropout: 0.0
            }
        );
        assert!(config.validate().is_ok());

        let out = serde_json::to_value(&config.layers[1]).unwrap();
        assert_eq!(out["type"], "linear");
        assert_eq!(out["activation"], "GELU");
    }

    #[test]
    fn test_model_validation() {
        let mut config = ModelConfig {
            name: None,
            input_size: 16,
            layers: vec![],
        };
        assert_eq!(config.validate(), Err(ValidationError::Empty { field: "layers" }));

        config.layers.push(ModelLayer::Tcn {
            hidden_size: 32,
            kernel_size: 0,
            dilation: 1,
            dropout: 0.1,
        });
        assert_eq!(
            config.validate(),
            Err(ValidationError::NotPositive { field: "kernel_size" })
        );

        config.layers[0] = ModelLayer::Attention {
            hidden_size: 32,
            num_heads: 4,
            dropout: 1.5,
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { field: "dropout", .. })
        ));
    }

    #[test]
    fn test_model_file_extensions() {
        assert!(validate_model_file("lstm_v2.pth").is_ok());
        assert!(validate_model_file("weights.PT").is_ok());
        assert!(validate_model_file("").is_err());
        assert!(matches!(
            validate_model_file("config.json"),
            Err(ValidationError::Invalid { field: "file", .. })
        ));
        assert!(validate_model_file("pth").is_err());
    }

    #[test]
    fn test_model_list_payload() {
        let json = r#"{"models": [{"name": "model_20240101_120000", "created_at": "2024-01-01T12:00:00", "config": {"input_size": 8}}]}"#;
        let list: ModelList = serde_json::from_str(json).unwrap();
        assert_eq!(list.models[0].name, "model_20240101_120000");
        assert!(list.models[0].status.is_none());
    }

    #[test]
    fn test_training_config() {
        assert!(TrainingConfig::default().validate().is_ok());
        let bad = TrainingConfig {
            learning_rate: 0.0,
            ..TrainingConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
