use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::preview;

/// Which classification backend a prediction is sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    MobileNetV2,
    InceptionResNetV2,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::MobileNetV2, ModelChoice::InceptionResNetV2];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelChoice::MobileNetV2 => "MobileNetV2",
            ModelChoice::InceptionResNetV2 => "InceptionResNetV2",
        }
    }

    /// Identifier sent as the `model_type` form field.
    pub fn backend_id(self) -> &'static str {
        match self {
            ModelChoice::MobileNetV2 => "mobilenet",
            ModelChoice::InceptionResNetV2 => "inception",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for ModelChoice {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelChoice::ALL
            .into_iter()
            .find(|m| m.display_name() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// A file as handed over by the user, before any preview work.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl PickedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn read(path: &Path) -> anyhow::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self::new(name, bytes))
    }
}

/// Image chosen for one prediction attempt, with its display encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub name: String,
    pub mime: String,
    pub bytes: Bytes,
    pub preview: String,
}

impl SelectedImage {
    pub fn from_file(file: PickedFile) -> Self {
        let mime = preview::sniff_mime(&file.bytes).to_string();
        let preview = preview::data_url(&mime, &file.bytes);
        Self {
            name: file.name,
            mime,
            bytes: file.bytes,
            preview,
        }
    }
}

/// Result of one completed prediction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Success { class_index: i64, confidence: f64 },
    Failure { message: String },
}
