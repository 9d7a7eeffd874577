use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::model::store::Model;

#[derive(Error, Debug)]
pub enum ModelFileError {
    #[error("Failed to read or write model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Json(#[from] serde_json::Error),
}

/// Model file version for compatibility checking
pub const MODEL_VERSION: &str = "1.0.0";

/// Serializable model file format
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelData {
    pub version: String,
    pub created_at: String,
    pub model: Model,
}

impl Model {
    /// Load a model from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ModelFileError::Io` if the file cannot be read or
    /// `ModelFileError::Json` if it is not a model.
    pub fn load_from_file(path: &Path) -> Result<Self, ModelFileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a model from JSON, restoring its indexes
    ///
    /// # Errors
    ///
    /// Returns `ModelFileError::Json` if the text is not a model.
    pub fn from_json(json: &str) -> Result<Self, ModelFileError> {
        let data: ModelData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != MODEL_VERSION {
            warn!(
                "Model version mismatch (expected {}, found {})",
                MODEL_VERSION, data.version
            );
        }

        let mut model = data.model;
        model.rebuild_indexes();
        Ok(model)
    }

    /// # Errors
    ///
    /// Returns `ModelFileError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, ModelFileError> {
        #[derive(Serialize)]
        struct ModelDataRef<'a> {
            version: &'a str,
            created_at: String,
            model: &'a Model,
        }

        let data = ModelDataRef {
            version: MODEL_VERSION,
            created_at: chrono::Utc::now().to_rfc3339(),
            model: self,
        };

        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Save the model as JSON
    ///
    /// # Errors
    ///
    /// Returns `ModelFileError::Io` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ModelFileError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::LegoNode;
    use tempfile::NamedTempFile;

    fn sample() -> Model {
        let mut model = Model::new();
        let a = model.add_sequence("A").unwrap();
        let b = model.add_sequence("B").unwrap();
        model.set_site_array(a, "MKV").unwrap();
        let left = model.make_subsequence(a, 1, 3).unwrap();
        let right = model.make_subsequence(b, 2, 8).unwrap();
        model.add_edge(left, right).unwrap();
        model
    }

    #[test]
    fn test_round_trip_restores_indexes() {
        let model = sample();
        let json = model.to_json().unwrap();
        let loaded = Model::from_json(&json).unwrap();

        assert_eq!(loaded.sequences.len(), 2);
        let a = loaded.find_sequence_by_accession("A").unwrap();
        assert_eq!(a.site_array(), Some("MKV"));
        assert_eq!(loaded.edges.find_sequence(a.id).count(), 1);
        let b = loaded.sequences.find_by_accession("B").unwrap().id;
        assert_eq!(loaded.find_node("B").unwrap(), LegoNode::Sequence(b));
    }

    #[test]
    fn test_ids_continue_after_load() {
        let json = sample().to_json().unwrap();
        let mut loaded = Model::from_json(&json).unwrap();
        let c = loaded.add_sequence("C").unwrap();
        assert_eq!(c.0, 3);
    }

    #[test]
    fn test_version_mismatch_still_loads() {
        let json = sample().to_json().unwrap().replace(MODEL_VERSION, "0.0.1");
        assert!(Model::from_json(&json).is_ok());
    }

    #[test]
    fn test_save_and_load_file() {
        let temp = NamedTempFile::with_suffix(".json").unwrap();
        sample().save(temp.path()).unwrap();
        let loaded = Model::load_from_file(temp.path()).unwrap();
        assert_eq!(loaded.edges.len(), 1);
    }

    #[test]
    fn test_not_a_model() {
        assert!(matches!(
            Model::from_json("{\"version\": \"1.0.0\"}"),
            Err(ModelFileError::Json(_))
        ));
        assert!(matches!(
            Model::load_from_file(Path::new("/nonexistent/model.json")),
            Err(ModelFileError::Io(_))
        ));
    }
}
