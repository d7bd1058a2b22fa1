use std::path::Path;
use std::sync::Arc;

use super::ModelLoadError;

/// Ordered class names the classifier indexes into. Cheap to clone, never
/// mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Arc<[String]>,
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Result<Self, ModelLoadError> {
        if labels.is_empty() {
            return Err(ModelLoadError::EmptyLabels);
        }
        Ok(Self {
            labels: labels.into(),
        })
    }

    /// Reads a JSON array of class names, e.g. `["Apple___Apple_scab", ...]`.
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let labels: Vec<String> = serde_json::from_str(&contents)?;
        Self::new(labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_labels_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class_names.json");
        std::fs::write(
            &path,
            r#"["Tomato___Early_blight", "Tomato___Late_blight", "Tomato___healthy"]"#,
        )
        .unwrap();

        let labels = LabelSet::load(&path).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(1), Some("Tomato___Late_blight"));
        assert_eq!(labels.get(3), None);
        assert_eq!(labels.get(2), Some("Tomato___healthy"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LabelSet::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::Io { .. }));
    }

    #[test]
    fn rejects_non_array_and_empty_lists() {
        let dir = tempfile::tempdir().unwrap();
        let object = dir.path().join("object.json");
        std::fs::write(&object, r#"{"0": "Tomato___healthy"}"#).unwrap();
        assert!(matches!(
            LabelSet::load(&object),
            Err(ModelLoadError::Json(_))
        ));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(matches!(
            LabelSet::load(&empty),
            Err(ModelLoadError::EmptyLabels)
        ));
    }
}
