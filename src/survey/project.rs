use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named image with its public URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreloadedImage {
    pub name: String,
    pub url: String,
}

/// Images and dataset sources available to a project's questions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDatasetConfig {
    /// Absent in lightweight listings that only report the count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preloaded_images: Option<Vec<PreloadedImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preloaded_images_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageDatasetConfig {
    pub fn with_images(images: Vec<PreloadedImage>) -> Self {
        Self {
            preloaded_images_count: Some(images.len()),
            preloaded_images: Some(images),
            ..Default::default()
        }
    }

    /// Declares preloaded images without carrying them
    pub fn is_lightweight(&self) -> bool {
        self.preloaded_images_count.is_some_and(|count| count > 0) && self.preloaded_images.is_none()
    }

    pub fn pool(&self) -> &[PreloadedImage] {
        self.preloaded_images.as_deref().unwrap_or_default()
    }
}

/// Where participant responses are stored
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStorageConfig {
    #[serde(default)]
    pub enabled: bool,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

/// One survey authoring workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_dataset_config: ImageDatasetConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_storage: Option<ResponseStorageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_dataset_config: ImageDatasetConfig::default(),
            response_storage: None,
            created_at: Some(Utc::now()),
            extra: Map::new(),
        }
    }

    /// Fresh project with a generated identifier
    pub fn create(name: impl Into<String>) -> Self {
        Self::new(format!("project_{}", uuid::Uuid::new_v4().simple()), name)
    }

    pub fn is_lightweight(&self) -> bool {
        self.image_dataset_config.is_lightweight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lightweight_detection() {
        let project: Project = serde_json::from_value(json!({
            "id": "p1",
            "name": "Streets",
            "imageDatasetConfig": { "preloadedImagesCount": 12 }
        }))
        .unwrap();
        assert!(project.is_lightweight());
        assert!(project.image_dataset_config.pool().is_empty());

        let full = ImageDatasetConfig::with_images(vec![PreloadedImage {
            name: "a.jpg".to_string(),
            url: "https://img/a.jpg".to_string(),
        }]);
        assert!(!full.is_lightweight());
        assert_eq!(full.pool().len(), 1);
    }

    #[test]
    fn test_created_ids_are_unique() {
        let a = Project::create("A");
        let b = Project::create("A");
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("project_"));
    }
}
