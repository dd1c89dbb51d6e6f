use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use super::{ImageProvider, NamedImage};

/// Provider answering from fixed pools
///
/// Unknown datasets and buckets fail, the way an unreachable source would.
#[derive(Debug, Clone, Default)]
pub struct StaticImageProvider {
    datasets: HashMap<String, Vec<NamedImage>>,
    buckets: HashMap<String, Vec<NamedImage>>,
}

impl StaticImageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, dataset_name: impl Into<String>, images: Vec<NamedImage>) -> Self {
        self.datasets.insert(dataset_name.into(), images);
        self
    }

    pub fn with_bucket(mut self, bucket_path: impl Into<String>, images: Vec<NamedImage>) -> Self {
        self.buckets.insert(bucket_path.into(), images);
        self
    }
}

#[async_trait]
impl ImageProvider for StaticImageProvider {
    async fn dataset_images(&self, dataset_name: &str, _token: Option<&str>) -> Result<Vec<NamedImage>> {
        self.datasets
            .get(dataset_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown dataset '{}'", dataset_name))
    }

    async fn bucket_images(
        &self,
        _url: &str,
        _secret_key: &str,
        bucket_path: &str,
    ) -> Result<Vec<NamedImage>> {
        self.buckets
            .get(bucket_path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown bucket path '{}'", bucket_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_sources() {
        let provider = StaticImageProvider::new().with_dataset(
            "streets",
            vec![NamedImage {
                name: "s1.jpg".to_string(),
                url: "https://img/s1.jpg".to_string(),
            }],
        );

        assert_eq!(provider.dataset_images("streets", None).await.unwrap().len(), 1);
        assert!(provider.dataset_images("parks", None).await.is_err());
        assert!(provider.bucket_images("https://x", "key", "images").await.is_err());
    }
}
