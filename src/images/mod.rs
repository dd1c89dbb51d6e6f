//! Image providers
//!
//! Image-bearing questions draw from a candidate set of named URLs. Preloaded
//! pools come straight from the project or document; external datasets and
//! storage buckets are reached through an [`ImageProvider`].

pub mod http;
pub mod sampling;
pub mod static_provider;

use anyhow::Result;
use async_trait::async_trait;

pub use crate::survey::PreloadedImage as NamedImage;
pub use http::HttpImageProvider;
pub use sampling::sample_without_replacement;
pub use static_provider::StaticImageProvider;

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Candidate images of a named external dataset
    async fn dataset_images(&self, dataset_name: &str, token: Option<&str>) -> Result<Vec<NamedImage>>;

    /// Candidate images stored under `bucket_path` of a storage service
    async fn bucket_images(
        &self,
        url: &str,
        secret_key: &str,
        bucket_path: &str,
    ) -> Result<Vec<NamedImage>>;
}
