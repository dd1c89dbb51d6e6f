//! Candidate image resolution for one question

use anyhow::Result;
use std::fmt;

use crate::images::{ImageProvider, NamedImage};
use crate::survey::{ImageSource, ImageSpec};

/// Where a question's candidate images came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    ProjectPool,
    DocumentPool,
    Dataset,
    Bucket,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CandidateSource::ProjectPool => "project image pool",
            CandidateSource::DocumentPool => "document image pool",
            CandidateSource::Dataset => "external dataset",
            CandidateSource::Bucket => "storage bucket",
        };
        f.write_str(label)
    }
}

/// Image pools available to every question of a document
#[derive(Debug, Clone, Copy)]
pub struct ImagePools<'a> {
    pub project: &'a [NamedImage],
    pub document: &'a [NamedImage],
}

/// Candidate set for a question, or `None` when it has no configured source
///
/// Pools are consulted before the question's own source: the project's
/// preloaded pool, then the document's, then a named dataset, then a bucket.
pub async fn resolve_candidates(
    spec: &ImageSpec,
    pools: ImagePools<'_>,
    provider: &dyn ImageProvider,
) -> Result<Option<(CandidateSource, Vec<NamedImage>)>> {
    if !pools.project.is_empty() {
        return Ok(Some((CandidateSource::ProjectPool, pools.project.to_vec())));
    }
    if !pools.document.is_empty() {
        return Ok(Some((CandidateSource::DocumentPool, pools.document.to_vec())));
    }

    match &spec.image_source {
        ImageSource::Preloaded => Ok(None),
        ImageSource::Dataset {
            dataset_name,
            token,
        } => {
            if dataset_name.trim().is_empty() {
                anyhow::bail!("Dataset name missing for question '{}'", spec.name);
            }
            let images = provider
                .dataset_images(dataset_name, token.as_deref())
                .await?;
            Ok(Some((CandidateSource::Dataset, images)))
        }
        ImageSource::Bucket {
            url,
            secret_key,
            bucket_path,
        } => {
            let images = provider.bucket_images(url, secret_key, bucket_path).await?;
            Ok(Some((CandidateSource::Bucket, images)))
        }
    }
}
