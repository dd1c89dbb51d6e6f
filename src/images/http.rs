use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use super::{ImageProvider, NamedImage};

pub const DEFAULT_DATASET_SERVER_URL: &str = "https://datasets-server.huggingface.co";

/// Rows fetched from a dataset per resolution
const DATASET_PAGE_LENGTH: usize = 100;

/// Objects listed from a bucket per resolution
const BUCKET_LIST_LIMIT: usize = 1000;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Debug, Deserialize)]
struct RowsResponse {
    #[serde(default)]
    rows: Vec<DatasetRow>,
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    row_idx: usize,
    row: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct BucketObject {
    name: String,
    /// Folders are listed without an id
    #[serde(default)]
    id: Option<String>,
}

/// Image provider backed by a dataset rows server and a storage bucket API
#[derive(Clone)]
pub struct HttpImageProvider {
    http_client: reqwest::Client,
    dataset_server_url: String,
}

impl HttpImageProvider {
    pub fn new(dataset_server_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(crate::api::constants::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            dataset_server_url: dataset_server_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Name and URL of the image carried by a dataset row
fn image_from_row(dataset_name: &str, row: &DatasetRow) -> Option<NamedImage> {
    let url = row.row.values().find_map(|value| match value {
        Value::Object(image) => image.get("src").and_then(Value::as_str),
        _ => None,
    })?;

    let name = ["image_name", "file_name", "filename", "name"]
        .iter()
        .find_map(|key| row.row.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!("{}_{}", dataset_name.replace('/', "_"), row.row_idx)
        });

    Some(NamedImage {
        name,
        url: url.to_string(),
    })
}

fn is_image_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Split `bucket/some/prefix` into the bucket and its object prefix
fn split_bucket_path(bucket_path: &str) -> (&str, &str) {
    let trimmed = bucket_path.trim_matches('/');
    trimmed.split_once('/').unwrap_or((trimmed, ""))
}

fn public_object_url(base_url: &str, bucket: &str, prefix: &str, name: &str) -> String {
    let object = if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    };
    let encoded: Vec<String> = object
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base_url.trim_end_matches('/'),
        bucket,
        encoded.join("/")
    )
}

#[async_trait]
impl ImageProvider for HttpImageProvider {
    async fn dataset_images(&self, dataset_name: &str, token: Option<&str>) -> Result<Vec<NamedImage>> {
        let url = format!(
            "{}/rows?dataset={}&config=default&split=train&offset=0&length={}",
            self.dataset_server_url,
            urlencoding::encode(dataset_name),
            DATASET_PAGE_LENGTH
        );
        debug!("Fetching dataset rows: {}", url);

        let mut request = self.http_client.get(&url);
        if let Some(token) = token.filter(|token| !token.is_empty()) {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach dataset server for '{}'", dataset_name))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Dataset server answered HTTP {} for '{}'", status, dataset_name);
        }

        let rows: RowsResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse rows of dataset '{}'", dataset_name))?;

        let images: Vec<NamedImage> = rows
            .rows
            .iter()
            .filter_map(|row| image_from_row(dataset_name, row))
            .collect();
        info!("Dataset '{}' offered {} images", dataset_name, images.len());
        Ok(images)
    }

    async fn bucket_images(
        &self,
        url: &str,
        secret_key: &str,
        bucket_path: &str,
    ) -> Result<Vec<NamedImage>> {
        let (bucket, prefix) = split_bucket_path(bucket_path);
        if bucket.is_empty() {
            anyhow::bail!("Bucket path is empty");
        }

        let list_url = format!(
            "{}/storage/v1/object/list/{}",
            url.trim_end_matches('/'),
            bucket
        );
        debug!("Listing bucket objects: {} (prefix '{}')", list_url, prefix);

        let response = self
            .http_client
            .post(&list_url)
            .header("apikey", secret_key)
            .bearer_auth(secret_key)
            .json(&json!({
                "prefix": prefix,
                "limit": BUCKET_LIST_LIMIT,
                "offset": 0,
                "sortBy": { "column": "name", "order": "asc" }
            }))
            .send()
            .await
            .with_context(|| format!("Failed to reach storage bucket '{}'", bucket))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Storage bucket '{}' answered HTTP {}", bucket, status);
        }

        let objects: Vec<BucketObject> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse listing of bucket '{}'", bucket))?;

        let images: Vec<NamedImage> = objects
            .into_iter()
            .filter(|object| object.id.is_some() && is_image_file(&object.name))
            .map(|object| NamedImage {
                url: public_object_url(url, bucket, prefix, &object.name),
                name: object.name,
            })
            .collect();
        info!("Bucket '{}' offered {} images", bucket_path, images.len());
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_from_row() {
        let row: DatasetRow = serde_json::from_value(json!({
            "row_idx": 4,
            "row": {
                "image": { "src": "https://cdn/4.jpg", "height": 10, "width": 10 },
                "label": 2
            }
        }))
        .unwrap();

        let image = image_from_row("org/streets", &row).unwrap();
        assert_eq!(image.url, "https://cdn/4.jpg");
        assert_eq!(image.name, "org_streets_4");
    }

    #[test]
    fn test_image_from_row_prefers_file_name() {
        let row: DatasetRow = serde_json::from_value(json!({
            "row_idx": 0,
            "row": { "image": { "src": "https://cdn/0.jpg" }, "file_name": "corner.jpg" }
        }))
        .unwrap();

        assert_eq!(image_from_row("d", &row).unwrap().name, "corner.jpg");
    }

    #[test]
    fn test_row_without_image_is_skipped() {
        let row: DatasetRow =
            serde_json::from_value(json!({ "row_idx": 1, "row": { "text": "hello" } })).unwrap();
        assert!(image_from_row("d", &row).is_none());
    }

    #[test]
    fn test_bucket_helpers() {
        assert_eq!(split_bucket_path("images/streets/"), ("images", "streets"));
        assert_eq!(split_bucket_path("images"), ("images", ""));
        assert!(is_image_file("a.JPG"));
        assert!(!is_image_file("notes.txt"));
        assert!(!is_image_file("folder"));
        assert_eq!(
            public_object_url("https://x.supabase.co/", "images", "streets", "a b.jpg"),
            "https://x.supabase.co/storage/v1/object/public/images/streets/a%20b.jpg"
        );
    }
}
