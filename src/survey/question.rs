//! Question elements of the authoring schema
//!
//! Questions are stored as JSON records discriminated by a `type` string. The
//! image-bearing kinds are parsed into dedicated variants with typed fields; every
//! other kind is carried through verbatim as a [`PlainQuestion`].

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Image fit applied to every image question unless the author overrides it
pub const DEFAULT_IMAGE_FIT: &str = "cover";

fn is_false(value: &bool) -> bool {
    !*value
}

/// The six image-bearing question kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Display,
    Picker,
    Ranking,
    Rating,
    Boolean,
    Matrix,
}

impl ImageKind {
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        match type_name {
            "image" => Some(ImageKind::Display),
            "imagepicker" => Some(ImageKind::Picker),
            "imageranking" => Some(ImageKind::Ranking),
            "imagerating" => Some(ImageKind::Rating),
            "imageboolean" => Some(ImageKind::Boolean),
            "imagematrix" => Some(ImageKind::Matrix),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            ImageKind::Display => "image",
            ImageKind::Picker => "imagepicker",
            ImageKind::Ranking => "imageranking",
            ImageKind::Rating => "imagerating",
            ImageKind::Boolean => "imageboolean",
            ImageKind::Matrix => "imagematrix",
        }
    }

    /// Number of images drawn when the question does not set `imageCount`
    pub fn default_image_count(self) -> usize {
        match self {
            ImageKind::Display | ImageKind::Rating | ImageKind::Boolean | ImageKind::Matrix => 1,
            ImageKind::Picker | ImageKind::Ranking => 4,
        }
    }

    /// Kinds rendered as an image block followed by a response control
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            ImageKind::Ranking | ImageKind::Rating | ImageKind::Boolean | ImageKind::Matrix
        )
    }
}

/// Where an image question draws its candidate images from when the project
/// has no preloaded pool
///
/// Stored documents spread the source over several element keys:
/// `imageSource: "huggingface"` with a `huggingFaceConfig` object for a
/// dataset, or a `supabaseConfig` object with `bucketPath` for a bucket. The
/// tagged object form (`imageSource: {"kind": ...}`) is accepted on read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImageSource {
    #[default]
    Preloaded,
    /// A named external dataset
    #[serde(rename_all = "camelCase")]
    Dataset {
        dataset_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// A storage bucket addressed by endpoint and credential
    #[serde(rename_all = "camelCase")]
    Bucket {
        url: String,
        secret_key: String,
        #[serde(default)]
        bucket_path: String,
    },
}

const SOURCE_KEY: &str = "imageSource";
const DATASET_SOURCE: &str = "huggingface";
const DATASET_CONFIG_KEY: &str = "huggingFaceConfig";
const BUCKET_CONFIG_KEY: &str = "supabaseConfig";
const BUCKET_PATH_KEY: &str = "bucketPath";

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

impl ImageSource {
    pub fn is_preloaded(&self) -> bool {
        matches!(self, ImageSource::Preloaded)
    }

    /// Remove the source keys from a stored element and decode them
    ///
    /// Never fails: unreadable source descriptors decode as `Preloaded`, which
    /// leaves the question unresolved rather than rejecting the document.
    pub fn take_from(fields: &mut Map<String, Value>) -> Self {
        let marker = fields.remove(SOURCE_KEY);
        let dataset_config = fields.remove(DATASET_CONFIG_KEY);
        let bucket_config = fields.remove(BUCKET_CONFIG_KEY);
        let bucket_path = fields.remove(BUCKET_PATH_KEY);

        if let Some(marker @ Value::Object(_)) = &marker {
            match serde_json::from_value::<ImageSource>(marker.clone()) {
                Ok(source) => return source,
                Err(err) => log::warn!("Ignoring unreadable image source {}: {}", marker, err),
            }
        }

        if marker.as_ref().and_then(Value::as_str) == Some(DATASET_SOURCE) {
            if let Some(Value::Object(config)) = &dataset_config {
                return ImageSource::Dataset {
                    dataset_name: string_field(config, "datasetName").unwrap_or_default(),
                    token: string_field(config, "huggingFaceToken").filter(|t| !t.is_empty()),
                };
            }
        }

        if let Some(Value::Object(config)) = &bucket_config {
            return ImageSource::Bucket {
                url: string_field(config, "url").unwrap_or_default(),
                secret_key: string_field(config, "secretKey").unwrap_or_default(),
                bucket_path: bucket_path
                    .as_ref()
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            };
        }

        ImageSource::Preloaded
    }

    /// Write the source back in its stored element form
    pub fn write_to(&self, fields: &mut Map<String, Value>) {
        match self {
            ImageSource::Preloaded => {}
            ImageSource::Dataset {
                dataset_name,
                token,
            } => {
                let mut config = Map::new();
                config.insert("datasetName".to_string(), Value::String(dataset_name.clone()));
                if let Some(token) = token {
                    config.insert("huggingFaceToken".to_string(), Value::String(token.clone()));
                }
                fields.insert(SOURCE_KEY.to_string(), Value::String(DATASET_SOURCE.to_string()));
                fields.insert(DATASET_CONFIG_KEY.to_string(), Value::Object(config));
            }
            ImageSource::Bucket {
                url,
                secret_key,
                bucket_path,
            } => {
                let mut config = Map::new();
                config.insert("url".to_string(), Value::String(url.clone()));
                if !secret_key.is_empty() {
                    config.insert("secretKey".to_string(), Value::String(secret_key.clone()));
                }
                fields.insert(BUCKET_CONFIG_KEY.to_string(), Value::Object(config));
                fields.insert(BUCKET_PATH_KEY.to_string(), Value::String(bucket_path.clone()));
            }
        }
    }

    /// The same source without its access credentials
    pub fn redacted(&self) -> Self {
        match self {
            ImageSource::Preloaded => ImageSource::Preloaded,
            ImageSource::Dataset { dataset_name, .. } => ImageSource::Dataset {
                dataset_name: dataset_name.clone(),
                token: None,
            },
            ImageSource::Bucket {
                url, bucket_path, ..
            } => ImageSource::Bucket {
                url: url.clone(),
                secret_key: String::new(),
                bucket_path: bucket_path.clone(),
            },
        }
    }
}

/// Fields shared by every image-bearing question
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub random_image_selection: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<usize>,
    /// Decoded from and written to the element's source keys by [`Question`]
    #[serde(skip)]
    pub image_source: ImageSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_fit: Option<String>,
    /// Names of the images shown for this question, once resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_names: Option<Vec<String>>,
    /// Inline markup embedding the resolved images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_html: Option<String>,
}

impl ImageSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// `imageCount` with zero or absent falling back to the kind's default
    pub fn effective_image_count(&self, kind: ImageKind) -> usize {
        match self.image_count {
            Some(count) if count > 0 => count,
            _ => kind.default_image_count(),
        }
    }
}

/// A selectable image in an image picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChoice {
    pub value: String,
    pub image_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDisplay {
    #[serde(flatten)]
    pub spec: ImageSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// Every resolved URL when more than one image was drawn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_links: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePicker {
    #[serde(flatten)]
    pub spec: ImageSpec,
    #[serde(default, skip_serializing_if = "is_false")]
    pub multi_select: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ImageChoice>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRanking {
    #[serde(flatten)]
    pub spec: ImageSpec,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRating {
    #[serde(flatten)]
    pub spec: ImageSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rate_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate_description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBoolean {
    #[serde(flatten)]
    pub spec: ImageSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_true: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_false: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_true: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_false: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMatrix {
    #[serde(flatten)]
    pub spec: ImageSpec,
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub columns: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Any question kind without image content, kept exactly as authored
#[derive(Debug, Clone, PartialEq)]
pub struct PlainQuestion {
    pub kind: String,
    pub name: String,
    /// All remaining fields except `type` and `name`
    pub fields: Map<String, Value>,
}

/// A question element, closed over the image-bearing kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Question {
    Plain(PlainQuestion),
    Image(ImageDisplay),
    ImagePicker(ImagePicker),
    ImageRanking(ImageRanking),
    ImageRating(ImageRating),
    ImageBoolean(ImageBoolean),
    ImageMatrix(ImageMatrix),
}

impl Question {
    /// Build a plain question of the given type
    pub fn plain(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Question::Plain(PlainQuestion {
            kind: kind.into(),
            name: name.into(),
            fields: Map::new(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Question::Plain(q) => &q.name,
            other => other.image_spec().map(|spec| spec.name.as_str()).unwrap_or_default(),
        }
    }

    pub fn set_name(&mut self, name: String) {
        match self {
            Question::Plain(q) => q.name = name,
            other => {
                if let Some(spec) = other.image_spec_mut() {
                    spec.name = name;
                }
            }
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Question::Plain(q) => &q.kind,
            other => other.image_kind().map(ImageKind::type_name).unwrap_or_default(),
        }
    }

    pub fn image_kind(&self) -> Option<ImageKind> {
        match self {
            Question::Plain(_) => None,
            Question::Image(_) => Some(ImageKind::Display),
            Question::ImagePicker(_) => Some(ImageKind::Picker),
            Question::ImageRanking(_) => Some(ImageKind::Ranking),
            Question::ImageRating(_) => Some(ImageKind::Rating),
            Question::ImageBoolean(_) => Some(ImageKind::Boolean),
            Question::ImageMatrix(_) => Some(ImageKind::Matrix),
        }
    }

    pub fn image_spec(&self) -> Option<&ImageSpec> {
        match self {
            Question::Plain(_) => None,
            Question::Image(q) => Some(&q.spec),
            Question::ImagePicker(q) => Some(&q.spec),
            Question::ImageRanking(q) => Some(&q.spec),
            Question::ImageRating(q) => Some(&q.spec),
            Question::ImageBoolean(q) => Some(&q.spec),
            Question::ImageMatrix(q) => Some(&q.spec),
        }
    }

    pub fn image_spec_mut(&mut self) -> Option<&mut ImageSpec> {
        match self {
            Question::Plain(_) => None,
            Question::Image(q) => Some(&mut q.spec),
            Question::ImagePicker(q) => Some(&mut q.spec),
            Question::ImageRanking(q) => Some(&mut q.spec),
            Question::ImageRating(q) => Some(&mut q.spec),
            Question::ImageBoolean(q) => Some(&mut q.spec),
            Question::ImageMatrix(q) => Some(&mut q.spec),
        }
    }

    /// Parse a question from its stored JSON form
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut fields) = value else {
            return Err(de::Error::custom("question element must be a JSON object"));
        };

        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(_) => return Err(de::Error::custom("question `type` must be a string")),
            None => return Err(de::Error::missing_field("type")),
        };

        let Some(image_kind) = ImageKind::from_type_name(&kind) else {
            let name = match fields.remove("name") {
                Some(Value::String(name)) => name,
                Some(_) => return Err(de::Error::custom("question `name` must be a string")),
                None => return Err(de::Error::missing_field("name")),
            };
            return Ok(Question::Plain(PlainQuestion { kind, name, fields }));
        };

        let source = ImageSource::take_from(&mut fields);
        let fields = Value::Object(fields);
        let mut question = match image_kind {
            ImageKind::Display => Question::Image(serde_json::from_value(fields)?),
            ImageKind::Picker => Question::ImagePicker(serde_json::from_value(fields)?),
            ImageKind::Ranking => Question::ImageRanking(serde_json::from_value(fields)?),
            ImageKind::Rating => Question::ImageRating(serde_json::from_value(fields)?),
            ImageKind::Boolean => Question::ImageBoolean(serde_json::from_value(fields)?),
            ImageKind::Matrix => Question::ImageMatrix(serde_json::from_value(fields)?),
        };
        if let Some(spec) = question.image_spec_mut() {
            spec.image_source = source;
        }
        Ok(question)
    }

    /// Render the question back to its stored JSON form
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut value = match self {
            Question::Plain(q) => {
                let mut fields = q.fields.clone();
                fields.insert("name".to_string(), Value::String(q.name.clone()));
                Value::Object(fields)
            }
            Question::Image(q) => serde_json::to_value(q)?,
            Question::ImagePicker(q) => serde_json::to_value(q)?,
            Question::ImageRanking(q) => serde_json::to_value(q)?,
            Question::ImageRating(q) => serde_json::to_value(q)?,
            Question::ImageBoolean(q) => serde_json::to_value(q)?,
            Question::ImageMatrix(q) => serde_json::to_value(q)?,
        };

        if let Value::Object(fields) = &mut value {
            if let Some(spec) = self.image_spec() {
                spec.image_source.write_to(fields);
            }
            fields.insert("type".to_string(), Value::String(self.type_name().to_string()));
        }
        Ok(value)
    }
}

impl Serialize for Question {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().map_err(ser::Error::custom)?.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Question {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Question::from_value(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_question_passes_through() {
        let raw = json!({
            "type": "radiogroup",
            "name": "age",
            "choices": ["18-24", "25-34"],
            "isRequired": true
        });

        let question = Question::from_value(raw.clone()).unwrap();
        assert_eq!(question.name(), "age");
        assert_eq!(question.type_name(), "radiogroup");
        assert!(question.image_kind().is_none());
        assert_eq!(question.to_value().unwrap(), raw);
    }

    #[test]
    fn test_image_rating_parses_typed_fields() {
        let question = Question::from_value(json!({
            "type": "imagerating",
            "name": "street1",
            "randomImageSelection": true,
            "rateMax": 7,
            "customWidth": "80%"
        }))
        .unwrap();

        let Question::ImageRating(rating) = &question else {
            panic!("expected image rating, got {:?}", question);
        };
        assert_eq!(rating.spec.name, "street1");
        assert!(rating.spec.random_image_selection);
        assert_eq!(rating.rate_max, Some(7));
        assert_eq!(rating.extra.get("customWidth"), Some(&json!("80%")));
        assert_eq!(rating.spec.effective_image_count(ImageKind::Rating), 1);
    }

    #[test]
    fn test_dataset_source_parses() {
        let question = Question::from_value(json!({
            "type": "imagepicker",
            "name": "pick",
            "imageSource": { "kind": "dataset", "datasetName": "streets/sg" }
        }))
        .unwrap();

        let spec = question.image_spec().unwrap();
        assert_eq!(
            spec.image_source,
            ImageSource::Dataset {
                dataset_name: "streets/sg".to_string(),
                token: None
            }
        );
        assert_eq!(spec.effective_image_count(ImageKind::Picker), 4);
    }

    #[test]
    fn test_stored_dataset_source_round_trips() {
        let raw = json!({
            "type": "imagerating",
            "name": "street1",
            "randomImageSelection": true,
            "imageSource": "huggingface",
            "huggingFaceConfig": { "datasetName": "city/streets", "huggingFaceToken": "hf_abc" }
        });

        let question = Question::from_value(raw.clone()).unwrap();
        let Question::ImageRating(rating) = &question else {
            panic!("expected image rating, got {:?}", question);
        };
        assert_eq!(
            rating.spec.image_source,
            ImageSource::Dataset {
                dataset_name: "city/streets".to_string(),
                token: Some("hf_abc".to_string())
            }
        );
        assert!(rating.extra.is_empty());
        assert_eq!(question.to_value().unwrap(), raw);
    }

    #[test]
    fn test_stored_bucket_source_round_trips() {
        let raw = json!({
            "type": "imagepicker",
            "name": "pick",
            "supabaseConfig": { "url": "https://abc.supabase.co", "secretKey": "sk" },
            "bucketPath": "images/streets"
        });

        let question = Question::from_value(raw.clone()).unwrap();
        assert_eq!(
            question.image_spec().unwrap().image_source,
            ImageSource::Bucket {
                url: "https://abc.supabase.co".to_string(),
                secret_key: "sk".to_string(),
                bucket_path: "images/streets".to_string()
            }
        );
        assert_eq!(question.to_value().unwrap(), raw);
    }

    #[test]
    fn test_unreadable_source_leaves_question_unresolved() {
        let question = Question::from_value(json!({
            "type": "imageboolean",
            "name": "q1",
            "imageSource": "huggingface",
            "huggingFaceConfig": "not an object"
        }))
        .unwrap();
        assert!(question.image_spec().unwrap().image_source.is_preloaded());

        let question = Question::from_value(json!({
            "type": "imageboolean",
            "name": "q2",
            "imageSource": { "kind": "somewhere" }
        }))
        .unwrap();
        assert!(question.image_spec().unwrap().image_source.is_preloaded());
    }

    #[test]
    fn test_redacted_source_drops_credentials() {
        let bucket = ImageSource::Bucket {
            url: "https://abc.supabase.co".to_string(),
            secret_key: "sk".to_string(),
            bucket_path: "images".to_string(),
        };
        let mut fields = Map::new();
        bucket.redacted().write_to(&mut fields);
        assert_eq!(fields["supabaseConfig"], json!({ "url": "https://abc.supabase.co" }));

        let dataset = ImageSource::Dataset {
            dataset_name: "d".to_string(),
            token: Some("hf".to_string()),
        };
        assert_eq!(
            dataset.redacted(),
            ImageSource::Dataset {
                dataset_name: "d".to_string(),
                token: None
            }
        );
    }

    #[test]
    fn test_zero_image_count_uses_default() {
        let mut spec = ImageSpec::new("q");
        spec.image_count = Some(0);
        assert_eq!(spec.effective_image_count(ImageKind::Ranking), 4);
        spec.image_count = Some(2);
        assert_eq!(spec.effective_image_count(ImageKind::Ranking), 2);
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let err = Question::from_value(json!({ "name": "q1" })).unwrap_err();
        assert!(err.to_string().contains("type"));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        assert!(Question::from_value(json!({ "type": "text" })).is_err());
        assert!(Question::from_value(json!({ "type": "imageboolean" })).is_err());
    }
}
