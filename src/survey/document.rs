//! Survey documents in the authoring schema

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::project::PreloadedImage;
use super::question::Question;
use super::theme::ThemeTokens;

/// Reasons a stored document is rejected at load time
#[derive(Debug)]
pub enum DocumentError {
    /// The JSON does not have the shape of a survey document
    Shape(serde_json::Error),
    EmptyPageName { index: usize },
    EmptyQuestionName { page: String, index: usize },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Shape(err) => write!(f, "malformed survey document: {}", err),
            DocumentError::EmptyPageName { index } => {
                write!(f, "page at position {} has an empty name", index)
            }
            DocumentError::EmptyQuestionName { page, index } => write!(
                f,
                "question at position {} on page '{}' has an empty name",
                index, page
            ),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Shape(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Shape(err)
    }
}

/// Display flags handed to the renderer at the document root
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_question_numbers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_progress_bar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_bar_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_grow_comment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_preview_before_complete: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub elements: Vec<Question>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn question(&self, name: &str) -> Option<&Question> {
        self.elements.iter().find(|q| q.name() == name)
    }
}

/// A questionnaire as authored
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_position: Option<String>,
    #[serde(flatten)]
    pub settings: DisplaySettings,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeTokens>,
    /// Document-level image pool, consulted after the project's pool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preloaded_images: Vec<PreloadedImage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SurveyDocument {
    /// Parse and validate a stored document
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let document: SurveyDocument = serde_json::from_value(value)?;
        document.validate()?;
        Ok(document)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    fn validate(&self) -> Result<(), DocumentError> {
        for (index, page) in self.pages.iter().enumerate() {
            if page.name.trim().is_empty() {
                return Err(DocumentError::EmptyPageName { index });
            }
            for (q_index, question) in page.elements.iter().enumerate() {
                if question.name().trim().is_empty() {
                    return Err(DocumentError::EmptyQuestionName {
                        page: page.name.clone(),
                        index: q_index,
                    });
                }
            }
        }
        Ok(())
    }

    /// The document every new project starts from
    pub fn starter() -> Self {
        Self {
            title: "Urban Streetscape Perception Survey".to_string(),
            description: Some(
                "This survey helps us understand how people perceive different street environments."
                    .to_string(),
            ),
            logo: Some(String::new()),
            logo_position: Some("right".to_string()),
            settings: DisplaySettings {
                show_question_numbers: Some("off".to_string()),
                show_progress_bar: Some("aboveheader".to_string()),
                progress_bar_type: Some("questions".to_string()),
                auto_grow_comment: Some(true),
                show_preview_before_complete: Some("showAllQuestions".to_string()),
            },
            pages: vec![Page {
                name: "demographics".to_string(),
                title: Some("Part 1: Background Information (Optional)".to_string()),
                description: Some(
                    "Please tell us a bit about yourself. All questions are optional and can be skipped."
                        .to_string(),
                ),
                elements: Vec::new(),
                extra: Map::new(),
            }],
            theme: Some(ThemeTokens::standard()),
            preloaded_images: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.pages.iter().flat_map(|page| page.elements.iter())
    }

    pub fn question(&self, name: &str) -> Option<&Question> {
        self.questions().find(|q| q.name() == name)
    }

    pub fn question_count(&self) -> usize {
        self.pages.iter().map(|page| page.elements.len()).sum()
    }

    /// Page and question names used more than once
    ///
    /// Names double as persistence keys, but edits are not rejected for reusing
    /// them; callers surface this report instead.
    pub fn name_collisions(&self) -> NameCollisions {
        let mut pages: BTreeMap<&str, usize> = BTreeMap::new();
        let mut questions: BTreeMap<&str, usize> = BTreeMap::new();

        for page in &self.pages {
            *pages.entry(page.name.as_str()).or_default() += 1;
            for question in &page.elements {
                *questions.entry(question.name()).or_default() += 1;
            }
        }

        let repeated = |counts: BTreeMap<&str, usize>| -> Vec<String> {
            counts
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(name, _)| name.to_string())
                .collect()
        };

        NameCollisions {
            pages: repeated(pages),
            questions: repeated(questions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NameCollisions {
    pub pages: Vec<String>,
    pub questions: Vec<String>,
}

impl NameCollisions {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.questions.is_empty()
    }
}

impl fmt::Display for NameCollisions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.pages.is_empty() {
            parts.push(format!("pages [{}]", self.pages.join(", ")));
        }
        if !self.questions.is_empty() {
            parts.push(format!("questions [{}]", self.questions.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "title": "Streets",
            "showQuestionNumbers": "off",
            "autoGrowComment": true,
            "completedHtml": "<h3>Thanks</h3>",
            "pages": [{
                "name": "p1",
                "title": "Page one",
                "elements": [
                    { "type": "text", "name": "age" },
                    { "type": "imagerating", "name": "street1", "randomImageSelection": true }
                ]
            }],
            "theme": { "primaryColor": "#000000" }
        })
    }

    #[test]
    fn test_parse_keeps_unknown_root_fields() {
        let document = SurveyDocument::from_value(sample()).unwrap();

        assert_eq!(document.title, "Streets");
        assert_eq!(document.settings.show_question_numbers.as_deref(), Some("off"));
        assert_eq!(document.settings.auto_grow_comment, Some(true));
        assert_eq!(document.extra.get("completedHtml"), Some(&json!("<h3>Thanks</h3>")));
        assert_eq!(document.question_count(), 2);
        assert!(document.question("street1").unwrap().image_kind().is_some());

        let back = serde_json::to_value(&document).unwrap();
        assert_eq!(SurveyDocument::from_value(back).unwrap(), document);
    }

    #[test]
    fn test_malformed_documents_fail_fast() {
        let bad_pages = json!({ "title": "x", "pages": {} });
        assert!(matches!(
            SurveyDocument::from_value(bad_pages),
            Err(DocumentError::Shape(_))
        ));

        let untyped = json!({ "pages": [{ "name": "p1", "elements": [{ "name": "q" }] }] });
        assert!(SurveyDocument::from_value(untyped).is_err());

        let blank = json!({ "pages": [{ "name": " ", "elements": [] }] });
        assert!(matches!(
            SurveyDocument::from_value(blank),
            Err(DocumentError::EmptyPageName { index: 0 })
        ));
    }

    #[test]
    fn test_name_collisions() {
        let mut document = SurveyDocument::from_value(sample()).unwrap();
        assert!(document.name_collisions().is_empty());

        let mut copy = document.pages[0].clone();
        copy.elements.truncate(1);
        document.pages.push(copy);

        let collisions = document.name_collisions();
        assert_eq!(collisions.pages, vec!["p1".to_string()]);
        assert_eq!(collisions.questions, vec!["age".to_string()]);
        assert_eq!(collisions.to_string(), "pages [p1]; questions [age]");
    }

    #[test]
    fn test_starter_document() {
        let document = SurveyDocument::starter();
        assert_eq!(document.pages.len(), 1);
        assert_eq!(document.pages[0].name, "demographics");
        assert_eq!(document.settings.show_progress_bar.as_deref(), Some("aboveheader"));
        assert_eq!(document.theme, Some(ThemeTokens::standard()));
    }
}
