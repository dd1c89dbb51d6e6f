//! Renderer-ready document produced by materialization

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::survey::{DisplaySettings, Question, RuntimeTheme};

/// A materialized questionnaire
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeDocument {
    pub survey: RuntimeSurvey,
    /// Absent when the document carries no theme; the renderer default applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<RuntimeTheme>,
    /// Question name to the names of the images it displays
    pub displayed_images: BTreeMap<String, Vec<String>>,
}

impl RuntimeDocument {
    pub fn elements(&self) -> impl Iterator<Item = &RuntimeElement> {
        self.survey.pages.iter().flat_map(|page| page.elements.iter())
    }

    /// Question or panel sub-control carrying the given name
    pub fn find(&self, name: &str) -> Option<&RuntimeElement> {
        self.elements().find(|element| match element {
            RuntimeElement::Question(question) => question.name() == name,
            RuntimeElement::Panel(panel) => panel.control().is_some_and(|c| c.name() == name),
        })
    }

    pub fn panel(&self, question_name: &str) -> Option<&CompositePanel> {
        self.elements().find_map(|element| match element {
            RuntimeElement::Panel(panel) if panel.control().is_some_and(|c| c.name() == question_name) => {
                Some(panel)
            }
            _ => None,
        })
    }

    /// Names answers are keyed by, in document order
    pub fn answer_names(&self) -> Vec<&str> {
        self.elements()
            .filter_map(|element| match element {
                RuntimeElement::Question(question) => Some(question.name()),
                RuntimeElement::Panel(panel) => panel.control().map(PanelElement::name),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSurvey {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub logo: String,
    pub logo_position: String,
    #[serde(flatten)]
    pub settings: DisplaySettings,
    pub pages: Vec<RuntimePage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimePage {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub elements: Vec<RuntimeElement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuntimeElement {
    Question(Question),
    Panel(CompositePanel),
}

/// An image block grouped with the response control of an image question
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "panel")]
pub struct CompositePanel {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub state: String,
    pub elements: Vec<PanelElement>,
}

impl CompositePanel {
    /// The non-interactive image block
    pub fn image_block(&self) -> Option<&str> {
        self.elements.iter().find_map(|element| match element {
            PanelElement::Html { html, .. } => Some(html.as_str()),
            _ => None,
        })
    }

    /// The interactive sub-control
    pub fn control(&self) -> Option<&PanelElement> {
        self.elements.iter().find(|element| element.is_interactive())
    }

    pub fn interactive_count(&self) -> usize {
        self.elements.iter().filter(|element| element.is_interactive()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingChoice {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PanelElement {
    Html {
        name: String,
        html: String,
    },
    Boolean {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        is_required: bool,
        label_true: String,
        label_false: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value_true: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value_false: Option<Value>,
    },
    Rating {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        is_required: bool,
        rate_min: i64,
        rate_max: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        min_rate_description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_rate_description: Option<String>,
    },
    Matrix {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        is_required: bool,
        rows: Vec<Value>,
        columns: Vec<Value>,
    },
    Ranking {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        is_required: bool,
        choices: Vec<RankingChoice>,
    },
}

impl PanelElement {
    pub fn name(&self) -> &str {
        match self {
            PanelElement::Html { name, .. }
            | PanelElement::Boolean { name, .. }
            | PanelElement::Rating { name, .. }
            | PanelElement::Matrix { name, .. }
            | PanelElement::Ranking { name, .. } => name,
        }
    }

    pub fn is_interactive(&self) -> bool {
        !matches!(self, PanelElement::Html { .. })
    }

    pub fn is_required(&self) -> bool {
        match self {
            PanelElement::Html { .. } => false,
            PanelElement::Boolean { is_required, .. }
            | PanelElement::Rating { is_required, .. }
            | PanelElement::Matrix { is_required, .. }
            | PanelElement::Ranking { is_required, .. } => *is_required,
        }
    }
}
