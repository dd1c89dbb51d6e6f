//! Image markup and composite panel substitution

use once_cell::sync::Lazy;
use regex::Regex;

use super::runtime::{CompositePanel, PanelElement, RankingChoice};
use crate::images::NamedImage;
use crate::survey::Question;

pub const PANEL_TITLE: &str = "See below images:";
pub const PANEL_STATE: &str = "expanded";

const DEFAULT_LABEL_TRUE: &str = "Yes";
const DEFAULT_LABEL_FALSE: &str = "No";
const DEFAULT_RATE_MIN: i64 = 1;
const DEFAULT_RATE_MAX: i64 = 5;

static IMAGE_NAME_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-image-name="([^"]+)""#).expect("image name pattern is valid")
});

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape_attribute(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Inline block showing every image, each tagged with its name
pub fn image_block_html(images: &[NamedImage]) -> String {
    let mut html =
        String::from(r#"<div style="display: flex; flex-wrap: wrap; gap: 10px; margin: 10px 0;">"#);
    for image in images {
        html.push_str(&format!(
            r#"<img src="{}" data-image-name="{}" style="max-width: 300px; height: auto; border-radius: 4px;" />"#,
            escape_attribute(&image.url),
            escape_attribute(&image.name)
        ));
    }
    html.push_str("</div>");
    html
}

/// Image names embedded in markup, in document order
pub fn scan_image_names(html: &str) -> Vec<String> {
    IMAGE_NAME_ATTR
        .captures_iter(html)
        .map(|captures| unescape_attribute(&captures[1]))
        .collect()
}

/// Names of the images a question displays
///
/// Explicit `imageNames` win, then names embedded in `imageHtml`, then picker
/// choice names, then the single name of a display question.
pub fn tracked_image_names(question: &Question) -> Option<Vec<String>> {
    let spec = question.image_spec()?;

    if let Some(names) = spec.image_names.as_ref().filter(|names| !names.is_empty()) {
        return Some(names.clone());
    }

    if let Some(html) = &spec.image_html {
        let names = scan_image_names(html);
        if !names.is_empty() {
            return Some(names);
        }
    }

    match question {
        Question::ImagePicker(picker) => {
            let names: Vec<String> = picker
                .choices
                .iter()
                .filter_map(|choice| choice.image_name.clone())
                .collect();
            (!names.is_empty()).then_some(names)
        }
        Question::Image(display) => display.image_name.clone().map(|name| vec![name]),
        _ => None,
    }
}

/// Composite panel for an image question whose images are embedded as markup
///
/// The response control keeps the question's name so answers join back to the
/// displayed-images record.
pub fn composite_panel(question: &Question) -> Option<CompositePanel> {
    let spec = question.image_spec()?;
    let html = spec.image_html.clone()?;

    let name = spec.name.clone();
    let title = spec.title.clone();
    let is_required = spec.is_required;

    let control = match question {
        Question::ImageBoolean(q) => PanelElement::Boolean {
            name,
            title,
            is_required,
            label_true: q
                .label_true
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL_TRUE.to_string()),
            label_false: q
                .label_false
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL_FALSE.to_string()),
            value_true: q.value_true.clone(),
            value_false: q.value_false.clone(),
        },
        Question::ImageRating(q) => PanelElement::Rating {
            name,
            title,
            is_required,
            rate_min: q.rate_min.unwrap_or(DEFAULT_RATE_MIN),
            rate_max: q.rate_max.unwrap_or(DEFAULT_RATE_MAX),
            min_rate_description: q.min_rate_description.clone(),
            max_rate_description: q.max_rate_description.clone(),
        },
        Question::ImageMatrix(q) => PanelElement::Matrix {
            name,
            title,
            is_required,
            rows: q.rows.clone(),
            columns: q.columns.clone(),
        },
        Question::ImageRanking(_) => {
            let names = tracked_image_names(question).unwrap_or_default();
            PanelElement::Ranking {
                name,
                title,
                is_required,
                choices: names
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| RankingChoice {
                        value,
                        text: format!("Image {}", index + 1),
                    })
                    .collect(),
            }
        }
        _ => return None,
    };

    Some(CompositePanel {
        name: format!("{}_panel", spec.name),
        title: PANEL_TITLE.to_string(),
        description: spec.description.clone(),
        state: PANEL_STATE.to_string(),
        elements: vec![
            PanelElement::Html {
                name: format!("{}_images", spec.name),
                html,
            },
            control,
        ],
    })
}
