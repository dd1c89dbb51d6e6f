//! Config transformation pipeline
//!
//! Turns an authored [`SurveyDocument`] into a [`RuntimeDocument`]: image
//! questions get their images drawn and recorded, composite kinds become
//! panels, and the theme is mapped onto the renderer's variables. Apart from
//! the images drawn, the result depends only on the input document.

pub mod panel;
pub mod resolve;
pub mod runtime;

pub use panel::{composite_panel, image_block_html, scan_image_names, tracked_image_names};
pub use resolve::{CandidateSource, ImagePools, resolve_candidates};
pub use runtime::{
    CompositePanel, PanelElement, RankingChoice, RuntimeDocument, RuntimeElement, RuntimePage,
    RuntimeSurvey,
};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::BTreeMap;

use crate::images::{ImageProvider, NamedImage, sample_without_replacement};
use crate::survey::question::DEFAULT_IMAGE_FIT;
use crate::survey::{ImageChoice, Project, Question, SurveyDocument};

const LEGACY_RANKING_HINT: &str = "Please select all images in your preferred order";

static LEGACY_RANKING_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\nPlease select all images in your preferred order.*$").expect("valid regex")
});

/// Materialize a document for one participant
pub async fn materialize<R: Rng + ?Sized>(
    document: &SurveyDocument,
    project: &Project,
    provider: &dyn ImageProvider,
    rng: &mut R,
) -> RuntimeDocument {
    let pools = ImagePools {
        project: project.image_dataset_config.pool(),
        document: &document.preloaded_images,
    };
    let mut displayed_images = BTreeMap::new();
    let mut pages = Vec::with_capacity(document.pages.len());

    for page in &document.pages {
        let mut elements = Vec::with_capacity(page.elements.len());

        for question in &page.elements {
            let mut question = question.clone();
            if question.image_kind().is_some() {
                normalize(&mut question);
                if question
                    .image_spec()
                    .is_some_and(|spec| spec.random_image_selection)
                {
                    draw_images(&mut question, pools, provider, rng).await;
                }
                if let Some(names) = tracked_image_names(&question) {
                    displayed_images.insert(question.name().to_string(), names);
                }
                // Participants never see source credentials
                if let Some(spec) = question.image_spec_mut() {
                    spec.image_source = spec.image_source.redacted();
                }
            }
            elements.push(substitute(question));
        }

        pages.push(RuntimePage {
            name: page.name.clone(),
            title: page.title.clone(),
            description: page.description.clone(),
            elements,
            extra: page.extra.clone(),
        });
    }

    info!(
        "Materialized '{}': {} pages, {} questions with images",
        document.title,
        pages.len(),
        displayed_images.len()
    );

    RuntimeDocument {
        survey: RuntimeSurvey {
            title: document.title.clone(),
            description: document.description.clone(),
            logo: document.logo.clone().unwrap_or_default(),
            logo_position: document
                .logo_position
                .clone()
                .unwrap_or_else(|| "right".to_string()),
            settings: document.settings.clone(),
            pages,
            extra: document.extra.clone(),
        },
        theme: document.theme.as_ref().map(|theme| theme.to_runtime()),
        displayed_images,
    }
}

/// Defaults applied to every image question before resolution
fn normalize(question: &mut Question) {
    if let Some(spec) = question.image_spec_mut() {
        if spec.image_fit.is_none() {
            spec.image_fit = Some(DEFAULT_IMAGE_FIT.to_string());
        }
    }

    if let Question::ImageRanking(ranking) = question {
        if let Some(description) = ranking.spec.description.take() {
            let cleaned = if description.contains(LEGACY_RANKING_HINT) {
                LEGACY_RANKING_SUFFIX
                    .replace(&description, "")
                    .trim()
                    .to_string()
            } else {
                description
            };
            ranking.spec.description = (!cleaned.is_empty()).then_some(cleaned);
        }
    }
}

/// Resolve, draw and record images for a question; failures leave it unresolved
async fn draw_images<R: Rng + ?Sized>(
    question: &mut Question,
    pools: ImagePools<'_>,
    provider: &dyn ImageProvider,
    rng: &mut R,
) {
    let (Some(kind), Some(spec)) = (question.image_kind(), question.image_spec()) else {
        return;
    };
    let name = spec.name.clone();
    let count = spec.effective_image_count(kind);

    let (source, candidates) = match resolve_candidates(spec, pools, provider).await {
        Ok(Some(resolved)) => resolved,
        Ok(None) => {
            warn!("No image source configured for question '{}'", name);
            return;
        }
        Err(err) => {
            warn!("Skipping images for question '{}': {:#}", name, err);
            return;
        }
    };

    let drawn = sample_without_replacement(&candidates, count, rng);
    if drawn.is_empty() {
        warn!("No images found in {} for question '{}'", source, name);
        return;
    }

    debug!(
        "Drew {} of {} images from {} for question '{}'",
        drawn.len(),
        candidates.len(),
        source,
        name
    );
    apply_images(question, &drawn);
}

/// Write drawn images into the question's type-specific fields
fn apply_images(question: &mut Question, images: &[NamedImage]) {
    let names: Vec<String> = images.iter().map(|image| image.name.clone()).collect();

    match question {
        Question::Plain(_) => return,
        Question::Image(display) => {
            if let Some(first) = images.first() {
                display.image_link = Some(first.url.clone());
                display.image_name = Some(first.name.clone());
            }
            display.image_links =
                (images.len() > 1).then(|| images.iter().map(|image| image.url.clone()).collect());
        }
        Question::ImagePicker(picker) => {
            picker.choices = images
                .iter()
                .enumerate()
                .map(|(index, image)| ImageChoice {
                    value: format!("image_{}", index),
                    image_link: image.url.clone(),
                    image_name: Some(image.name.clone()),
                    extra: Default::default(),
                })
                .collect();
        }
        Question::ImageRanking(_)
        | Question::ImageRating(_)
        | Question::ImageBoolean(_)
        | Question::ImageMatrix(_) => {
            if let Some(spec) = question.image_spec_mut() {
                spec.image_html = Some(image_block_html(images));
            }
        }
    }

    if let Some(spec) = question.image_spec_mut() {
        spec.image_names = Some(names);
        spec.image_fit = Some(DEFAULT_IMAGE_FIT.to_string());
    }
}

/// Replace composite kinds that carry image markup with their panel
fn substitute(question: Question) -> RuntimeElement {
    let Some(kind) = question.image_kind().filter(|kind| kind.is_composite()) else {
        return RuntimeElement::Question(question);
    };

    match composite_panel(&question) {
        Some(panel) => RuntimeElement::Panel(panel),
        None => {
            if question
                .image_spec()
                .is_some_and(|spec| spec.random_image_selection)
            {
                warn!(
                    "{} question '{}' has no image markup, leaving it unconverted",
                    kind.type_name(),
                    question.name()
                );
            }
            RuntimeElement::Question(question)
        }
    }
}
