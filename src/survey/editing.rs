//! Structural edits on a document's pages

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use super::document::{Page, SurveyDocument};

static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(\d+)$").expect("valid regex"));

/// Increment a trailing `_<n>` or append `_1`
///
/// A suffix that cannot be incremented is treated as part of the name.
pub fn next_copy_name(name: &str) -> String {
    if let Some(captures) = TRAILING_NUMBER.captures(name) {
        let next = captures[1]
            .parse::<u64>()
            .ok()
            .and_then(|number| number.checked_add(1));
        if let Some(next) = next {
            let stem = &name[..captures.get(0).map_or(name.len(), |m| m.start())];
            return format!("{}_{}", stem, next);
        }
    }
    format!("{}_1", name)
}

impl SurveyDocument {
    /// Append an empty page and return its index
    pub fn add_page(&mut self) -> usize {
        let page = Page {
            name: format!("page_{}", chrono::Utc::now().timestamp_millis()),
            title: Some("New Page".to_string()),
            description: Some("Page description".to_string()),
            ..Default::default()
        };
        self.pages.push(page);
        self.pages.len() - 1
    }

    pub fn delete_page(&mut self, index: usize) -> Result<Page> {
        if index >= self.pages.len() {
            bail!("Page index {} out of range ({} pages)", index, self.pages.len());
        }
        Ok(self.pages.remove(index))
    }

    /// Move a page to a new position, shifting the pages in between
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<()> {
        let count = self.pages.len();
        if from >= count || to >= count {
            bail!("Cannot move page {} to {} ({} pages)", from, to, count);
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        Ok(())
    }

    /// Insert a copy of a page right after it, renaming the page, its title
    /// and every question on it
    pub fn duplicate_page(&mut self, index: usize) -> Result<usize> {
        let Some(original) = self.pages.get(index) else {
            bail!("Page index {} out of range ({} pages)", index, self.pages.len());
        };

        let mut copy = original.clone();
        copy.name = next_copy_name(&original.name);
        let title = original
            .title
            .clone()
            .unwrap_or_else(|| format!("Page {}", index + 1));
        copy.title = Some(next_copy_name(&title));

        for question in &mut copy.elements {
            let renamed = next_copy_name(question.name());
            question.set_name(renamed);
        }

        self.pages.insert(index + 1, copy);
        Ok(index + 1)
    }
}
