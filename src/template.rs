//! Broadcast template.
//!
//! Default metadata for every broadcast, read once per run from a JSON
//! document (`defaults.json`):
//!
//! ```json
//! {
//!   "title": "Livestream TITLE_DATE",
//!   "description": "Recorded on TITLE_DATE",
//!   "category": "Nonprofits & Activism",
//!   "playlist_ids": ["PL123"],
//!   "privacy_status": "unlisted"
//! }
//! ```
//!
//! `TITLE_DATE` is replaced by the scheduled date, e.g. `01. March 2025`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use livestream_common::{Error, PrivacyStatus};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::TemplateSource;
use crate::remote::AssetSource;

/// Placeholder substituted with the scheduled date.
pub const DATE_PLACEHOLDER: &str = "TITLE_DATE";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Template {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Human readable category label, resolved to an id at startup
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub playlist_ids: Vec<String>,

    /// Privacy applied once the broadcast is fully set up
    #[serde(default)]
    pub privacy_status: PrivacyStatus,

    /// Document uploaded as thumbnail when the queued image cannot be
    /// downloaded
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// `DD. <Month> YYYY`, the form substituted for [`DATE_PLACEHOLDER`].
pub fn format_schedule_date(date: NaiveDate) -> String {
    date.format("%d. %B %Y").to_string()
}

impl Template {
    pub fn from_json(content: &[u8]) -> livestream_common::Result<Self> {
        Ok(serde_json::from_slice(content)?)
    }

    /// Title of a broadcast: the title from the asset name when present,
    /// otherwise the template title for the scheduled date.
    pub fn title_for(&self, parsed_title: Option<&str>, date: NaiveDate) -> String {
        match parsed_title {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => substitute_date(&self.title, date),
        }
    }

    pub fn description_for(&self, date: NaiveDate) -> String {
        substitute_date(&self.description, date)
    }
}

fn substitute_date(pattern: &str, date: NaiveDate) -> String {
    pattern.replace(DATE_PLACEHOLDER, &format_schedule_date(date))
}

/// Load the template from a local file or from the asset source.
///
/// A missing or malformed template is fatal for the run.
pub async fn load_template(source: &TemplateSource, assets: &dyn AssetSource) -> Result<Template> {
    if let Some(path) = &source.path {
        return load_template_file(path);
    }

    let name = source
        .document
        .as_deref()
        .context("No template document or path configured")?;

    let document = assets
        .find_document(name)
        .await
        .with_context(|| format!("Failed to look up template {:?}", name))?
        .ok_or_else(|| Error::not_found(name.to_string()))
        .with_context(|| format!("Can't find template {:?}", name))?;

    let content = assets
        .download(&document.id)
        .await
        .with_context(|| format!("Can't download template {:?}", name))?;

    let template = Template::from_json(&content)
        .with_context(|| format!("Failed to parse template {:?}", name))?;

    tracing::debug!("Loaded template {:?}: {:?}", name, template);
    Ok(template)
}

fn load_template_file(path: &Path) -> Result<Template> {
    let content =
        std::fs::read(path).with_context(|| format!("Failed to read template: {:?}", path))?;
    Template::from_json(&content).with_context(|| format!("Failed to parse template: {:?}", path))
}
