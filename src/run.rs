//! One scheduling run, from credential to summary.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Config, QueueBackend};
use crate::credentials::{
    ClientSecret, ConsolePrompt, Credential, CredentialManager, OAuthClient, TokenStore, SCOPES,
};
use crate::eligibility::{self, ScheduleZone};
use crate::logging::MailLog;
use crate::notifications::{GmailChannel, NotificationManager};
use crate::pipeline::Outcome;
use crate::remote::{
    AssetSource, BroadcastClient, DriveSource, GoogleApi, LocalFolderSource, YoutubeClient,
};
use crate::scheduler;
use crate::template::{load_template, Template};

/// Category label to platform category id.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap(HashMap<String, String>);

impl CategoryMap {
    pub fn new(categories: HashMap<String, String>) -> Self {
        Self(categories)
    }

    /// Categories available in `region_code`.
    ///
    /// A failed lookup leaves the map empty so every label resolves to an
    /// empty id and the metadata step reports the problem per asset.
    pub async fn fetch(client: &dyn BroadcastClient, region_code: &str) -> Self {
        match client.list_categories(region_code).await {
            Ok(categories) => {
                debug!("Loaded {} video categories", categories.len());
                Self(categories)
            }
            Err(e) => {
                warn!("Failed to list video categories for {}: {}", region_code, e);
                Self::default()
            }
        }
    }

    /// Id for a label; unknown labels give an empty id.
    pub fn resolve(&self, label: &str) -> String {
        match self.0.get(label) {
            Some(id) => id.clone(),
            None => {
                warn!("Unknown video category {:?}, leaving it empty", label);
                String::new()
            }
        }
    }
}

/// Where pending assets are and where they go once provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueLocations {
    pub queue: String,
    pub done: String,
}

/// Everything the provisioning tasks share, immutable once built.
pub struct RunContext {
    pub template: Template,
    /// Category id resolved from the template's label
    pub category_id: String,
    pub assets: Arc<dyn AssetSource>,
    pub broadcasts: Arc<dyn BroadcastClient>,
    pub locations: QueueLocations,
    pub dry_run: bool,
}

impl RunContext {
    /// Fetch the category map, load the template and resolve its category.
    pub async fn prepare(
        config: &Config,
        assets: Arc<dyn AssetSource>,
        broadcasts: Arc<dyn BroadcastClient>,
        dry_run: bool,
    ) -> Result<Self> {
        let categories = CategoryMap::fetch(broadcasts.as_ref(), &config.region_code).await;
        let template = load_template(&config.template, assets.as_ref()).await?;
        let category_id = categories.resolve(&template.category);

        Ok(Self {
            template,
            category_id,
            assets,
            broadcasts,
            locations: QueueLocations {
                queue: config.queue.queue.clone(),
                done: config.queue.done.clone(),
            },
            dry_run,
        })
    }
}

/// List the queue, keep what is due at `now` and provision it.
///
/// Failing to list the queue is fatal; everything after is per asset.
pub async fn execute_at(
    ctx: Arc<RunContext>,
    now: DateTime<Utc>,
    window: TimeDelta,
    zone: ScheduleZone,
) -> Result<Vec<Outcome>> {
    let assets = ctx
        .assets
        .list(&ctx.locations.queue)
        .await
        .with_context(|| format!("Failed to list queue {:?}", ctx.locations.queue))?;
    debug!("Found {} images in the queue", assets.len());

    let due = eligibility::select_due(assets, now, window, zone);
    if due.is_empty() {
        info!("No thumbnails due within {}", humantime::format_duration(window.to_std()?));
        return Ok(Vec::new());
    }

    info!("{} thumbnails due", due.len());
    Ok(scheduler::fan_out(ctx, due).await)
}

/// Obtain a credential that is valid for the whole run.
pub async fn authorize(config: &Config) -> Result<Credential> {
    let secret = ClientSecret::from_file(&config.auth.client_secret)?;
    let manager = CredentialManager::new(
        TokenStore::new(&config.auth.token_store),
        OAuthClient::new(secret, SCOPES),
        Box::new(ConsolePrompt),
    );

    let credential = manager.acquire().await?;
    Ok(manager.ensure_valid(credential).await?)
}

fn asset_source(config: &Config, api: &GoogleApi) -> Arc<dyn AssetSource> {
    match config.queue.backend {
        QueueBackend::Drive => Arc::new(DriveSource::new(api.clone(), &config.api.drive)),
        QueueBackend::Local => Arc::new(LocalFolderSource::new(&config.queue.queue)),
    }
}

/// Run once against the configured services and mail the summary.
pub async fn run(config: &Config, dry_run: bool, mail_log: MailLog) -> Result<Vec<Outcome>> {
    let window = config.creation_window()?;
    let zone = config.schedule_zone()?;

    let credential = authorize(config).await?;
    let api = GoogleApi::new(credential.access_token.as_str());

    let assets = asset_source(config, &api);
    let broadcasts: Arc<dyn BroadcastClient> = Arc::new(YoutubeClient::new(
        api.clone(),
        &config.api.youtube,
        &config.api.youtube_upload,
    ));

    let ctx = Arc::new(RunContext::prepare(config, assets, broadcasts, dry_run).await?);
    let outcomes = execute_at(ctx, Utc::now(), window, zone).await?;

    let mut notifier = NotificationManager::new(config.mail.subject.as_str());
    if config.mail.enabled && !dry_run {
        notifier = notifier.with_channel(Box::new(GmailChannel::new(
            api,
            &config.api.gmail,
            &config.mail,
        )));
    }
    notifier.report(&outcomes, mail_log.take()).await;

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_is_empty() {
        let map = CategoryMap::new(HashMap::from([(
            "Music".to_string(),
            "10".to_string(),
        )]));
        assert_eq!(map.resolve("Music"), "10");
        assert_eq!(map.resolve("Cooking"), "");
    }
}
