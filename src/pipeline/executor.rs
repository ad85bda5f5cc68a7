use bytes::Bytes;
use livestream_common::paths::image_mime_type;
use livestream_common::{BroadcastId, PrivacyStatus};
use tracing::{error, info, warn};

use crate::eligibility::DueAsset;
use crate::remote::{MetadataUpdate, RemoteError};
use crate::run::RunContext;
use crate::template::Template;

use super::outcome::{Outcome, Step};

/// Broadcasts are created as drafts and only get their final privacy once
/// the metadata is written.
const DRAFT_PRIVACY: PrivacyStatus = PrivacyStatus::Private;

/// Work on one due asset, owned by exactly one task.
pub struct ProvisioningTask<'a> {
    due: DueAsset,
    template: &'a Template,
    title: String,
    description: String,
    broadcast_id: Option<BroadcastId>,
}

impl<'a> ProvisioningTask<'a> {
    pub fn new(due: DueAsset, template: &'a Template) -> Self {
        let date = due.scheduled.date_naive();
        let title = template.title_for(due.parsed.title.as_deref(), date);
        let description = template.description_for(date);

        Self {
            due,
            template,
            title,
            description,
            broadcast_id: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn asset_name(&self) -> &str {
        &self.due.asset.name
    }

    /// Run every step in order.
    ///
    /// Only a failed create ends the task early. Once the broadcast exists
    /// the asset is always moved out of the queue so a later run cannot
    /// create it again.
    pub async fn run(mut self, ctx: &RunContext) -> Outcome {
        if ctx.dry_run {
            return self.plan();
        }

        let mut outcome = Outcome::new(self.due.asset.id.clone(), self.asset_name());

        let result = self.create(ctx).await;
        self.log_step(Step::Created, &result);
        outcome.record(Step::Created, result.map_err(|e| e.to_string()));
        let Some(broadcast_id) = self.broadcast_id.clone() else {
            return outcome;
        };
        outcome.broadcast_id = Some(broadcast_id.clone());

        let result = self.set_thumbnail(ctx, &broadcast_id).await;
        self.log_step(Step::ThumbnailSet, &result);
        outcome.record(Step::ThumbnailSet, result.map_err(|e| e.to_string()));

        let result = self.set_metadata(ctx, &broadcast_id).await;
        self.log_step(Step::MetadataSet, &result);
        outcome.record(Step::MetadataSet, result.map_err(|e| e.to_string()));

        let result = self.link_playlists(ctx, &broadcast_id).await;
        self.log_step(Step::PlaylistLinked, &result);
        outcome.record(Step::PlaylistLinked, result);

        let result = ctx
            .assets
            .relocate(&self.due.asset.id, &ctx.locations.queue, &ctx.locations.done)
            .await;
        self.log_step(Step::Relocated, &result);
        outcome.record(Step::Relocated, result.map_err(|e| e.to_string()));

        outcome
    }

    fn plan(self) -> Outcome {
        info!(
            asset = %self.asset_name(),
            start = %self.due.scheduled.to_rfc3339(),
            title = %self.title,
            description = %self.description,
            playlists = self.template.playlist_ids.len(),
            "[DRY RUN] Would create broadcast"
        );
        Outcome::planned(self.due.asset.id.clone(), self.asset_name())
    }

    fn log_step<E: std::fmt::Display>(&self, step: Step, result: &Result<(), E>) {
        match (step, result) {
            (_, Ok(())) => info!(asset = %self.asset_name(), %step, "Step done"),
            // Creation and relocation failures leave work for a person
            (Step::Created | Step::Relocated, Err(e)) => {
                error!(asset = %self.asset_name(), %step, "Step failed: {}", e)
            }
            (_, Err(e)) => warn!(asset = %self.asset_name(), %step, "Step failed: {}", e),
        }
    }

    async fn create(&mut self, ctx: &RunContext) -> Result<(), RemoteError> {
        let id = ctx
            .broadcasts
            .create_broadcast(&self.title, &self.due.scheduled, DRAFT_PRIVACY)
            .await?;
        info!(asset = %self.asset_name(), broadcast = %id, "Created broadcast {:?}", self.title);
        self.broadcast_id = Some(id);
        Ok(())
    }

    async fn set_thumbnail(&self, ctx: &RunContext, id: &BroadcastId) -> Result<(), RemoteError> {
        let (content, mime) = self.thumbnail(ctx).await?;
        ctx.broadcasts.set_thumbnail(id, content, mime).await
    }

    /// Bytes of the queued image, or of the template's fallback thumbnail
    /// when the image can't be downloaded.
    async fn thumbnail(&self, ctx: &RunContext) -> Result<(Bytes, &'static str), RemoteError> {
        let asset = &self.due.asset;
        let err = match ctx.assets.download(&asset.id).await {
            Ok(content) => return Ok((content, mime_for(&asset.name)?)),
            Err(e) => e,
        };

        let Some(fallback) = &self.template.thumbnail else {
            return Err(err);
        };
        warn!(
            asset = %asset.name,
            "Can't download thumbnail ({}), using {:?}", err, fallback
        );

        let document = ctx.assets.find_document(fallback).await?.ok_or_else(|| {
            livestream_common::Error::not_found(format!("fallback thumbnail {:?}", fallback))
        })?;
        let content = ctx.assets.download(&document.id).await?;
        Ok((content, mime_for(&document.name)?))
    }

    async fn set_metadata(&self, ctx: &RunContext, id: &BroadcastId) -> Result<(), RemoteError> {
        let update = MetadataUpdate {
            title: &self.title,
            description: &self.description,
            category_id: &ctx.category_id,
            privacy: self.template.privacy_status,
        };
        ctx.broadcasts.update_metadata(id, &update).await
    }

    /// Insert into every playlist; the step fails if any insert failed.
    async fn link_playlists(&self, ctx: &RunContext, id: &BroadcastId) -> Result<(), String> {
        let mut failed = Vec::new();

        for playlist in &self.template.playlist_ids {
            if let Err(e) = ctx.broadcasts.add_to_playlist(playlist, id).await {
                warn!(asset = %self.asset_name(), %playlist, "Can't add broadcast to playlist: {}", e);
                failed.push(format!("{}: {}", playlist, e));
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "{} of {} playlists failed: {}",
                failed.len(),
                self.template.playlist_ids.len(),
                failed.join("; ")
            ))
        }
    }
}

fn mime_for(name: &str) -> Result<&'static str, RemoteError> {
    image_mime_type(name).ok_or_else(|| {
        livestream_common::Error::invalid_input(format!("{:?} is not a jpg or png image", name))
            .into()
    })
}
