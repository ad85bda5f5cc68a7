use livestream_common::{AssetId, BroadcastId};
use std::fmt;

/// Provisioning steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Created,
    ThumbnailSet,
    MetadataSet,
    PlaylistLinked,
    Relocated,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Created,
        Step::ThumbnailSet,
        Step::MetadataSet,
        Step::PlaylistLinked,
        Step::Relocated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Created => "created",
            Step::ThumbnailSet => "thumbnail",
            Step::MetadataSet => "metadata",
            Step::PlaylistLinked => "playlists",
            Step::Relocated => "relocated",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step: Step,
    pub result: Result<(), String>,
}

/// What happened to one asset during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub asset_id: AssetId,
    pub asset_name: String,
    pub broadcast_id: Option<BroadcastId>,
    pub steps: Vec<StepRecord>,
    /// Set when the run was a dry run and nothing was changed
    pub dry_run: bool,
    /// Set when the task ended without reporting its steps
    pub aborted: Option<String>,
}

impl Outcome {
    pub fn new(asset_id: AssetId, asset_name: impl Into<String>) -> Self {
        Self {
            asset_id,
            asset_name: asset_name.into(),
            broadcast_id: None,
            steps: Vec::new(),
            dry_run: false,
            aborted: None,
        }
    }

    /// Outcome of a dry run: the asset is due but nothing was touched.
    pub fn planned(asset_id: AssetId, asset_name: impl Into<String>) -> Self {
        Self {
            dry_run: true,
            ..Self::new(asset_id, asset_name)
        }
    }

    /// Outcome of a task that never returned, e.g. because it panicked.
    pub fn aborted(asset_id: AssetId, asset_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            aborted: Some(reason.into()),
            ..Self::new(asset_id, asset_name)
        }
    }

    pub fn record(&mut self, step: Step, result: Result<(), String>) {
        self.steps.push(StepRecord { step, result });
    }

    /// Result of a step, `None` if it did not run.
    pub fn result_of(&self, step: Step) -> Option<&Result<(), String>> {
        self.steps.iter().find(|r| r.step == step).map(|r| &r.result)
    }

    /// True if the step ran and succeeded.
    pub fn reached(&self, step: Step) -> bool {
        matches!(self.result_of(step), Some(Ok(())))
    }

    /// First step that failed.
    pub fn failed_at(&self) -> Option<Step> {
        self.steps
            .iter()
            .find(|r| r.result.is_err())
            .map(|r| r.step)
    }

    /// The broadcast was not created, so nothing exists remotely.
    pub fn is_failed(&self) -> bool {
        !self.dry_run && (self.aborted.is_some() || !self.reached(Step::Created))
    }

    pub fn status(&self) -> &'static str {
        if self.dry_run {
            "planned (dry run)"
        } else if self.is_failed() {
            "failed"
        } else if self.failed_at().is_some() {
            "completed with errors"
        } else {
            "completed"
        }
    }
}
