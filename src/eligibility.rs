//! Eligibility filter.
//!
//! Decides which queued assets are due: an asset is provisioned when its
//! scheduled start lies strictly inside `(now, now + window)`. The whole batch
//! is judged against one `now`, sampled by the caller before the first asset.

use chrono::{DateTime, FixedOffset, Local, TimeDelta, Utc};
use livestream_naming::{ParsedName, NAME_FORMAT};
use tracing::debug;

use crate::remote::Asset;

/// Time zone the wall-clock times in asset names are written in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleZone {
    /// The zone of the machine running the scheduler.
    Local,
    Named(chrono_tz::Tz),
}

impl ScheduleZone {
    /// Resolve a parsed name to an absolute instant, keeping the zone offset.
    pub fn resolve(&self, parsed: &ParsedName) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Local => parsed.resolve(&Local).map(|dt| dt.fixed_offset()),
            Self::Named(tz) => parsed.resolve(tz).map(|dt| dt.fixed_offset()),
        }
    }
}

/// Where a scheduled instant falls relative to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    /// At or before `now`.
    PastDue,
    /// At or beyond `now + window`.
    TooFar,
}

/// Classify `scheduled` against the window starting at `now`.
///
/// Both bounds are exclusive.
pub fn classify(scheduled: DateTime<Utc>, now: DateTime<Utc>, window: TimeDelta) -> Verdict {
    let until_live = scheduled - now;
    if until_live <= TimeDelta::zero() {
        Verdict::PastDue
    } else if until_live >= window {
        Verdict::TooFar
    } else {
        Verdict::Eligible
    }
}

/// `0 < scheduled - now < window`
pub fn eligible(scheduled: DateTime<Utc>, now: DateTime<Utc>, window: TimeDelta) -> bool {
    classify(scheduled, now, window) == Verdict::Eligible
}

/// An asset whose broadcast should be created in this run.
#[derive(Debug, Clone)]
pub struct DueAsset {
    pub asset: Asset,
    pub parsed: ParsedName,
    pub scheduled: DateTime<FixedOffset>,
}

/// Select the due assets of a batch.
///
/// Names outside the grammar, impossible dates and instants outside the
/// window are skipped with a debug log; none of them is an error.
pub fn select_due(
    assets: Vec<Asset>,
    now: DateTime<Utc>,
    window: TimeDelta,
    zone: ScheduleZone,
) -> Vec<DueAsset> {
    let mut due = Vec::new();

    for asset in assets {
        let Some(parsed) = livestream_naming::parse(&asset.name) else {
            debug!(
                "skipping thumbnail {:?}, filename doesn't match {:?}",
                asset.name, NAME_FORMAT
            );
            continue;
        };

        let Some(scheduled) = zone.resolve(&parsed) else {
            debug!(
                "skipping thumbnail {:?}, not a valid local date and time",
                asset.name
            );
            continue;
        };

        match classify(scheduled.with_timezone(&Utc), now, window) {
            Verdict::Eligible => due.push(DueAsset {
                asset,
                parsed,
                scheduled,
            }),
            Verdict::PastDue => {
                debug!(asset = %asset.name, %scheduled, "skipping thumbnail, start is in the past");
            }
            Verdict::TooFar => {
                debug!(asset = %asset.name, %scheduled, "skipping thumbnail, start is beyond the creation window");
            }
        }
    }

    due
}
