//! Fan-out of provisioning tasks: one spawned task per due asset, all joined
//! before the run reports.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error};

use crate::eligibility::DueAsset;
use crate::pipeline::{Outcome, ProvisioningTask};
use crate::run::RunContext;

/// Provision every due asset concurrently and wait for all of them.
///
/// Outcomes come back in the order of `due`. A task that panics yields an
/// aborted outcome for its asset instead of failing the run.
pub async fn fan_out(ctx: Arc<RunContext>, due: Vec<DueAsset>) -> Vec<Outcome> {
    if due.is_empty() {
        return Vec::new();
    }

    debug!("Spawning {} provisioning tasks", due.len());

    let mut assets = Vec::with_capacity(due.len());
    let mut handles = Vec::with_capacity(due.len());
    for item in due {
        assets.push((item.asset.id.clone(), item.asset.name.clone()));

        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(async move {
            ProvisioningTask::new(item, &ctx.template).run(&ctx).await
        }));
    }

    join_all(handles)
        .await
        .into_iter()
        .zip(assets)
        .map(|(joined, (id, name))| match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(asset = %name, "Provisioning task did not finish: {}", e);
                Outcome::aborted(id, name, e.to_string())
            }
        })
        .collect()
}
