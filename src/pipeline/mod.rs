//! Provisioning pipeline: turns one due asset into a configured broadcast.

pub mod executor;
pub mod outcome;

pub use executor::ProvisioningTask;
pub use outcome::{Outcome, Step, StepRecord};
