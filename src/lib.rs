//! Livestream scheduler: creates scheduled live broadcasts from time-stamped
//! thumbnails waiting in a queue folder.
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod credentials;
pub mod eligibility;
pub mod logging;
pub mod notifications;
pub mod pipeline;
pub mod remote;
pub mod run;
pub mod scheduler;
pub mod template;
