//! Livestream-Common: Shared types, identifiers, and utilities.
//!
//! This crate provides common functionality used across livestream-scheduler:
//!
//! - **Typed IDs**: String wrappers for queue assets and remote broadcasts
//! - **Core Types**: Privacy status of a broadcast
//! - **Path Utilities**: Functions to detect queue images by extension
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use livestream_common::{AssetId, PrivacyStatus, Error, Result};
//! use livestream_common::paths::is_queue_image;
//!
//! let asset = AssetId::new("1AbC");
//! assert_eq!(asset.as_str(), "1AbC");
//!
//! assert_eq!(PrivacyStatus::default(), PrivacyStatus::Unlisted);
//! assert!(is_queue_image("2025-03-01.18-00-00.jpg"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("defaults.json"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
