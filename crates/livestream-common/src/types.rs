//! Core type definitions shared by the template and the platform clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visibility of a broadcast on the video platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    /// Only visible to the channel owner. Used while a broadcast is being set up.
    Private,
    /// Reachable by link, not listed on the channel.
    #[default]
    Unlisted,
    /// Visible to everyone.
    Public,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Unlisted => "unlisted",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "unlisted" => Ok(Self::Unlisted),
            "public" => Ok(Self::Public),
            other => Err(format!("Unknown privacy status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_status_round_trips_through_str() {
        for status in [
            PrivacyStatus::Private,
            PrivacyStatus::Unlisted,
            PrivacyStatus::Public,
        ] {
            assert_eq!(status.as_str().parse::<PrivacyStatus>(), Ok(status));
        }
        assert!("hidden".parse::<PrivacyStatus>().is_err());
    }

    #[test]
    fn test_privacy_status_serde_lowercase() {
        let json = serde_json::to_string(&PrivacyStatus::Public).unwrap();
        assert_eq!(json, "\"public\"");
    }
}
