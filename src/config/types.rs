use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Lead time before a scheduled start during which a broadcast is created
    #[serde(with = "humantime_duration")]
    pub creation_distance: Duration,

    /// Region used to look up the platform's video categories
    #[serde(default = "default_region_code")]
    pub region_code: String,

    /// IANA zone the thumbnail timestamps are written in (default: system local)
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    pub queue: QueueConfig,

    #[serde(default)]
    pub template: TemplateSource,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub api: ApiEndpoints,
}

fn default_region_code() -> String {
    "US".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Level for the console and the log file
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Lowest level copied into the run summary mail
    #[serde(default = "default_mail_level")]
    pub mail_level: String,

    /// Directory for daily rotated log files (disabled when unset)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mail_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            mail_level: default_mail_level(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    /// Google Drive folders, addressed by folder id
    #[default]
    Drive,
    /// Local directories, addressed by path
    Local,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    #[serde(default)]
    pub backend: QueueBackend,

    /// Location holding pending thumbnails
    pub queue: String,

    /// Location thumbnails are moved to once their broadcast exists
    pub done: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateSource {
    /// Name of the template document in the asset source
    #[serde(default)]
    pub document: Option<String>,

    /// Local template file, takes precedence over `document`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for TemplateSource {
    fn default() -> Self {
        Self {
            document: Some("defaults.json".to_string()),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// OAuth client secret downloaded from the Google Cloud console
    #[serde(default = "default_client_secret")]
    pub client_secret: PathBuf,

    /// File the access and refresh tokens are persisted in between runs
    #[serde(default = "default_token_store")]
    pub token_store: PathBuf,
}

fn default_client_secret() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_store() -> PathBuf {
    PathBuf::from("token.json")
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secret: default_client_secret(),
            token_store: default_token_store(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Recipient of the run summary
    #[serde(default)]
    pub to: String,

    #[serde(default = "default_mail_from")]
    pub from: String,

    #[serde(default = "default_mail_subject")]
    pub subject: String,
}

fn default_mail_from() -> String {
    "Livestream Scheduler".to_string()
}

fn default_mail_subject() -> String {
    "Summary of livestreamScheduler".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEndpoints {
    #[serde(default = "default_youtube")]
    pub youtube: String,

    #[serde(default = "default_youtube_upload")]
    pub youtube_upload: String,

    #[serde(default = "default_drive")]
    pub drive: String,

    #[serde(default = "default_gmail")]
    pub gmail: String,
}

fn default_youtube() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_youtube_upload() -> String {
    "https://www.googleapis.com/upload/youtube/v3".to_string()
}

fn default_drive() -> String {
    "https://www.googleapis.com/drive/v2".to_string()
}

fn default_gmail() -> String {
    "https://gmail.googleapis.com/gmail/v1".to_string()
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            youtube: default_youtube(),
            youtube_upload: default_youtube_upload(),
            drive: default_drive(),
            gmail: default_gmail(),
        }
    }
}

/// Durations written the way people write them: `48h`, `1day 12h`, `90m`.
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
