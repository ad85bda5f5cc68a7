//! Logging setup.
//!
//! Three sinks share one `tracing` registry:
//! - the console (`fmt`, filtered by `RUST_LOG` or the configured level)
//! - an optional daily rotated file under `logging.dir`
//! - the mail log, which keeps every event at or above `logging.mail_level`
//!   for the run summary

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "livestream-scheduler.log";

/// Log lines collected for the summary mail.
#[derive(Debug, Clone, Default)]
pub struct MailLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MailLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: String) {
        self.lines.lock().push(line);
    }

    /// Drain the collected lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

/// Layer appending each event to a [`MailLog`].
pub struct MailLogLayer {
    log: MailLog,
}

impl MailLogLayer {
    pub fn new(log: MailLog) -> Self {
        Self { log }
    }
}

impl<S> Layer<S> for MailLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let mut line = format!("{:>5} {}", event.metadata().level().as_str(), visitor.message);
        if !visitor.fields.is_empty() {
            let _ = write!(line, " {}", visitor.fields);
        }
        self.log.push(line);
    }
}

/// Renders the message followed by the remaining fields as `key=value`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}

/// Keeps the file writer flushing until the end of the run.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

fn parse_level(raw: &str) -> Result<Level> {
    Level::from_str(raw).map_err(|_| anyhow::anyhow!("Invalid log level {:?}", raw))
}

fn console_filter(level: Level, verbose: bool) -> EnvFilter {
    // RUST_LOG wins over the config file
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { Level::DEBUG.max(level) } else { level };
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!(
            "livestream_scheduler={level},livestream_naming={level},livestream_common={level},warn"
        ))
    })
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig, verbose: bool, mail_log: MailLog) -> Result<LoggingGuard> {
    let level = parse_level(&config.level)?;
    let mail_level = parse_level(&config.mail_level)?;

    let (file_layer, file_guard) = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {:?}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(console_filter(level, verbose));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter(level, verbose)))
        .with(file_layer)
        .with(MailLogLayer::new(mail_log).with_filter(LevelFilter::from_level(mail_level)))
        .try_init()
        .context("Failed to install the log subscriber")?;

    Ok(LoggingGuard { _file: file_guard })
}
