//! Run summary and the mail message carrying it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;

use crate::pipeline::{Outcome, Step};

/// Label/value pairs describing one asset, in display order.
pub type Block = Vec<(&'static str, String)>;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    blocks: Vec<Block>,
    log_lines: Vec<String>,
}

fn step_label(step: Step) -> &'static str {
    match step {
        Step::Created => "Created",
        Step::ThumbnailSet => "Thumbnail",
        Step::MetadataSet => "Metadata",
        Step::PlaylistLinked => "Playlists",
        Step::Relocated => "Relocated",
    }
}

/// The ordered fields reported for one outcome.
pub fn outcome_block(outcome: &Outcome) -> Block {
    let mut block = vec![
        ("Asset", outcome.asset_name.clone()),
        (
            "Broadcast",
            outcome
                .broadcast_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Status", outcome.status().to_string()),
    ];

    if let Some(reason) = &outcome.aborted {
        block.push(("Error", reason.clone()));
        return block;
    }
    if outcome.dry_run {
        return block;
    }

    for step in Step::ALL {
        let value = match outcome.result_of(step) {
            Some(Ok(())) => "ok".to_string(),
            Some(Err(e)) => format!("failed: {}", e),
            None => "not run".to_string(),
        };
        block.push((step_label(step), value));
    }
    block
}

impl Summary {
    /// Summarize a run; `None` when there is nothing to tell.
    pub fn build(outcomes: &[Outcome], log_lines: Vec<String>) -> Option<Self> {
        if outcomes.is_empty() && log_lines.is_empty() {
            return None;
        }

        Some(Self {
            blocks: outcomes.iter().map(outcome_block).collect(),
            log_lines,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        for block in &self.blocks {
            for (label, value) in block {
                out.push_str(label);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
            out.push('\n');
        }

        if !self.log_lines.is_empty() {
            out.push_str("Log:\n");
            for line in &self.log_lines {
                out.push_str(line);
                out.push('\n');
            }
        }

        out
    }
}

/// A plain text RFC 5322 message.
#[derive(Debug, Clone)]
pub struct MailMessage<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub date: DateTime<FixedOffset>,
    pub body: &'a str,
}

/// RFC 2047 encoded word for header values that are not plain ASCII.
fn encode_header(value: &str) -> Cow<'_, str> {
    if value.is_ascii() {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("=?UTF-8?B?{}?=", STANDARD.encode(value)))
    }
}

impl MailMessage<'_> {
    /// Headers and body; headers with empty values are left out.
    pub fn to_rfc5322(&self) -> String {
        let date = self.date.to_rfc2822();
        let headers = [
            ("From", encode_header(self.from)),
            ("Date", Cow::Borrowed(date.as_str())),
            ("To", Cow::Borrowed(self.to)),
            ("Subject", encode_header(self.subject)),
            ("MIME-Version", Cow::Borrowed("1.0")),
            ("Content-Type", Cow::Borrowed("text/plain; charset=\"UTF-8\"")),
        ];

        let mut message = String::new();
        for (name, value) in headers {
            if value.is_empty() {
                continue;
            }
            message.push_str(name);
            message.push_str(": ");
            message.push_str(&value);
            message.push_str("\r\n");
        }
        message.push_str("\r\n");
        message.push_str(self.body);
        message
    }
}
