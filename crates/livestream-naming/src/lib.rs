//! # livestream-naming
//!
//! Parser for the names of queued livestream thumbnails.
//!
//! A queued image announces a livestream through its name:
//!
//! ```text
//! YYYY-MM-DD.hh-mm-ss[.Title].(jpg|png)
//! ```
//!
//! The date and time are local wall-clock values. The optional title
//! overrides the default title from the broadcast template.
//!
//! ## Quick Start
//!
//! ```
//! use livestream_naming::parse;
//!
//! let parsed = parse("2025-03-01.18-00-00.My Big Event.png").unwrap();
//! assert_eq!(parsed.year, 2025);
//! assert_eq!(parsed.hour, 18);
//! assert_eq!(parsed.title.as_deref(), Some("My Big Event"));
//!
//! assert!(parse("party.jpg").is_none());
//! ```

mod model;

pub use model::{ImageFormat, ParsedName};

use regex::Regex;
use std::sync::LazyLock;

/// The naming contract, ASCII digits only.
pub const NAME_PATTERN: &str = r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})\.(?P<hour>[0-9]{2})-(?P<minute>[0-9]{2})-(?P<second>[0-9]{2})(?:\.(?P<title>.+))?\.(?P<ext>jpg|png)$";

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NAME_PATTERN).expect("name pattern is a valid regex"));

/// Human readable form of the grammar, used in skip messages.
pub const NAME_FORMAT: &str = "YYYY-MM-DD.hh-mm-ss[.Title].(jpg|png)";

/// Parse a thumbnail name.
///
/// Returns `None` when the name does not follow the grammar. Only the digit
/// count of each component is checked here; see
/// [`ParsedName::naive_date_time`] for calendar validation.
///
/// # Examples
///
/// ```
/// use livestream_naming::{parse, ImageFormat};
///
/// let parsed = parse("2025-03-01.18-00-00.jpg").unwrap();
/// assert_eq!((parsed.month, parsed.day), (3, 1));
/// assert_eq!(parsed.title, None);
/// assert_eq!(parsed.format, ImageFormat::Jpg);
///
/// // Digits only: "2025-3-1" has the wrong width.
/// assert!(parse("2025-3-1.18-00-00.jpg").is_none());
/// ```
pub fn parse(name: &str) -> Option<ParsedName> {
    let caps = NAME_REGEX.captures(name)?;

    let number = |group: &str| caps.name(group).and_then(|m| m.as_str().parse::<u32>().ok());

    let format = match caps.name("ext")?.as_str() {
        "png" => ImageFormat::Png,
        _ => ImageFormat::Jpg,
    };

    Some(ParsedName {
        year: i32::try_from(number("year")?).ok()?,
        month: number("month")?,
        day: number("day")?,
        hour: number("hour")?,
        minute: number("minute")?,
        second: number("second")?,
        title: caps.name("title").map(|m| m.as_str().to_string()),
        format,
    })
}
