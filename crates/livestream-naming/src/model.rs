use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone};

/// Image container named by the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ImageFormat {
    Jpg,
    Png,
}

/// Components recovered from a thumbnail name.
///
/// The numeric fields are exactly what the name contains; nothing guarantees
/// they form a real calendar date until [`ParsedName::naive_date_time`]
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedName {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Free text between the time and the extension, if any.
    pub title: Option<String>,
    pub format: ImageFormat,
}

impl ParsedName {
    /// The wall-clock date and time, or `None` for impossible values such as
    /// month 13, April 31st, February 29th outside leap years or hour 24.
    pub fn naive_date_time(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }

    /// Resolve the wall-clock time in a time zone.
    ///
    /// Returns `None` when the calendar values are invalid or when the local
    /// time is skipped or repeated by a daylight saving transition.
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        let naive = self.naive_date_time()?;
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(instant) => Some(instant),
            LocalResult::Ambiguous(_, _) | LocalResult::None => None,
        }
    }
}
