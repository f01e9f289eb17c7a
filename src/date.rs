use std::fmt;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

/// Parse a "YYYY-MM-DD" calendar date. Surrounding whitespace is ignored.
pub fn parse_iso_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Format a date as "YYYY-MM-DD".
pub fn format_iso_date(d: Date) -> String {
    d.format(format_description!("[year]-[month]-[day]")).unwrap_or_else(|_| d.to_string())
}

/// Current UTC calendar date; the default reference date of an export run.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Inclusive trailing window `[end - days, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotWindow {
    pub start: Date,
    pub end: Date,
}

impl SnapshotWindow {
    pub fn trailing(end: Date, days: u32) -> Self {
        let start = end.checked_sub(Duration::days(i64::from(days))).unwrap_or(Date::MIN);
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, d: Date) -> bool {
        self.start <= d && d <= self.end
    }
}

impl fmt::Display for SnapshotWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", format_iso_date(self.start), format_iso_date(self.end))
    }
}
