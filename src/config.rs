use crate::date::{today_utc, SnapshotWindow};
use crate::table::LOCATION;
use time::Date;

pub const FULL_DATASET_STEM: &str = "owid-covid-data";
pub const LATEST_STEM: &str = "owid-covid-latest";

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub destination_prefix: String,   // e.g. "public" -> public/owid-covid-data.csv
    pub key_column: String,           // column holding the location identifier
    pub reference_date: Option<Date>, // "today" of the run; None = current UTC date
    pub window_days: u32,             // trailing window of the latest snapshot, inclusive
    pub publish_concurrency: usize,   // 1 = sequential publishing
    pub public: bool,                 // visibility flag passed to the publisher
    pub progress: bool,               // show progress bar
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            destination_prefix: "public".to_string(),
            key_column: LOCATION.to_string(),
            reference_date: None,
            window_days: 14,
            publish_concurrency: 1,
            public: true,
            progress: false,
        }
    }
}

impl ExportOptions {
    pub fn with_destination_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.destination_prefix = prefix.as_ref().trim_matches('/').to_string();
        self
    }
    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }
    pub fn with_reference_date(mut self, date: Date) -> Self {
        self.reference_date = Some(date);
        self
    }
    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }
    pub fn with_publish_concurrency(mut self, n: usize) -> Self {
        self.publish_concurrency = n.max(1);
        self
    }
    pub fn with_public(mut self, yes: bool) -> Self {
        self.public = yes;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    pub fn snapshot_window(&self) -> SnapshotWindow {
        SnapshotWindow::trailing(self.reference_date.unwrap_or_else(today_utc), self.window_days)
    }

    /// `<prefix>/owid-covid-data.<ext>`
    pub fn dataset_destination(&self, ext: &str) -> String {
        self.destination(&format!("{FULL_DATASET_STEM}.{ext}"))
    }

    /// `<prefix>/latest/owid-covid-latest.<ext>`
    pub fn latest_destination(&self, ext: &str) -> String {
        self.destination(&format!("latest/{LATEST_STEM}.{ext}"))
    }

    fn destination(&self, rest: &str) -> String {
        if self.destination_prefix.is_empty() {
            rest.to_string()
        } else {
            format!("{}/{}", self.destination_prefix, rest)
        }
    }
}
