use crate::classify::classify_columns;
use crate::concurrency::for_each_limited;
use crate::config::ExportOptions;
use crate::error::ExportError;
use crate::formats::{latest_to_json_bytes, nested_to_json_bytes, to_csv_bytes, to_xlsx_bytes};
use crate::nested::to_nested_document;
use crate::progress::make_count_progress;
use crate::publish::Publisher;
use crate::snapshot::build_latest;
use crate::table::TidyTable;
use crate::util::init_tracing_once;
use serde::Serialize;
use time::Date;

/// Export entry point: turns a tidy table into the published dataset artifacts.
#[derive(Clone, Debug, Default)]
pub struct MegafileExport {
    pub(crate) opts: ExportOptions,
}

/// One encoded artifact, ready to publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub destination: String,
    pub content: Vec<u8>,
}

/// What an export run produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub rows: usize,
    pub locations: usize,
    pub latest_locations: usize,
    pub published: Vec<PublishedEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublishedEntry {
    pub destination: String,
    pub bytes: usize,
}

impl MegafileExport {
    pub fn new() -> Self {
        Self { opts: ExportOptions::default() }
    }

    pub fn with_options(opts: ExportOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn destination_prefix(mut self, prefix: impl AsRef<str>) -> Self { self.opts = self.opts.with_destination_prefix(prefix); self }
    pub fn key_column(mut self, column: impl Into<String>) -> Self { self.opts = self.opts.with_key_column(column); self }
    pub fn reference_date(mut self, date: Date) -> Self { self.opts = self.opts.with_reference_date(date); self }
    pub fn window_days(mut self, days: u32) -> Self { self.opts = self.opts.with_window_days(days); self }
    pub fn publish_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_publish_concurrency(n); self }
    pub fn public(mut self, yes: bool) -> Self { self.opts = self.opts.with_public(yes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }

    // -------- Stages --------

    /// Encode the full time series: CSV, XLSX and the nested JSON document.
    pub fn dataset_artifacts<S: AsRef<str>>(&self, table: &TidyTable, macro_variables: &[S]) -> Result<Vec<Artifact>, ExportError> {
        self.encode_dataset(table, macro_variables).map(|(artifacts, _)| artifacts)
    }

    /// Encode the latest snapshot: CSV, XLSX and JSON keyed by location.
    pub fn latest_artifacts(&self, table: &TidyTable) -> Result<Vec<Artifact>, ExportError> {
        self.encode_latest(table).map(|(artifacts, _)| artifacts)
    }

    fn encode_dataset<S: AsRef<str>>(&self, table: &TidyTable, macro_variables: &[S]) -> Result<(Vec<Artifact>, usize), ExportError> {
        let classes = classify_columns(table.columns(), macro_variables, &self.opts.key_column)?;
        let doc = to_nested_document(table, &classes)?;
        tracing::info!(rows = table.len(), locations = doc.len(), "built nested document");

        let artifacts = vec![
            Artifact { destination: self.opts.dataset_destination("csv"), content: to_csv_bytes(table)? },
            Artifact { destination: self.opts.dataset_destination("xlsx"), content: to_xlsx_bytes(table)? },
            Artifact { destination: self.opts.dataset_destination("json"), content: nested_to_json_bytes(&doc)? },
        ];
        Ok((artifacts, doc.len()))
    }

    fn encode_latest(&self, table: &TidyTable) -> Result<(Vec<Artifact>, usize), ExportError> {
        let window = self.opts.snapshot_window();
        let latest = build_latest(table, &self.opts.key_column, window)?;
        tracing::info!(window = %window, locations = latest.len(), "built latest snapshot");

        let artifacts = vec![
            Artifact { destination: self.opts.latest_destination("csv"), content: to_csv_bytes(&latest)? },
            Artifact { destination: self.opts.latest_destination("xlsx"), content: to_xlsx_bytes(&latest)? },
            Artifact {
                destination: self.opts.latest_destination("json"),
                content: latest_to_json_bytes(&latest, &self.opts.key_column)?,
            },
        ];
        Ok((artifacts, latest.len()))
    }

    // -------- Operations --------

    /// Export the complete time series (CSV, XLSX, JSON).
    pub fn create_dataset<S, P>(&self, table: &TidyTable, macro_variables: &[S], publisher: &P) -> Result<ExportReport, ExportError>
    where
        S: AsRef<str>,
        P: Publisher + ?Sized,
    {
        init_tracing_once();
        let (artifacts, locations) = self.encode_dataset(table, macro_variables)?;
        let published = self.publish_all(&artifacts, publisher)?;
        Ok(ExportReport { rows: table.len(), locations, latest_locations: 0, published })
    }

    /// Export the latest data points (CSV, XLSX, JSON).
    pub fn create_latest<P>(&self, table: &TidyTable, publisher: &P) -> Result<ExportReport, ExportError>
    where
        P: Publisher + ?Sized,
    {
        init_tracing_once();
        let (artifacts, latest_locations) = self.encode_latest(table)?;
        let published = self.publish_all(&artifacts, publisher)?;
        Ok(ExportReport { rows: table.len(), locations: 0, latest_locations, published })
    }

    /// Full export run. Every transformation and encoding happens before the
    /// first publish call, so a schema problem publishes nothing.
    pub fn run<S, P>(&self, table: &TidyTable, macro_variables: &[S], publisher: &P) -> Result<ExportReport, ExportError>
    where
        S: AsRef<str>,
        P: Publisher + ?Sized,
    {
        init_tracing_once();
        let (mut artifacts, locations) = self.encode_dataset(table, macro_variables)?;
        let (latest, latest_locations) = self.encode_latest(table)?;
        artifacts.extend(latest);

        let published = self.publish_all(&artifacts, publisher)?;
        Ok(ExportReport { rows: table.len(), locations, latest_locations, published })
    }

    /// Hand each artifact to `publisher`. Publishes are independent: a failure
    /// stops further calls but does not undo what was already published.
    pub fn publish_all<P>(&self, artifacts: &[Artifact], publisher: &P) -> Result<Vec<PublishedEntry>, ExportError>
    where
        P: Publisher + ?Sized,
    {
        let pb = if self.opts.progress {
            Some(make_count_progress(artifacts.len() as u64, "Publishing"))
        } else {
            None
        };
        let public = self.opts.public;

        for_each_limited(artifacts, self.opts.publish_concurrency, |a| -> Result<(), ExportError> {
            tracing::info!(destination = %a.destination, bytes = a.content.len(), "publishing");
            publisher.publish(&a.content, &a.destination, public).map_err(|e| {
                tracing::error!(destination = %e.destination(), error = %e, "publish failed");
                ExportError::from(e)
            })?;
            if let Some(pb) = &pb { pb.inc(1); }
            Ok(())
        })?;

        if let Some(pb) = pb { pb.finish_with_message("done"); }
        Ok(artifacts
            .iter()
            .map(|a| PublishedEntry { destination: a.destination.clone(), bytes: a.content.len() })
            .collect())
    }
}
