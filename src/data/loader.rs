use std::io::{self, Read};

use csv::ByteRecord;
use thiserror::Error;

use super::filter::FilterList;
use super::model::{FilterMode, PlotPoint, SeriesConfig};
use crate::log_sink::LogSink;
use crate::workspace::Workspace;

/// Placeholder replaced by the column label.
pub const NAME_PLACEHOLDER: &str = "%name%";
/// Placeholder replaced by the column position.
pub const INDEX_PLACEHOLDER: &str = "%index%";
/// Placeholder replaced by the build number.
pub const BUILD_PLACEHOLDER: &str = "%build%";

/// Errors from loading a CSV series.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// No file matched the configured pattern. Reported to the log sink;
    /// `load_series` turns it into an empty result.
    #[error("no plot data file found: {pattern} in {workspace}")]
    DataSourceNotFound { pattern: String, workspace: String },

    #[error("cannot list '{pattern}' in {workspace}")]
    Workspace {
        pattern: String,
        workspace: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read plot data from {path}")]
    IoFailure {
        path: String,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// SeriesLoader
// ---------------------------------------------------------------------------

/// Turns a CSV file into plot points, one per numeric cell of each
/// surviving column.
#[derive(Debug, Clone)]
pub struct SeriesLoader {
    config: SeriesConfig,
    filters: FilterList,
}

impl SeriesLoader {
    pub fn new(config: SeriesConfig) -> Self {
        let filters = match config.filter_mode() {
            FilterMode::Off => FilterList::default(),
            _ => FilterList::parse(config.filter_spec()),
        };
        Self { config, filters }
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterList {
        &self.filters
    }

    /// Load the series from the first file matching the configured pattern.
    ///
    /// A missing file is logged to `sink` and yields no points. Only I/O
    /// failures (listing, opening or reading) are returned as errors.
    pub fn load_series(
        &self,
        workspace: &dyn Workspace,
        build_number: u32,
        sink: &mut dyn LogSink,
    ) -> Result<Vec<PlotPoint>, SeriesError> {
        let pattern = self.config.file();
        let files = workspace
            .list_matching(pattern)
            .map_err(|source| SeriesError::Workspace {
                pattern: pattern.to_string(),
                workspace: workspace.describe(),
                source,
            })?;

        let Some(file) = files.first() else {
            let missing = SeriesError::DataSourceNotFound {
                pattern: pattern.to_string(),
                workspace: workspace.describe(),
            };
            log::warn!("{missing}");
            sink.warn(&missing.to_string());
            return Ok(Vec::new());
        };

        if files.len() > 1 {
            sink.info(&format!("{} files match {pattern}, using {file}", files.len()));
        }
        sink.info(&format!("Loading plot series data from: {file}"));

        let io_failure = |source: io::Error| SeriesError::IoFailure {
            path: file.to_string(),
            source,
        };
        let reader = workspace.open(file).map_err(io_failure)?;
        let points = self
            .read_points(reader, build_number)
            .map_err(|e| io_failure(e.into()))?;

        sink.info(&format!("Got {} plot points from {file}", points.len()));
        Ok(points)
    }

    /// Parse CSV text from `reader` into points.
    ///
    /// Row-major order: rows in file order, then surviving columns in
    /// header order. Bytes that are not valid UTF-8 are replaced, so they
    /// only cost the cell they appear in.
    pub fn read_points<R: Read>(
        &self,
        reader: R,
        build_number: u32,
    ) -> Result<Vec<PlotPoint>, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.byte_records();
        let header = match records.next() {
            Some(record) => corrected_header(&record?),
            None => {
                log::debug!("empty CSV, no header line");
                return Ok(Vec::new());
            }
        };

        let mode = self.config.filter_mode();
        let columns: Vec<Column> = self
            .filters
            .survivors(mode, header.as_slice())
            .into_iter()
            .map(|index| Column::new(&header[index], index, self.config.url(), build_number))
            .collect();
        log::debug!(
            "{} of {} columns survive {mode} filtering",
            columns.len(),
            header.len()
        );

        let mut points = Vec::new();
        if columns.is_empty() {
            return Ok(points);
        }

        for (row_no, record) in records.enumerate() {
            let record = record?;
            for column in &columns {
                // Cells past the corrected width are never read.
                let Some(bytes) = record.get(column.index) else {
                    continue;
                };
                let cell = String::from_utf8_lossy(bytes);
                match numeric_cell(&cell) {
                    Some(y_value) => points.push(PlotPoint {
                        label: column.label.clone(),
                        y_value: y_value.to_string(),
                        url: column.url.clone(),
                    }),
                    None => log::trace!(
                        "row {}, column {}: skipping non-numeric cell {cell:?}",
                        row_no + 1,
                        column.label
                    ),
                }
            }
        }

        Ok(points)
    }
}

/// A surviving column with its label and expanded URL.
struct Column {
    index: usize,
    label: String,
    url: String,
}

impl Column {
    fn new(header: &str, index: usize, template: &str, build_number: u32) -> Self {
        let label = if header.is_empty() {
            index.to_string()
        } else {
            header.to_string()
        };
        let url = expand_url(template, &label, index, build_number);
        Self { index, label, url }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Header cells with a trailing empty cell (from a trailing delimiter) dropped.
pub fn corrected_header(record: &ByteRecord) -> Vec<String> {
    let mut header: Vec<String> = record
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect();
    if header.last().is_some_and(|last| last.is_empty()) {
        header.pop();
    }
    header
}

/// The trimmed cell text when it parses as a floating-point number.
pub fn numeric_cell(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    trimmed.parse::<f64>().ok().map(|_| trimmed)
}

/// Substitute `%name%`, `%index%` and `%build%` in a URL template.
pub fn expand_url(template: &str, name: &str, index: usize, build_number: u32) -> String {
    template
        .replace(NAME_PLACEHOLDER, name)
        .replace(INDEX_PLACEHOLDER, &index.to_string())
        .replace(BUILD_PLACEHOLDER, &build_number.to_string())
}
