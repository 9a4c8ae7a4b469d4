use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FilterMode – how the filter spec is applied to CSV columns
// ---------------------------------------------------------------------------

/// Column filter mode, spelled the way the host configuration stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMode {
    /// Every column survives.
    #[default]
    Off,
    /// A column survives when its header matches at least one entry.
    IncludeByString,
    /// A column survives when its header matches no entry.
    ExcludeByString,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Off => "OFF",
            FilterMode::IncludeByString => "INCLUDE_BY_STRING",
            FilterMode::ExcludeByString => "EXCLUDE_BY_STRING",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a mode string is not one of the three known names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter mode: {0}")]
pub struct UnknownFilterMode(pub String);

impl FromStr for FilterMode {
    type Err = UnknownFilterMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OFF" => Ok(FilterMode::Off),
            "INCLUDE_BY_STRING" => Ok(FilterMode::IncludeByString),
            "EXCLUDE_BY_STRING" => Ok(FilterMode::ExcludeByString),
            other => Err(UnknownFilterMode(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SeriesConfig – one configured CSV series
// ---------------------------------------------------------------------------

/// Immutable description of one CSV series as configured in the host.
///
/// Serialised field names follow the host surface (`file`, `url`,
/// `displayTableFlag`, `filterMode`, `filterSpec`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesConfig {
    /// File path or glob, relative to the workspace root.
    file: String,
    /// URL template; may contain `%name%`, `%index%` and `%build%`.
    #[serde(default)]
    url: String,
    /// Whether the host should also render the raw CSV as a table.
    #[serde(default)]
    display_table_flag: bool,
    #[serde(default)]
    filter_mode: FilterMode,
    /// Raw comma separated filter list; quoted entries are regexes.
    #[serde(default)]
    filter_spec: String,
    /// Series label shown by the host. CSV series label their points per column.
    #[serde(default)]
    label: String,
}

impl SeriesConfig {
    /// Build a config the way the host constructs one from its form fields.
    ///
    /// Missing values fall back to an empty URL template, the `OFF` mode and
    /// an empty filter spec. An unrecognised mode name is treated as `OFF`.
    pub fn new(
        file: impl Into<String>,
        url: Option<&str>,
        filter_mode: Option<&str>,
        filter_spec: Option<&str>,
        display_table_flag: bool,
    ) -> Self {
        let filter_mode = filter_mode
            .and_then(|m| match m.parse::<FilterMode>() {
                Ok(mode) => Some(mode),
                Err(e) => {
                    log::warn!("{e}, filtering disabled");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            file: file.into(),
            url: url.unwrap_or_default().to_string(),
            display_table_flag,
            filter_mode,
            filter_spec: filter_spec.unwrap_or_default().to_string(),
            label: String::new(),
        }
    }

    /// Same config with a series label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn display_table_flag(&self) -> bool {
        self.display_table_flag
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn filter_spec(&self) -> &str {
        &self.filter_spec
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Series kind tag used by the host.
    pub fn file_type(&self) -> &'static str {
        "csv"
    }
}

// ---------------------------------------------------------------------------
// PlotPoint – one emitted data point
// ---------------------------------------------------------------------------

/// One plottable value taken from a single CSV cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotPoint {
    /// Column label (header text, or the column position when the header is blank).
    pub label: String,
    /// Trimmed cell text; always parses as `f64`.
    pub y_value: String,
    /// URL template with placeholders substituted.
    pub url: String,
}

impl PlotPoint {
    pub fn value(&self) -> f64 {
        self.y_value.parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for PlotPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.label, self.y_value, self.url)
    }
}
