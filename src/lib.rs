//! Load numeric CSV columns as plot points.
//!
//! A [`SeriesConfig`] names a CSV file (or glob) inside a [`Workspace`], a
//! URL template and an optional column filter. [`SeriesLoader::load_series`]
//! reads the first matching file and returns one [`PlotPoint`] per numeric
//! cell of every column that survives the filter.

pub mod data;
pub mod log_sink;
pub mod workspace;

pub use data::filter::{FilterEntry, FilterList};
pub use data::loader::{SeriesError, SeriesLoader};
pub use data::model::{FilterMode, PlotPoint, SeriesConfig};
pub use log_sink::{LogFacade, LogSink, MemorySink, WriterSink};
pub use workspace::{FileHandle, LocalWorkspace, MemoryWorkspace, Workspace};
