/// Data layer: series configuration, column filters and CSV loading.
///
/// Architecture:
/// ```text
///   workspace glob ──► first matching .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  header line → corrected columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  literal / regex entries → surviving columns
///   └──────────┘
///        │
///        ▼
///   Vec<PlotPoint>  one per numeric cell, row-major
/// ```

pub mod filter;
pub mod loader;
pub mod model;
