/// Data layer: core types, loading, querying and aggregation.
///
/// Architecture:
/// ```text
///  sample generator   Google Sheets / .csv / .json / .parquet
///        │                     │
///        │               ┌───────────┐
///        │               │  source    │  fetch → RowTable (header + cells)
///        │               └───────────┘
///        ▼                     ▼
///   ┌────────────────────────────┐
///   │  loader                     │  validate rows → Table (+ quarantine)
///   └────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  filter → search → stable sort → View
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  counts, response rate, metrics
///   └───────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod query;
pub mod sample;
pub mod sheets;
pub mod source;
