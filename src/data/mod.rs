/// Data layer: chart recovery and the lap comparison pipeline.
///
/// Architecture:
/// ```text
///  .html / .svg / fetched page
///        │
///        ▼
///   ┌──────────┐
///   │  markup   │  tags + text runs
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐   geometry: path commands | marker desc
///   │  walker   │  → ChartCapture (guides per axis, raw series)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ calibrate  │  least squares pixel → value per axis
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ resample  │  to domain, filter (monotonic), even grid
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │  align    │ ──▶ │ laptime   │  trapezoid time, t0 − t1
///   └──────────┘     └──────────┘
/// ```
pub mod align;
pub mod calibrate;
pub mod error;
pub mod export;
pub mod filter;
pub mod geometry;
pub mod laptime;
pub mod loader;
pub mod markup;
pub mod model;
pub mod pipeline;
pub mod resample;
pub mod walker;
