//! Views
//!
//! View-models built from page data, and render functions that turn them
//! into terminal text. Rendering never fetches or mutates anything.

pub mod dashboard;
pub mod header;
pub mod heart;
pub mod records;
pub mod sleep;

pub use dashboard::{render_dashboard, DashboardView};
pub use header::render_header;
pub use heart::{render_heart, HeartView, InsightCard, RiskLevel, RiskPanel, SummaryPanel, TrainingPanel};
pub use records::render_records;
pub use sleep::{render_sleep, SleepView};
