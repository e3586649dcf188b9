//! Sleep analysis
//!
//! Turns raw `SleepAnalysis` records into a series of nightly totals:
//!
//! ```text
//!   records → filter asleep → parse interval → night key → sum per night
//!           → sort by date → keep latest N nights
//! ```
//!
//! # Example
//!
//! ```rust
//! use ownmyhealth::records::{HealthRecord, ReportZone};
//! use ownmyhealth::sleep::NightAggregator;
//!
//! let records = vec![HealthRecord::sleep(
//!     "AsleepCore",
//!     "2024-01-03T01:00:00Z",
//!     "2024-01-03T06:30:00Z",
//! )];
//!
//! let nights = NightAggregator::new()
//!     .with_zone(ReportZone::Utc)
//!     .aggregate(&records);
//!
//! assert_eq!(nights[0].date_key(), "2024-01-02");
//! assert_eq!(nights[0].hours, 5.5);
//! ```

pub mod night;
pub mod stats;

pub use night::{
    aggregate_nights, to_chart_series, NightAggregator, NightlySleep, DEFAULT_CUTOFF_HOUR,
    DEFAULT_MAX_NIGHTS,
};
pub use stats::SleepStats;
