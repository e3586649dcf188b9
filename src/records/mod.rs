//! Health records
//!
//! The data model shared by every page:
//!
//! - **types**: `HealthRecord`, `RecordValue`, `UploadSummary`
//! - **time**: timestamp parsing and the `ReportZone` used for local dates
//! - **payload**: normalizing bare-array and `{records}` payloads
//! - **page**: raw-data table pagination
//! - **error**: error types

pub mod error;
pub mod page;
pub mod payload;
pub mod time;
pub mod types;

pub use error::{RecordsError, RecordsResult};
pub use page::{paginate, Page, DEFAULT_PER_PAGE};
pub use payload::{decode_records, normalize_records, parse_records};
pub use time::{parse_timestamp, ReportZone};
pub use types::{
    HealthRecord, RecordValue, UploadSummary, HEART_RATE, RESTING_HEART_RATE, SLEEP_ANALYSIS,
};
