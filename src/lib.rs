//! # OwnMyHealth
//!
//! Client for a personal health backend: upload a health export, then explore
//! heart health insights, nightly sleep totals and the raw records.
//!
//! ## Modules
//!
//! - [`records`]: Health record model, timestamp parsing, pagination
//! - [`sleep`]: Night aggregation of sleep records
//! - [`client`]: Backend gateway trait and REST client
//! - [`store`]: Session store (load / save / clear)
//! - [`pages`]: Page controllers and routes
//! - [`view`]: View-models and text rendering
//! - [`chart`]: Chart series and text bar charts
//! - [`import`]: Local Apple Health export reader
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ownmyhealth::client::ApiClient;
//! use ownmyhealth::pages::PageContext;
//! use ownmyhealth::sleep::NightAggregator;
//! use ownmyhealth::store::RecordStore;
//! use ownmyhealth::view::render_sleep;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = PageContext::new(
//!         RecordStore::open("session")?,
//!         ApiClient::with_base_url("http://localhost:8000")?,
//!         NightAggregator::new(),
//!     );
//!
//!     ctx.upload(Path::new("export.zip")).await?;
//!     let sleep = ctx.sleep_health().await?;
//!     print!("{}", render_sleep(&sleep));
//!
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod client;
pub mod config;
pub mod import;
pub mod pages;
pub mod records;
pub mod sleep;
pub mod store;
pub mod view;

// Re-export top-level types for convenience
pub use records::{HealthRecord, RecordValue, RecordsError, ReportZone, UploadSummary};

pub use sleep::{aggregate_nights, NightAggregator, NightlySleep, SleepStats};

pub use client::{ApiClient, ClientError, HealthGateway};

pub use store::{RecordStore, Session, StoreError};

pub use pages::{PageContext, PageError, Route};

pub use config::{Config, ConfigError};
