//! Pages
//!
//! The app's pages as async controllers over a `HealthGateway`:
//!
//! - **route**: `Route`, path resolution and the auth guard rule
//! - **controller**: `PageContext`, one method per page
//! - **error**: the user-facing page errors

mod controller;
mod error;
mod route;

pub use controller::{PageContext, RecordsQuery};
pub use error::{PageError, PageResult};
pub use route::Route;
