//! Page routes

use serde::Serialize;

/// A page of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Upload,
    Dashboard,
    HeartHealth,
    SleepHealth,
    Records,
}

impl Route {
    /// Pages listed in the navigation header, in order
    pub const NAV: &'static [Route] = &[Route::HeartHealth, Route::SleepHealth, Route::Records];

    /// Resolve a page path; unknown paths land on the upload page
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default().to_ascii_lowercase();

        if path.is_empty() || path == "/" || path.ends_with("index.html") {
            Route::Upload
        } else if path.ends_with("dashboard.html") {
            Route::Dashboard
        } else if path.ends_with("hearthealth.html") {
            Route::HeartHealth
        } else if path.ends_with("sleephealth.html") {
            Route::SleepHealth
        } else if path.ends_with("records.html") {
            Route::Records
        } else {
            Route::Upload
        }
    }

    /// Every page except upload needs a successful upload first
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Upload)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Upload => "Upload",
            Route::Dashboard => "Dashboard",
            Route::HeartHealth => "Heart Health",
            Route::SleepHealth => "Sleep Health",
            Route::Records => "Raw Data",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Route::Upload => "index.html",
            Route::Dashboard => "dashboard.html",
            Route::HeartHealth => "hearthealth.html",
            Route::SleepHealth => "sleephealth.html",
            Route::Records => "records.html",
        }
    }
}
