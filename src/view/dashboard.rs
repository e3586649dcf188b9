//! Dashboard view

use serde::Serialize;

use crate::store::Session;

/// What the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// "<message> Loaded <n> records." after an upload
    pub upload_message: Option<String>,
    /// Records cached for the other pages
    pub cached_records: usize,
}

impl DashboardView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            upload_message: session.upload.as_ref().map(|u| u.dashboard_message()),
            cached_records: session.records.len(),
        }
    }
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();

    if let Some(message) = &view.upload_message {
        out.push_str(message);
        out.push('\n');
    }

    if view.cached_records > 0 {
        out.push_str(&format!("{} records cached for this session.\n", view.cached_records));
    }

    out.push_str("\nExplore:\n");
    out.push_str("  ownmyhealth heart     Heart health insights\n");
    out.push_str("  ownmyhealth sleep     Nightly sleep totals\n");
    out.push_str("  ownmyhealth records   Raw data table\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::UploadSummary;

    #[test]
    fn test_dashboard_after_upload() {
        let session = Session::from_upload(UploadSummary {
            message: "Upload successful.".to_string(),
            records_loaded: 3400,
            records: Vec::new(),
        });

        let view = DashboardView::from_session(&session);
        assert_eq!(
            view.upload_message.as_deref(),
            Some("Upload successful. Loaded 3400 records.")
        );

        let out = render_dashboard(&view);
        assert!(out.starts_with("Upload successful. Loaded 3400 records.\n"));
        assert!(!out.contains("cached"));
    }

    #[test]
    fn test_dashboard_without_upload() {
        let view = DashboardView::from_session(&Session::new());
        assert!(view.upload_message.is_none());
        assert!(render_dashboard(&view).starts_with("\nExplore:"));
    }
}
