//! Raw-data table view

use crate::records::{HealthRecord, Page};

const VALUE_WIDTH: usize = 28;

/// One page of records as a text table
pub fn render_records(page: &Page<HealthRecord>) -> String {
    if page.total_items == 0 {
        return "No records found.\n".to_string();
    }

    let mut out = format!(
        "{:<20} {:<VALUE_WIDTH$} {:<26} {:<26}\n",
        "Type", "Value", "Start / Date", "End"
    );
    out.push_str(&format!("{}\n", "-".repeat(20 + VALUE_WIDTH + 26 + 26 + 3)));

    for record in &page.items {
        let value = record
            .value
            .as_ref()
            .map(|v| truncate(&v.to_string(), VALUE_WIDTH))
            .unwrap_or_default();
        let start = record
            .start_date
            .as_deref()
            .or(record.date.as_deref())
            .unwrap_or("-");
        let end = record.end_date.as_deref().unwrap_or("-");

        out.push_str(&format!(
            "{:<20} {:<VALUE_WIDTH$} {:<26} {:<26}\n",
            truncate(&record.record_type, 20),
            value,
            start,
            end
        ));
    }

    out.push_str(&format!(
        "\nShowing {}-{} of {} records (page {} of {})\n",
        page.first_index(),
        page.first_index() + page.items.len() - 1,
        page.total_items,
        page.page,
        page.total_pages
    ));
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::paginate;

    #[test]
    fn test_render_records_page() {
        let records: Vec<HealthRecord> = (0..30)
            .map(|i| HealthRecord::point("HeartRate", 60.0 + i as f64, format!("2024-01-01T{:02}:00:00Z", i % 24)))
            .collect();

        let out = render_records(&paginate(records, 2, 25));
        assert!(out.contains("HeartRate"));
        assert!(out.contains("85"));
        assert!(out.ends_with("Showing 26-30 of 30 records (page 2 of 2)\n"));
    }

    #[test]
    fn test_long_values_truncated() {
        let record = HealthRecord::sleep(
            "HKCategoryValueSleepAnalysisAsleepUnspecified",
            "2024-01-01T23:00:00Z",
            "2024-01-02T06:00:00Z",
        );
        let out = render_records(&paginate(vec![record], 1, 25));
        assert!(out.contains("HKCategoryValueSleepAnalysi…"));
    }

    #[test]
    fn test_render_empty() {
        let page = paginate(Vec::<HealthRecord>::new(), 1, 25);
        assert_eq!(render_records(&page), "No records found.\n");
    }
}
