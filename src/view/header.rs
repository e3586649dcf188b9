//! Header and navigation

use crate::pages::Route;

const BRAND: &str = "OwnMyHealth";
const TAGLINE: &str = "Visualize Your Health Data";

/// Brand line plus navigation, with `active` highlighted
pub fn render_header(active: Route) -> String {
    let nav: Vec<String> = Route::NAV
        .iter()
        .map(|route| {
            if *route == active {
                format!("[{}]", route.title())
            } else {
                route.title().to_string()
            }
        })
        .collect();

    format!(
        "{BRAND} - {TAGLINE}\n{}   Logout\n{}\n",
        nav.join("   "),
        "=".repeat(60)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_item_is_marked() {
        let header = render_header(Route::SleepHealth);
        assert!(header.starts_with("OwnMyHealth - Visualize Your Health Data\n"));
        assert!(header.contains("Heart Health   [Sleep Health]"));
        assert!(header.contains("Logout"));
    }

    #[test]
    fn test_no_active_item_on_dashboard() {
        let header = render_header(Route::Dashboard);
        assert!(!header.contains('['));
    }
}
