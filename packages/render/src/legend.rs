//! The static map legend: one row per bloom category.

use bloom_map_bloom_models::BloomCategory;
use serde::{Deserialize, Serialize};

/// A single legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Category this row describes.
    pub category: BloomCategory,
    /// Swatch color.
    pub color: String,
    /// Row text, e.g. `"High (> 100 mg/m³)"`.
    pub label: String,
}

/// The three fixed legend rows, highest intensity first.
#[must_use]
pub fn legend_entries() -> Vec<LegendEntry> {
    BloomCategory::all()
        .iter()
        .map(|category| LegendEntry {
            category: *category,
            color: category.color().to_string(),
            label: format!("{} ({})", category.label(), category.range_label()),
        })
        .collect()
}

/// Legend rows as HTML, ready to be appended to the `legend` element.
#[must_use]
pub fn legend_html() -> String {
    legend_entries()
        .iter()
        .map(|entry| {
            format!(
                "<div class=\"legend-row\"><i style=\"background:{}\"></i> {}</div>",
                entry.color,
                escape_angle_brackets(&entry.label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_angle_brackets(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_rows_in_order() {
        let entries = legend_entries();
        let categories: Vec<BloomCategory> = entries.iter().map(|e| e.category).collect();
        assert_eq!(
            categories,
            vec![
                BloomCategory::High,
                BloomCategory::Medium,
                BloomCategory::Low
            ]
        );
        assert_eq!(entries[0].label, "High (> 100 mg/m³)");
        assert_eq!(entries[1].color, "#ffcc00");
    }

    #[test]
    fn html_rows_are_escaped() {
        let html = legend_html();
        assert_eq!(html.matches("legend-row").count(), 3);
        assert!(html.contains("background:#ff0000"));
        assert!(html.contains("High (&gt; 100 mg/m³)"));
        assert!(html.contains("Low (≤ 50 mg/m³)"));
    }
}
