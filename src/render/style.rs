//! Fixed styling palette.

use crate::metrics::Classification;

pub const COLOR_FAVORS_A: &str = "#1565c0";
pub const COLOR_FAVORS_B: &str = "#c62828";
pub const COLOR_FAIR: &str = "#2e7d32";
pub const COLOR_UNKNOWN: &str = "#9e9e9e";

/// Total mapping from classification to fill color. Absent or
/// unrecognized classifications already decode to `Unknown`, so every
/// input lands on exactly one of the four palette entries.
pub fn classification_color(classification: Classification) -> &'static str {
    match classification {
        Classification::FavorsPartyA => COLOR_FAVORS_A,
        Classification::FavorsPartyB => COLOR_FAVORS_B,
        Classification::Fair => COLOR_FAIR,
        Classification::Unknown => COLOR_UNKNOWN,
    }
}

/// Per-feature drawing style, as handed to a map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    /// Stroke color.
    pub color: String,
    /// Stroke width.
    pub weight: f64,
    /// Stroke dash pattern, when not solid.
    pub dash: Option<String>,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl LayerStyle {
    /// Base style for a freshly selected state's districts.
    pub fn district() -> Self {
        Self {
            color: "#1f3a5f".to_string(),
            weight: 1.5,
            dash: None,
            fill_color: "#9ecae1".to_string(),
            fill_opacity: 0.35,
        }
    }

    /// Nationwide overlay style for one state, filled by its cached
    /// classification and outlined more heavily when selected.
    pub fn state(classification: Classification, selected: bool) -> Self {
        Self {
            color: if selected { "#111111".to_string() } else { "#555555".to_string() },
            weight: if selected { 2.5 } else { 1.0 },
            dash: None,
            fill_color: classification_color(classification).to_string(),
            fill_opacity: 0.55,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_classification_has_a_distinct_color() {
        let colors = [
            classification_color(Classification::FavorsPartyA),
            classification_color(Classification::FavorsPartyB),
            classification_color(Classification::Fair),
            classification_color(Classification::Unknown),
        ];
        let unique: std::collections::HashSet<_> = colors.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn unrecognized_labels_style_as_unknown() {
        let classification = Classification::parse("not-a-label");
        assert_eq!(classification_color(classification), COLOR_UNKNOWN);
    }

    #[test]
    fn selected_state_outline_is_heavier() {
        let plain = LayerStyle::state(Classification::Fair, false);
        let selected = LayerStyle::state(Classification::Fair, true);
        assert!(selected.weight > plain.weight);
        assert_eq!(plain.fill_color, selected.fill_color);
    }
}
