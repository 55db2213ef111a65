//! AQI category bands (Indian National AQI) and the colours and risk levels
//! derived from them.
//!
//! This is the only place where band boundaries live. The health advisory
//! table in `advisory.rs` is built from [`AqiCategory::range`], and every
//! colour sent to the UI comes from [`AqiCategory::color_hex`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---

/// Air quality category, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Severe,
}

/// Coarse health risk shown next to an advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Severe,
}

/// Result of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: AqiCategory,
    pub color_hex: &'static str,
}

impl AqiCategory {
    // ---
    /// All categories, least severe first.
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Satisfactory,
        AqiCategory::Moderate,
        AqiCategory::Poor,
        AqiCategory::VeryPoor,
        AqiCategory::Severe,
    ];

    /// Map an AQI value onto its band. Values below zero count as `Good`.
    pub fn from_aqi(aqi: i32) -> Self {
        // ---
        match aqi {
            i32::MIN..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Satisfactory,
            101..=200 => AqiCategory::Moderate,
            201..=300 => AqiCategory::Poor,
            301..=400 => AqiCategory::VeryPoor,
            _ => AqiCategory::Severe,
        }
    }

    /// Inclusive AQI range covered by this band. `Severe` is open-ended and
    /// reported with `i32::MAX` as its upper bound.
    pub fn range(self) -> (i32, i32) {
        match self {
            AqiCategory::Good => (0, 50),
            AqiCategory::Satisfactory => (51, 100),
            AqiCategory::Moderate => (101, 200),
            AqiCategory::Poor => (201, 300),
            AqiCategory::VeryPoor => (301, 400),
            AqiCategory::Severe => (401, i32::MAX),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Satisfactory => "Satisfactory",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
        }
    }

    pub fn color_hex(self) -> &'static str {
        match self {
            AqiCategory::Good => "#00E400",
            AqiCategory::Satisfactory => "#FFFF00",
            AqiCategory::Moderate => "#FF7E00",
            AqiCategory::Poor => "#FF0000",
            AqiCategory::VeryPoor => "#8F3F97",
            AqiCategory::Severe => "#7E0023",
        }
    }

    pub fn risk_level(self) -> RiskLevel {
        match self {
            AqiCategory::Good | AqiCategory::Satisfactory => RiskLevel::Low,
            AqiCategory::Moderate => RiskLevel::Moderate,
            AqiCategory::Poor | AqiCategory::VeryPoor => RiskLevel::High,
            AqiCategory::Severe => RiskLevel::Severe,
        }
    }

    /// Parse a category label as stored in the database.
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an AQI value into its category and display colour.
pub fn classify(aqi: i32) -> Classification {
    // ---
    let category = AqiCategory::from_aqi(aqi);
    Classification {
        category,
        color_hex: category.color_hex(),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_reference_values() {
        // ---
        let c = classify(75);
        assert_eq!(c.category, AqiCategory::Satisfactory);
        assert_eq!(c.color_hex, "#FFFF00");

        let c = classify(250);
        assert_eq!(c.category, AqiCategory::Poor);
        assert_eq!(c.color_hex, "#FF0000");
    }

    #[test]
    fn test_band_boundaries() {
        // ---
        assert_eq!(classify(0).category, AqiCategory::Good);
        assert_eq!(classify(50).category, AqiCategory::Good);
        assert_eq!(classify(51).category, AqiCategory::Satisfactory);
        assert_eq!(classify(100).category, AqiCategory::Satisfactory);
        assert_eq!(classify(101).category, AqiCategory::Moderate);
        assert_eq!(classify(200).category, AqiCategory::Moderate);
        assert_eq!(classify(201).category, AqiCategory::Poor);
        assert_eq!(classify(300).category, AqiCategory::Poor);
        assert_eq!(classify(301).category, AqiCategory::VeryPoor);
        assert_eq!(classify(400).category, AqiCategory::VeryPoor);
        assert_eq!(classify(401).category, AqiCategory::Severe);
        assert_eq!(classify(999).category, AqiCategory::Severe);
    }

    #[test]
    fn test_monotonic_severity() {
        // ---
        let mut previous = classify(0).category;
        for aqi in 1..=600 {
            let current = classify(aqi).category;
            assert!(current >= previous, "severity dropped at {aqi}");
            previous = current;
        }
    }

    #[test]
    fn test_ranges_agree_with_classifier() {
        // ---
        for category in AqiCategory::ALL {
            let (lo, hi) = category.range();
            assert_eq!(AqiCategory::from_aqi(lo), category);
            assert_eq!(AqiCategory::from_aqi(hi), category);
        }
    }

    #[test]
    fn test_risk_levels() {
        // ---
        assert_eq!(AqiCategory::Good.risk_level(), RiskLevel::Low);
        assert_eq!(AqiCategory::Satisfactory.risk_level(), RiskLevel::Low);
        assert_eq!(AqiCategory::Moderate.risk_level(), RiskLevel::Moderate);
        assert_eq!(AqiCategory::Poor.risk_level(), RiskLevel::High);
        assert_eq!(AqiCategory::VeryPoor.risk_level(), RiskLevel::High);
        assert_eq!(AqiCategory::Severe.risk_level(), RiskLevel::Severe);
    }

    #[test]
    fn test_serialized_labels() {
        // ---
        let json = serde_json::to_string(&AqiCategory::VeryPoor).unwrap();
        assert_eq!(json, "\"Very Poor\"");
        assert_eq!(AqiCategory::parse("very poor"), Some(AqiCategory::VeryPoor));
        assert_eq!(AqiCategory::parse("Hazardous"), None);
    }
}
