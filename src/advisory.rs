//! Health advisory table.
//!
//! One row per [`AqiCategory`], with ranges taken from [`AqiCategory::range`]
//! so the advisory bands can never drift from the classifier. The same rows
//! are seeded into `health_advisories` on startup.

use serde::Serialize;

use crate::category::{AqiCategory, RiskLevel};
use crate::models::HealthAdvisory;

// ---

/// Recommendation lists shown under an advisory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub indoor: Vec<String>,
    pub outdoor: Vec<String>,
    pub health: Vec<String>,
    pub equipment: Vec<String>,
}

/// Advisory as returned to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryView {
    // ---
    pub category: AqiCategory,
    pub general_advice: String,
    pub sensitive_groups_advice: Option<String>,
    pub outdoor_activities: Option<String>,
    pub risk_level: RiskLevel,
    pub color_code: &'static str,
    pub mask_recommendation: bool,
    pub air_purifier_recommendation: bool,
    pub specific_recommendations: Recommendations,
}

struct AdvisoryText {
    general: &'static str,
    sensitive: &'static str,
    outdoor: &'static str,
    mask: bool,
    purifier: bool,
    indoor_recs: &'static [&'static str],
    outdoor_recs: &'static [&'static str],
    health_recs: &'static [&'static str],
    equipment_recs: &'static [&'static str],
}

fn text_for(category: AqiCategory) -> AdvisoryText {
    // ---
    match category {
        AqiCategory::Good => AdvisoryText {
            general: "Air quality is good. Enjoy outdoor activities.",
            sensitive: "No precautions needed.",
            outdoor: "All outdoor activities are safe.",
            mask: false,
            purifier: false,
            indoor_recs: &["Open windows to let fresh air in"],
            outdoor_recs: &["Ideal for outdoor exercise and sports"],
            health_recs: &["No health precautions needed"],
            equipment_recs: &[],
        },
        AqiCategory::Satisfactory => AdvisoryText {
            general: "Air quality is acceptable. Unusually sensitive people should limit prolonged outdoor exertion.",
            sensitive: "People with respiratory conditions may experience minor discomfort.",
            outdoor: "Outdoor activities are generally safe.",
            mask: false,
            purifier: false,
            indoor_recs: &["Ventilate rooms during the cleaner parts of the day"],
            outdoor_recs: &["Normal outdoor activities are fine"],
            health_recs: &["Sensitive individuals should watch for coughing or shortness of breath"],
            equipment_recs: &[],
        },
        AqiCategory::Moderate => AdvisoryText {
            general: "Air quality is moderate. Sensitive groups should reduce prolonged outdoor exertion.",
            sensitive: "Children, the elderly and people with lung or heart disease should limit outdoor activity.",
            outdoor: "Reduce prolonged or heavy outdoor exertion.",
            mask: false,
            purifier: true,
            indoor_recs: &[
                "Keep windows closed during peak traffic hours",
                "Run an air purifier in bedrooms",
            ],
            outdoor_recs: &[
                "Shorten outdoor workouts",
                "Avoid exercising near busy roads",
            ],
            health_recs: &[
                "Keep inhalers and medication at hand if you have asthma",
                "Stay hydrated",
            ],
            equipment_recs: &["HEPA air purifier"],
        },
        AqiCategory::Poor => AdvisoryText {
            general: "Air quality is poor. Everyone may begin to experience health effects.",
            sensitive: "Sensitive groups should avoid outdoor activity.",
            outdoor: "Avoid prolonged outdoor exertion; move activities indoors.",
            mask: true,
            purifier: true,
            indoor_recs: &[
                "Keep windows and doors closed",
                "Run air purifiers continuously",
                "Avoid burning candles or incense",
            ],
            outdoor_recs: &[
                "Avoid outdoor exercise",
                "Limit time spent outdoors",
            ],
            health_recs: &[
                "Watch for breathing difficulty, chest tightness or eye irritation",
                "Consult a doctor if symptoms persist",
            ],
            equipment_recs: &["N95 mask", "HEPA air purifier"],
        },
        AqiCategory::VeryPoor => AdvisoryText {
            general: "Air quality is very poor. Prolonged exposure can cause respiratory illness.",
            sensitive: "Sensitive groups should remain indoors and keep activity levels low.",
            outdoor: "Avoid all outdoor physical activity.",
            mask: true,
            purifier: true,
            indoor_recs: &[
                "Stay indoors with windows sealed",
                "Run air purifiers on high",
                "Avoid frying and other smoke-producing cooking",
            ],
            outdoor_recs: &[
                "Avoid all outdoor physical activity",
                "Postpone non-essential travel",
            ],
            health_recs: &[
                "People with heart or lung disease should follow their action plan",
                "Seek medical help for persistent coughing or breathlessness",
            ],
            equipment_recs: &["N95 or N99 mask", "HEPA air purifier", "Air quality monitor"],
        },
        AqiCategory::Severe => AdvisoryText {
            general: "Air quality is severe. This is a health emergency; everyone is likely to be affected.",
            sensitive: "Sensitive groups must stay indoors and avoid all exertion.",
            outdoor: "Avoid going outdoors.",
            mask: true,
            purifier: true,
            indoor_recs: &[
                "Stay indoors and keep all openings sealed",
                "Run air purifiers continuously on high",
                "Create a clean-air room at home",
            ],
            outdoor_recs: &[
                "Do not exercise outdoors",
                "Go outside only if absolutely necessary, wearing a mask",
            ],
            health_recs: &[
                "Seek medical attention immediately for breathing difficulty",
                "Check on elderly neighbours and relatives",
            ],
            equipment_recs: &["N99 mask", "HEPA air purifier", "Air quality monitor"],
        },
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The built-in advisory row for a category.
pub fn builtin_advisory(category: AqiCategory) -> HealthAdvisory {
    // ---
    let (aqi_min, aqi_max) = category.range();
    let text = text_for(category);
    HealthAdvisory {
        aqi_min,
        aqi_max,
        category: category.as_str().to_string(),
        general_advice: text.general.to_string(),
        sensitive_groups_advice: Some(text.sensitive.to_string()),
        outdoor_activities: Some(text.outdoor.to_string()),
        mask_recommendation: text.mask,
        air_purifier_recommendation: text.purifier,
    }
}

/// All built-in advisory rows, lowest range first.
pub fn builtin_advisories() -> Vec<HealthAdvisory> {
    AqiCategory::ALL.into_iter().map(builtin_advisory).collect()
}

/// Build the UI view for an AQI value.
///
/// `stored` is the row read from the database, if any. Its text and flags
/// take precedence; category, colour and risk always come from the
/// classifier so the two code paths cannot disagree.
pub fn advisory_view(aqi: i32, stored: Option<HealthAdvisory>) -> AdvisoryView {
    // ---
    let category = AqiCategory::from_aqi(aqi);
    let row = stored.unwrap_or_else(|| builtin_advisory(category));
    let text = text_for(category);

    AdvisoryView {
        category,
        general_advice: row.general_advice,
        sensitive_groups_advice: row.sensitive_groups_advice,
        outdoor_activities: row.outdoor_activities,
        risk_level: category.risk_level(),
        color_code: category.color_hex(),
        mask_recommendation: row.mask_recommendation,
        air_purifier_recommendation: row.air_purifier_recommendation,
        specific_recommendations: Recommendations {
            indoor: owned(text.indoor_recs),
            outdoor: owned(text.outdoor_recs),
            health: owned(text.health_recs),
            equipment: owned(text.equipment_recs),
        },
    }
}
