//! Baseline AQI estimation.
//!
//! Maps a city to the AQI value that synthesized and mock data is centred on.
//! The curated tables encode regional patterns (stubble burning in Punjab and
//! Haryana, mining belts in Jharkhand and Chhattisgarh, cleaner hill and
//! coastal towns). Lookup falls through name → id → region → [`DEFAULT_BASELINE`].

use std::collections::HashMap;

use crate::models::City;

// ---

/// Baseline used when neither the city nor its region is known.
pub const DEFAULT_BASELINE: i32 = 120;

const CITY_NAME_BASELINES: &[(&str, i32)] = &[
    // Major cities
    ("Delhi", 180),
    ("Mumbai", 120),
    ("Kolkata", 130),
    ("Chennai", 110),
    ("Bangalore", 100),
    ("Hyderabad", 120),
    ("Pune", 110),
    ("Ahmedabad", 140),
    ("Jaipur", 160),
    ("Lucknow", 170),
    // Punjab
    ("Bathinda", 165),
    ("Moga", 160),
    ("Fazilka", 155),
    ("Barnala", 158),
    ("Kapurthala", 150),
    // Haryana
    ("Panipat", 165),
    ("Karnal", 160),
    ("Rohtak", 155),
    ("Hisar", 150),
    ("Sirsa", 145),
    // Uttar Pradesh
    ("Moradabad", 160),
    ("Firozabad", 165),
    ("Bareilly", 155),
    ("Aligarh", 158),
    ("Mathura", 162),
    ("Meerut", 168),
    ("Saharanpur", 155),
    // Bihar
    ("Muzaffarpur", 135),
    ("Darbhanga", 130),
    ("Begusarai", 140),
    ("Katihar", 125),
    ("Purnia", 128),
    // Madhya Pradesh
    ("Gwalior", 130),
    ("Ujjain", 125),
    ("Dewas", 128),
    ("Ratlam", 122),
    ("Singrauli", 175),
    // Rajasthan
    ("Jodhpur", 145),
    ("Bikaner", 150),
    ("Ajmer", 140),
    ("Bharatpur", 148),
    ("Alwar", 145),
    // Odisha
    ("Rourkela", 150),
    ("Sambalpur", 135),
    ("Balasore", 130),
    ("Berhampur", 125),
    // Chhattisgarh
    ("Raipur", 145),
    ("Bhilai", 155),
    ("Korba", 165),
    ("Durg", 150),
    // Jharkhand
    ("Jamshedpur", 160),
    ("Dhanbad", 170),
    ("Bokaro", 155),
    ("Ranchi", 140),
    // Assam
    ("Guwahati", 95),
    ("Dibrugarh", 85),
    ("Silchar", 90),
    ("Jorhat", 88),
    // Himachal Pradesh
    ("Shimla", 75),
    ("Dharamshala", 70),
    ("Kullu", 65),
    ("Mandi", 80),
    // Uttarakhand
    ("Dehradun", 85),
    ("Haridwar", 95),
    ("Rishikesh", 75),
    ("Roorkee", 90),
    // Kerala
    ("Kochi", 90),
    ("Kozhikode", 85),
    ("Thrissur", 88),
    ("Kollam", 92),
    // Andhra Pradesh
    ("Visakhapatnam", 105),
    ("Vijayawada", 115),
    ("Guntur", 110),
    ("Nellore", 100),
    // Karnataka
    ("Mysore", 95),
    ("Hubli", 105),
    ("Mangalore", 85),
    ("Belgaum", 100),
    // Tamil Nadu
    ("Coimbatore", 105),
    ("Madurai", 110),
    ("Salem", 108),
    ("Tirupur", 115),
    ("Vellore", 112),
];

/// Baselines keyed by the seeded city ids. Ids 1-10 are the major cities in
/// seed order, 11-83 follow the regional groups above.
const CITY_ID_BASELINES: &[(i32, i32)] = &[
    (1, 180),
    (2, 120),
    (3, 100),
    (4, 110),
    (5, 130),
    (6, 120),
    (7, 110),
    (8, 140),
    (9, 160),
    (10, 170),
    (11, 165),
    (12, 160),
    (13, 155),
    (14, 158),
    (15, 150),
    (16, 165),
    (17, 160),
    (18, 155),
    (19, 150),
    (20, 145),
    (21, 160),
    (22, 165),
    (23, 155),
    (24, 158),
    (25, 162),
    (26, 168),
    (27, 155),
    (28, 135),
    (29, 130),
    (30, 140),
    (31, 125),
    (32, 128),
    (33, 130),
    (34, 125),
    (35, 128),
    (36, 122),
    (37, 175),
    (38, 145),
    (39, 150),
    (40, 140),
    (41, 148),
    (42, 145),
    (43, 150),
    (44, 135),
    (45, 130),
    (46, 125),
    (47, 145),
    (48, 155),
    (49, 165),
    (50, 150),
    (51, 160),
    (52, 170),
    (53, 155),
    (54, 140),
    (55, 95),
    (56, 85),
    (57, 90),
    (58, 88),
    (59, 75),
    (60, 70),
    (61, 65),
    (62, 80),
    (63, 85),
    (64, 95),
    (65, 75),
    (66, 90),
    (67, 90),
    (68, 85),
    (69, 88),
    (70, 92),
    (71, 105),
    (72, 115),
    (73, 110),
    (74, 100),
    (75, 95),
    (76, 105),
    (77, 85),
    (78, 100),
    (79, 105),
    (80, 110),
    (81, 108),
    (82, 115),
    (83, 112),
];

const REGION_BASELINES: &[(&str, i32)] = &[
    ("Punjab", 160),
    ("Haryana", 155),
    ("Uttar Pradesh", 150),
    ("Bihar", 130),
    ("Madhya Pradesh", 125),
    ("Rajasthan", 145),
    ("Odisha", 135),
    ("Chhattisgarh", 150),
    ("Jharkhand", 155),
    ("Assam", 90),
    ("Himachal Pradesh", 75),
    ("Uttarakhand", 85),
    ("Kerala", 90),
    ("Andhra Pradesh", 105),
    ("Karnataka", 100),
    ("Tamil Nadu", 110),
];

/// How the caller identifies a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityRef<'a> {
    Id(i32),
    Name(&'a str),
}

/// Immutable baseline lookup tables, built once at startup and shared.
#[derive(Debug, Clone)]
pub struct BaselineTable {
    by_name: HashMap<String, i32>,
    by_id: HashMap<i32, i32>,
    by_region: HashMap<String, i32>,
    default: i32,
}

impl Default for BaselineTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BaselineTable {
    // ---
    /// Build the table from the curated built-in data.
    pub fn builtin() -> Self {
        // ---
        Self {
            by_name: CITY_NAME_BASELINES
                .iter()
                .map(|&(name, aqi)| (name.to_string(), aqi))
                .collect(),
            by_id: CITY_ID_BASELINES.iter().copied().collect(),
            by_region: REGION_BASELINES
                .iter()
                .map(|&(region, aqi)| (region.to_string(), aqi))
                .collect(),
            default: DEFAULT_BASELINE,
        }
    }

    /// Estimate the baseline AQI for a city.
    ///
    /// Tries an exact name match, then an exact id match, then the region
    /// average, and finally the global default. Never fails.
    pub fn baseline_for(&self, city: CityRef<'_>, region: Option<&str>) -> i32 {
        // ---
        let direct = match city {
            CityRef::Name(name) => self.by_name.get(name),
            CityRef::Id(id) => self.by_id.get(&id),
        };

        direct
            .or_else(|| region.and_then(|r| self.by_region.get(r)))
            .copied()
            .unwrap_or(self.default)
    }

    /// Baseline for a full city record: name first, then id, then state.
    pub fn baseline_for_city(&self, city: &City) -> i32 {
        // ---
        self.by_name
            .get(city.name.as_str())
            .or_else(|| self.by_id.get(&city.id))
            .or_else(|| self.by_region.get(city.state.as_str()))
            .copied()
            .unwrap_or(self.default)
    }

    /// Baseline for a bare city id, as used by the historical mock path.
    pub fn baseline_for_id(&self, city_id: i32) -> i32 {
        self.baseline_for(CityRef::Id(city_id), None)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn city(id: i32, name: &str, state: &str) -> City {
        // ---
        City {
            id,
            name: name.to_string(),
            state: state.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            category: None,
            population: None,
            district: None,
        }
    }

    #[test]
    fn test_name_lookup() {
        // ---
        let table = BaselineTable::builtin();
        assert_eq!(table.baseline_for(CityRef::Name("Delhi"), None), 180);
        assert_eq!(table.baseline_for(CityRef::Name("Kullu"), Some("Punjab")), 65);
    }

    #[test]
    fn test_id_lookup() {
        // ---
        let table = BaselineTable::builtin();
        assert_eq!(table.baseline_for_id(1), 180);
        assert_eq!(table.baseline_for_id(37), 175);
        assert_eq!(table.baseline_for_id(83), 112);
    }

    #[test]
    fn test_region_fallback() {
        // ---
        let table = BaselineTable::builtin();
        assert_eq!(
            table.baseline_for(CityRef::Name("Ludhiana"), Some("Punjab")),
            160
        );
        assert_eq!(table.baseline_for(CityRef::Id(500), Some("Kerala")), 90);
    }

    #[test]
    fn test_global_default() {
        // ---
        let table = BaselineTable::builtin();
        assert_eq!(
            table.baseline_for(CityRef::Name("Nowhereville"), Some("Atlantis")),
            DEFAULT_BASELINE
        );
        assert_eq!(table.baseline_for(CityRef::Name("Nowhereville"), None), 120);
        assert_eq!(table.baseline_for_id(9999), 120);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        // ---
        let table = BaselineTable::builtin();
        assert_eq!(table.baseline_for(CityRef::Name("delhi"), None), 120);
    }

    #[test]
    fn test_city_record_chain() {
        // ---
        let table = BaselineTable::builtin();

        // Name wins over a mismatched id
        assert_eq!(table.baseline_for_city(&city(61, "Delhi", "Delhi")), 180);

        // Unknown name, known id
        assert_eq!(table.baseline_for_city(&city(61, "Unknown", "")), 65);

        // Unknown name and id, known state
        assert_eq!(
            table.baseline_for_city(&city(900, "Unknown", "Jharkhand")),
            155
        );

        assert_eq!(table.baseline_for_city(&city(900, "Unknown", "Goa")), 120);
    }

    #[test]
    fn test_id_and_name_tables_agree() {
        // ---
        // The seeded catalogue assigns ids in table order
        let table = BaselineTable::builtin();
        for (i, &(name, aqi)) in CITY_NAME_BASELINES.iter().enumerate().skip(10) {
            assert_eq!(table.baseline_for_id(i as i32 + 1), aqi, "{name}");
        }
    }
}
