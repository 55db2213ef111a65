//! Built-in city catalogue and display classification.
//!
//! The catalogue is served when the store has no `cities` table and is also
//! what `schema::seed_reference_data` writes into a fresh database, so ids
//! line up with the baseline id table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::City;

// ---

/// (name, state, latitude, longitude, category)
type CitySeed = (&'static str, &'static str, f64, f64, Option<&'static str>);

const CITY_SEEDS: &[CitySeed] = &[
    ("Delhi", "Delhi", 28.6139, 77.2090, Some("major_city")),
    ("Mumbai", "Maharashtra", 19.0760, 72.8777, Some("major_city")),
    ("Bangalore", "Karnataka", 12.9716, 77.5946, Some("major_city")),
    ("Chennai", "Tamil Nadu", 13.0827, 80.2707, Some("major_city")),
    ("Kolkata", "West Bengal", 22.5726, 88.3639, Some("major_city")),
    ("Hyderabad", "Telangana", 17.3850, 78.4867, Some("major_city")),
    ("Pune", "Maharashtra", 18.5204, 73.8567, Some("major_city")),
    ("Ahmedabad", "Gujarat", 23.0225, 72.5714, Some("major_city")),
    ("Jaipur", "Rajasthan", 26.9124, 75.7873, Some("major_city")),
    ("Lucknow", "Uttar Pradesh", 26.8467, 80.9462, Some("major_city")),
    ("Bathinda", "Punjab", 30.2110, 74.9455, None),
    ("Moga", "Punjab", 30.8165, 75.1717, None),
    ("Fazilka", "Punjab", 30.4036, 74.0280, None),
    ("Barnala", "Punjab", 30.3819, 75.5468, None),
    ("Kapurthala", "Punjab", 31.3800, 75.3800, None),
    ("Panipat", "Haryana", 29.3909, 76.9635, None),
    ("Karnal", "Haryana", 29.6857, 76.9905, None),
    ("Rohtak", "Haryana", 28.8955, 76.6066, None),
    ("Hisar", "Haryana", 29.1492, 75.7217, None),
    ("Sirsa", "Haryana", 29.5349, 75.0280, None),
    ("Moradabad", "Uttar Pradesh", 28.8386, 78.7733, None),
    ("Firozabad", "Uttar Pradesh", 27.1592, 78.3957, None),
    ("Bareilly", "Uttar Pradesh", 28.3670, 79.4304, None),
    ("Aligarh", "Uttar Pradesh", 27.8974, 78.0880, None),
    ("Mathura", "Uttar Pradesh", 27.4924, 77.6737, None),
    ("Meerut", "Uttar Pradesh", 28.9845, 77.7064, None),
    ("Saharanpur", "Uttar Pradesh", 29.9680, 77.5552, None),
    ("Muzaffarpur", "Bihar", 26.1209, 85.3647, None),
    ("Darbhanga", "Bihar", 26.1542, 85.8918, None),
    ("Begusarai", "Bihar", 25.4182, 86.1272, None),
    ("Katihar", "Bihar", 25.5394, 87.5717, None),
    ("Purnia", "Bihar", 25.7771, 87.4753, None),
    ("Gwalior", "Madhya Pradesh", 26.2183, 78.1828, None),
    ("Ujjain", "Madhya Pradesh", 23.1765, 75.7885, None),
    ("Dewas", "Madhya Pradesh", 22.9676, 76.0534, None),
    ("Ratlam", "Madhya Pradesh", 23.3315, 75.0367, None),
    ("Singrauli", "Madhya Pradesh", 24.1992, 82.6645, None),
    ("Jodhpur", "Rajasthan", 26.2389, 73.0243, None),
    ("Bikaner", "Rajasthan", 28.0229, 73.3119, None),
    ("Ajmer", "Rajasthan", 26.4499, 74.6399, None),
    ("Bharatpur", "Rajasthan", 27.2152, 77.4938, None),
    ("Alwar", "Rajasthan", 27.5530, 76.6346, None),
    ("Rourkela", "Odisha", 22.2604, 84.8536, None),
    ("Sambalpur", "Odisha", 21.4669, 83.9812, None),
    ("Balasore", "Odisha", 21.4942, 86.9317, None),
    ("Berhampur", "Odisha", 19.3150, 84.7941, None),
    ("Raipur", "Chhattisgarh", 21.2514, 81.6296, None),
    ("Bhilai", "Chhattisgarh", 21.1938, 81.3509, None),
    ("Korba", "Chhattisgarh", 22.3595, 82.7501, None),
    ("Durg", "Chhattisgarh", 21.1904, 81.2849, None),
    ("Jamshedpur", "Jharkhand", 22.8046, 86.2029, None),
    ("Dhanbad", "Jharkhand", 23.7957, 86.4304, None),
    ("Bokaro", "Jharkhand", 23.6693, 86.1511, None),
    ("Ranchi", "Jharkhand", 23.3441, 85.3096, None),
    ("Guwahati", "Assam", 26.1445, 91.7362, None),
    ("Dibrugarh", "Assam", 27.4728, 94.9120, None),
    ("Silchar", "Assam", 24.8333, 92.7789, None),
    ("Jorhat", "Assam", 26.7509, 94.2037, None),
    ("Shimla", "Himachal Pradesh", 31.1048, 77.1734, None),
    ("Dharamshala", "Himachal Pradesh", 32.2190, 76.3234, None),
    ("Kullu", "Himachal Pradesh", 31.9578, 77.1095, None),
    ("Mandi", "Himachal Pradesh", 31.7087, 76.9320, None),
    ("Dehradun", "Uttarakhand", 30.3165, 78.0322, None),
    ("Haridwar", "Uttarakhand", 29.9457, 78.1642, None),
    ("Rishikesh", "Uttarakhand", 30.0869, 78.2676, None),
    ("Roorkee", "Uttarakhand", 29.8543, 77.8880, None),
    ("Kochi", "Kerala", 9.9312, 76.2673, None),
    ("Kozhikode", "Kerala", 11.2588, 75.7804, None),
    ("Thrissur", "Kerala", 10.5276, 76.2144, None),
    ("Kollam", "Kerala", 8.8932, 76.6141, None),
    ("Visakhapatnam", "Andhra Pradesh", 17.6868, 83.2185, None),
    ("Vijayawada", "Andhra Pradesh", 16.5062, 80.6480, None),
    ("Guntur", "Andhra Pradesh", 16.3067, 80.4365, None),
    ("Nellore", "Andhra Pradesh", 14.4426, 79.9865, None),
    ("Mysore", "Karnataka", 12.2958, 76.6394, None),
    ("Hubli", "Karnataka", 15.3647, 75.1240, None),
    ("Mangalore", "Karnataka", 12.9141, 74.8560, None),
    ("Belgaum", "Karnataka", 15.8497, 74.4977, None),
    ("Coimbatore", "Tamil Nadu", 11.0168, 76.9558, None),
    ("Madurai", "Tamil Nadu", 9.9252, 78.1198, None),
    ("Salem", "Tamil Nadu", 11.6643, 78.1460, None),
    ("Tirupur", "Tamil Nadu", 11.1085, 77.3411, None),
    ("Vellore", "Tamil Nadu", 12.9165, 79.1325, None),
];

const MAJOR_CITIES: &[&str] = &[
    "Delhi",
    "Mumbai",
    "Bangalore",
    "Chennai",
    "Kolkata",
    "Hyderabad",
    "Pune",
    "Nagpur",
];

const INDUSTRIAL_TOWNS: &[&str] = &[
    "Singrauli",
    "Korba",
    "Dhanbad",
    "Bokaro",
    "Jamshedpur",
    "Bhilai",
    "Rourkela",
    "Bhiwandi",
    "Ichalkaranji",
];

const HILL_STATIONS: &[&str] = &["Shimla", "Dharamshala", "Kullu", "Mandi", "Rishikesh", "Dehradun"];

const COASTAL_CITIES: &[&str] = &[
    "Kochi",
    "Kozhikode",
    "Mangalore",
    "Visakhapatnam",
    "Chennai",
    "Mumbai",
    "Chiplun",
    "Ratnagiri",
];

/// Display grouping used by the city filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CityType {
    #[serde(rename = "Major City")]
    MajorCity,
    #[serde(rename = "Small City")]
    SmallCity,
    Town,
    Village,
    #[serde(rename = "Industrial Town")]
    IndustrialTown,
    #[serde(rename = "Hill Station")]
    HillStation,
    #[serde(rename = "Coastal City")]
    CoastalCity,
    Agricultural,
    City,
}

impl CityType {
    // ---
    pub fn as_str(self) -> &'static str {
        match self {
            CityType::MajorCity => "Major City",
            CityType::SmallCity => "Small City",
            CityType::Town => "Town",
            CityType::Village => "Village",
            CityType::IndustrialTown => "Industrial Town",
            CityType::HillStation => "Hill Station",
            CityType::CoastalCity => "Coastal City",
            CityType::Agricultural => "Agricultural",
            CityType::City => "City",
        }
    }

    /// Accepts either the display label or the snake_case form.
    pub fn parse(label: &str) -> Option<Self> {
        // ---
        let normalized = label.trim().replace('_', " ");
        [
            CityType::MajorCity,
            CityType::SmallCity,
            CityType::Town,
            CityType::Village,
            CityType::IndustrialTown,
            CityType::HillStation,
            CityType::CoastalCity,
            CityType::Agricultural,
            CityType::City,
        ]
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(&normalized))
    }

    /// Classify a city for display.
    ///
    /// An explicit `category` wins. Otherwise the curated name lists apply,
    /// then Punjab/Haryana are agricultural, then population decides.
    pub fn of(city: &City) -> Self {
        // ---
        if let Some(category) = city.category.as_deref() {
            return match category {
                "rural" => CityType::Village,
                "town" => CityType::Town,
                "small_city" => CityType::SmallCity,
                "major_city" => CityType::MajorCity,
                _ => CityType::City,
            };
        }

        let name = city.name.as_str();
        if MAJOR_CITIES.contains(&name) {
            return CityType::MajorCity;
        }
        if INDUSTRIAL_TOWNS.contains(&name) {
            return CityType::IndustrialTown;
        }
        if HILL_STATIONS.contains(&name) {
            return CityType::HillStation;
        }
        if COASTAL_CITIES.contains(&name) {
            return CityType::CoastalCity;
        }
        if matches!(city.state.as_str(), "Punjab" | "Haryana") {
            return CityType::Agricultural;
        }

        match city.population {
            Some(p) if p < 50_000 => CityType::Village,
            Some(p) if p < 200_000 => CityType::Town,
            _ => CityType::City,
        }
    }
}

impl fmt::Display for CityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional filters for city listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityFilter {
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub city_type: Option<String>,
    pub search: Option<String>,
}

impl CityFilter {
    // ---
    pub fn matches(&self, city: &City) -> bool {
        // ---
        let state_ok = self
            .state
            .as_deref()
            .map_or(true, |s| city.state.eq_ignore_ascii_case(s));

        let type_ok = self.city_type.as_deref().map_or(true, |t| {
            CityType::parse(t).is_some_and(|wanted| CityType::of(city) == wanted)
        });

        let search_ok = self.search.as_deref().map_or(true, |term| {
            let term = term.to_lowercase();
            city.name.to_lowercase().contains(&term)
                || city.state.to_lowercase().contains(&term)
                || city
                    .district
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
        });

        state_ok && type_ok && search_ok
    }
}

/// The built-in catalogue, ids starting at 1 in seed order.
pub fn builtin_cities() -> Vec<City> {
    // ---
    CITY_SEEDS
        .iter()
        .enumerate()
        .map(|(i, &(name, state, latitude, longitude, category))| City {
            id: i as i32 + 1,
            name: name.to_string(),
            state: state.to_string(),
            latitude,
            longitude,
            category: category.map(str::to_string),
            population: None,
            district: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::baseline::{BaselineTable, CityRef};

    fn find(name: &str) -> City {
        builtin_cities()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap()
    }

    #[test]
    fn test_catalogue_ids_match_baselines() {
        // ---
        let table = BaselineTable::builtin();
        for city in builtin_cities() {
            assert_eq!(
                table.baseline_for_id(city.id),
                table.baseline_for(CityRef::Name(&city.name), None),
                "{} (id {})",
                city.name,
                city.id
            );
        }
    }

    #[test]
    fn test_city_type_classification() {
        // ---
        assert_eq!(CityType::of(&find("Delhi")), CityType::MajorCity);
        assert_eq!(CityType::of(&find("Korba")), CityType::IndustrialTown);
        assert_eq!(CityType::of(&find("Shimla")), CityType::HillStation);
        assert_eq!(CityType::of(&find("Kochi")), CityType::CoastalCity);
        assert_eq!(CityType::of(&find("Moga")), CityType::Agricultural);
        assert_eq!(CityType::of(&find("Gwalior")), CityType::City);

        let mut village = find("Gwalior");
        village.population = Some(30_000);
        assert_eq!(CityType::of(&village), CityType::Village);

        village.category = Some("town".to_string());
        assert_eq!(CityType::of(&village), CityType::Town);
    }

    #[test]
    fn test_filter() {
        // ---
        let filter = CityFilter {
            state: Some("punjab".to_string()),
            ..Default::default()
        };
        let punjab: Vec<_> = builtin_cities()
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        assert_eq!(punjab.len(), 5);

        let filter = CityFilter {
            city_type: Some("hill_station".to_string()),
            ..Default::default()
        };
        assert!(builtin_cities()
            .iter()
            .filter(|c| filter.matches(c))
            .all(|c| HILL_STATIONS.contains(&c.name.as_str())));

        let filter = CityFilter {
            search: Some("pur".to_string()),
            city_type: Some("Nonsense".to_string()),
            ..Default::default()
        };
        assert_eq!(builtin_cities().iter().filter(|c| filter.matches(c)).count(), 0);
    }
}
