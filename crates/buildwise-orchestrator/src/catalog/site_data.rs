//! Static site reference data.
//!
//! Stands in for geospatial and zoning services: a handful of locations with height limits,
//! setbacks and site coverage per project type. Unknown locations use the London entry.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Minimum distances from the plot boundary, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Setbacks {
    pub front: u32,
    pub sides: u32,
    pub rear: u32,
}

/// Zoning rules for one project type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoningRules {
    pub allowed_height_m: u32,
    pub setbacks_m: Setbacks,
}

/// Reference data for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteProfile {
    pub residential: ZoningRules,
    pub commercial: ZoningRules,
    pub max_coverage_percent: u32,
    pub environmental_risk: &'static str,
    pub common_building_codes: &'static str,
}

impl SiteProfile {
    /// Rules for a project type, matched case-insensitively.
    pub fn rules_for(&self, project_type: &str) -> Option<&ZoningRules> {
        match project_type.trim().to_ascii_lowercase().as_str() {
            "residential" => Some(&self.residential),
            "commercial" => Some(&self.commercial),
            _ => None,
        }
    }
}

const fn rules(allowed_height_m: u32, front: u32, sides: u32, rear: u32) -> ZoningRules {
    ZoningRules { allowed_height_m, setbacks_m: Setbacks { front, sides, rear } }
}

/// Location used when a location has no entry.
pub const DEFAULT_LOCATION: &str = "London, UK";

static SITES: &[(&str, SiteProfile)] = &[
    (
        "London, UK",
        SiteProfile {
            residential: rules(12, 5, 3, 7),
            commercial: rules(20, 3, 1, 5),
            max_coverage_percent: 40,
            environmental_risk: "Low (potential for minor soil contamination near old industrial sites)",
            common_building_codes: "UK Building Regulations Part B (Fire Safety), Part M (Access to and use of buildings), Part L (Conservation of fuel and power).",
        },
    ),
    (
        "New York, USA",
        SiteProfile {
            residential: rules(150, 0, 0, 0),
            commercial: rules(300, 0, 0, 0),
            max_coverage_percent: 100,
            environmental_risk: "Medium (urban heat island effect, historical underground infrastructure)",
            common_building_codes: "NYC Building Code, ADA Compliance.",
        },
    ),
    (
        "Rural, California, USA",
        SiteProfile {
            residential: rules(10, 10, 5, 10),
            commercial: rules(15, 8, 4, 8),
            max_coverage_percent: 25,
            environmental_risk: "High (wildfire risk, seismic activity, water scarcity, protected species habitats)",
            common_building_codes: "California Building Standards Code (Title 24), Wildland-Urban Interface (WUI) codes.",
        },
    ),
];

/// Looks up a location (exact match, ignoring case), falling back to London.
pub fn site_profile(location: &str) -> &'static SiteProfile {
    let location = location.trim();
    SITES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(location))
        .or_else(|| SITES.iter().find(|(name, _)| *name == DEFAULT_LOCATION))
        .map_or(&SITES[0].1, |(_, profile)| profile)
}

/// Computed field: the site profile for the input's location, as JSON.
pub(crate) fn site_info(input: &Map<String, Value>) -> Value {
    let location = super::LOCATION.resolve(input);
    serde_json::to_value(site_profile(location.as_str().unwrap_or_default())).unwrap_or(Value::Null)
}

/// Finish hook: adds the location, zoning data and reference risks to the site report.
pub(crate) fn attach_site_data(fields: &Map<String, Value>, payload: &mut Map<String, Value>) {
    let location = fields.get("location").and_then(Value::as_str).unwrap_or_default();
    let project_type = fields.get("project_type").and_then(Value::as_str).unwrap_or_default();
    let profile = site_profile(location);
    let rules = profile.rules_for(project_type);

    payload.insert("location".to_string(), json!(location));
    payload.insert("project_type".to_string(), json!(project_type));
    payload.insert(
        "zoning_data".to_string(),
        json!({
            "allowed_height_m": rules.map_or_else(|| json!("N/A"), |r| json!(r.allowed_height_m)),
            "setbacks_m": rules.map_or_else(|| json!({}), |r| json!(r.setbacks_m)),
            "max_coverage_percent": profile.max_coverage_percent,
        }),
    );
    payload.insert("environmental_risk".to_string(), json!(profile.environmental_risk));
    payload.insert("common_building_codes".to_string(), json!(profile.common_building_codes));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_location() {
        let profile = site_profile("new york, usa");
        assert_eq!(profile.max_coverage_percent, 100);
        assert_eq!(profile.rules_for("Commercial").map(|r| r.allowed_height_m), Some(300));
    }

    #[test]
    fn test_unknown_location_uses_london() {
        assert_eq!(site_profile("Atlantis"), site_profile(DEFAULT_LOCATION));
        assert_eq!(site_profile("").max_coverage_percent, 40);
    }

    #[test]
    fn test_attach_site_data_residential() {
        let fields = json!({"location": "Rural, California, USA", "project_type": "residential"});
        let mut payload = Map::new();
        attach_site_data(fields.as_object().unwrap(), &mut payload);

        assert_eq!(
            payload["zoning_data"],
            json!({
                "allowed_height_m": 10,
                "setbacks_m": {"front": 10, "sides": 5, "rear": 10},
                "max_coverage_percent": 25
            })
        );
        assert_eq!(payload["location"], json!("Rural, California, USA"));
        assert!(payload["environmental_risk"].as_str().unwrap().starts_with("High"));
    }

    #[test]
    fn test_attach_site_data_unknown_project_type() {
        let fields = json!({"location": "London, UK", "project_type": "industrial"});
        let mut payload = Map::new();
        attach_site_data(fields.as_object().unwrap(), &mut payload);

        assert_eq!(
            payload["zoning_data"],
            json!({"allowed_height_m": "N/A", "setbacks_m": {}, "max_coverage_percent": 40})
        );
    }
}
