use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

const MAPS_BASE_URL: &str = "https://www.google.com/maps?q=";

/// A company profile, keyed publicly by its generated `companyCode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Company {
    pub id: i64,
    #[serde(rename = "sirketIsmi")]
    pub name: String,
    #[serde(rename = "companyCode")]
    pub company_code: String,
    #[serde(rename = "konum", default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(rename = "sirketTanitimi", default)]
    pub description: Option<String>,
    #[serde(rename = "medyalar", default)]
    pub media: Option<String>,
    #[serde(rename = "qrKod", default)]
    pub qr_code: Option<String>,
    #[serde(rename = "createdAt")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Case-insensitive match on the name, exact-case substring on the code.
    /// A blank query matches every company.
    pub fn matches_search(&self, query: &str) -> bool {
        query.trim().is_empty() || contains_ignore_case(&self.name, query) || self.company_code.contains(query)
    }

    pub fn qr_file_name(&self) -> String {
        format!("qr-{}-{}.png", self.name, self.company_code)
    }

    /// Map link for the company location, only when it is a "lat, lng" pair.
    pub fn maps_url(&self) -> Option<String> {
        self.location.as_deref().and_then(maps_url)
    }
}

pub fn filter_companies<'a>(companies: &'a [Company], query: &str) -> Vec<&'a Company> {
    companies.iter().filter(|c| c.matches_search(query)).collect()
}

fn coordinate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^-?\d+\.?\d*,\s*-?\d+\.?\d*$").expect("coordinate pattern is valid")
    })
}

/// True when a location string is a decimal "lat, lng" pair.
pub fn is_coordinate(location: &str) -> bool {
    !location.is_empty() && coordinate_pattern().is_match(location.trim())
}

/// Google Maps link for a coordinate location; `None` for free-form addresses.
pub fn maps_url(location: &str) -> Option<String> {
    if !is_coordinate(location) {
        return None;
    }
    let coords: String = location.chars().filter(|c| !c.is_whitespace()).collect();
    Some(format!("{}{}", MAPS_BASE_URL, coords))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CreateCompany {
    /// Generated by the server when omitted.
    #[serde(rename = "companyCode", skip_serializing_if = "Option::is_none")]
    pub company_code: Option<String>,
    #[serde(rename = "sirketIsmi")]
    pub name: String,
    #[serde(rename = "konum", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(rename = "sirketTanitimi", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UpdateCompany {
    #[serde(rename = "sirketIsmi", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "konum", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(rename = "sirketTanitimi", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateCompany {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.location.is_none() && self.website.is_none() && self.description.is_none()
    }
}

/// Response of `GET /companies/{code}/media`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaResponse {
    #[serde(default)]
    pub media: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(name: &str, code: &str, location: Option<&str>) -> Company {
        serde_json::from_value(serde_json::json!({
            "id": 3,
            "sirketIsmi": name,
            "companyCode": code,
            "konum": location,
            "createdAt": "2024-01-01T10:00:00Z",
            "updatedAt": "2024-01-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_is_coordinate() {
        assert!(is_coordinate("41.0082, 28.9784"));
        assert!(is_coordinate("-33.86,151.20"));
        assert!(is_coordinate("  41,29  "));
        assert!(is_coordinate("41.,29."));
        assert!(!is_coordinate(""));
        assert!(!is_coordinate("Kadıköy, İstanbul"));
        assert!(!is_coordinate("41.0082"));
        assert!(!is_coordinate("41.0082, 28.9784, 10"));
    }

    #[test]
    fn test_maps_url() {
        assert_eq!(
            maps_url(" 41.0082,   28.9784 ").as_deref(),
            Some("https://www.google.com/maps?q=41.0082,28.9784")
        );
        assert_eq!(maps_url("Beşiktaş"), None);

        let c = company("Acme", "ACM1", Some("39.9,32.8"));
        assert_eq!(c.maps_url().as_deref(), Some("https://www.google.com/maps?q=39.9,32.8"));
        assert_eq!(company("Acme", "ACM1", None).maps_url(), None);
    }

    #[test]
    fn test_matches_search() {
        let c = company("Anıt Taş Ltd", "AT-001", None);
        assert!(c.matches_search("taş"));
        assert!(c.matches_search("AT-0"));
        assert!(!c.matches_search("at-0"));
        assert!(c.matches_search(""));
        assert!(c.matches_search("   "));
        assert!(c.matches_search("\t"));
    }

    #[test]
    fn test_filter_and_file_name() {
        let list = vec![company("Acme", "A1", None), company("Beta", "B1", None)];
        assert_eq!(filter_companies(&list, "beta").len(), 1);
        assert_eq!(filter_companies(&list, "  ").len(), 2);
        assert_eq!(list[0].qr_file_name(), "qr-Acme-A1.png");
    }

    #[test]
    fn test_create_omits_missing_code() {
        let create = CreateCompany {
            name: "Acme".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&create).unwrap(),
            serde_json::json!({ "sirketIsmi": "Acme" })
        );
    }
}
