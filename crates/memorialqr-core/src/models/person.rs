use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

/// A commemorated person, keyed publicly by their national ID (`tcno`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Person {
    pub id: i64,
    #[serde(rename = "ad")]
    pub first_name: String,
    #[serde(rename = "soyad")]
    pub last_name: String,
    pub tcno: String,
    #[serde(rename = "dogumTarihi")]
    pub birth_date: String,
    #[serde(rename = "olumTarihi", default)]
    pub death_date: Option<String>,
    #[serde(rename = "gorseller", default)]
    pub images: Option<String>,
    #[serde(rename = "qrKod", default)]
    pub qr_code: Option<String>,
    #[serde(rename = "biyografi", default)]
    pub biography: Option<String>,
    #[serde(rename = "createdAt")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub updated_at: DateTime<Utc>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive match on first/last name, exact-case substring on tcno.
    /// A blank query matches everyone.
    pub fn matches_search(&self, query: &str) -> bool {
        query.trim().is_empty()
            || contains_ignore_case(&self.first_name, query)
            || contains_ignore_case(&self.last_name, query)
            || self.tcno.contains(query)
    }

    /// File name used when saving this person's QR code image.
    pub fn qr_file_name(&self) -> String {
        format!("qr-{}-{}-{}.png", self.first_name, self.last_name, self.tcno)
    }

    /// Years of life for display, e.g. "1950 - 2020" or "1950 -".
    pub fn lifespan(&self) -> String {
        let born = year_of(&self.birth_date);
        match self.death_date.as_deref().filter(|d| !d.is_empty()) {
            Some(died) => format!("{} - {}", born, year_of(died)),
            None => format!("{} -", born),
        }
    }
}

fn year_of(date: &str) -> &str {
    date.get(..4).unwrap_or(date)
}

/// Filter persons by a search query, keeping the original order.
pub fn filter_persons<'a>(persons: &'a [Person], query: &str) -> Vec<&'a Person> {
    persons.iter().filter(|p| p.matches_search(query)).collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CreatePerson {
    pub tcno: String,
    #[serde(rename = "ad")]
    pub first_name: String,
    #[serde(rename = "soyad")]
    pub last_name: String,
    #[serde(rename = "dogumTarihi")]
    pub birth_date: String,
    #[serde(rename = "olumTarihi", skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(rename = "biyografi", skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UpdatePerson {
    #[serde(rename = "ad", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "soyad", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "dogumTarihi", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(rename = "olumTarihi", skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(rename = "biyografi", skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

impl UpdatePerson {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.birth_date.is_none()
            && self.death_date.is_none()
            && self.biography.is_none()
    }
}

/// Response of `GET /persons/{tcno}/images`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(first: &str, last: &str, tcno: &str) -> Person {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "ad": first,
            "soyad": last,
            "tcno": tcno,
            "dogumTarihi": "1950-03-01",
            "createdAt": "2024-01-01T10:00:00.000Z",
            "updatedAt": "2024-01-02T10:00:00.000Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_api_shape() {
        let json = r#"{
            "id": 7,
            "ad": "Ayşe",
            "soyad": "Yılmaz",
            "tcno": "12345678901",
            "dogumTarihi": "1940-05-10",
            "olumTarihi": "2020-11-02",
            "gorseller": "a.jpg,b.mp4",
            "qrKod": "/uploads/qr/12345678901.png",
            "biyografi": "Öğretmen",
            "createdAt": "2024-01-01T10:00:00.000Z",
            "updatedAt": "2024-01-02T10:00:00.000Z"
        }"#;
        let p: Person = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, 7);
        assert_eq!(p.first_name, "Ayşe");
        assert_eq!(p.death_date.as_deref(), Some("2020-11-02"));
        assert_eq!(p.lifespan(), "1940 - 2020");
    }

    #[test]
    fn test_matches_search() {
        let p = person("Mehmet", "Demir", "11122233344");
        assert!(p.matches_search(""));
        assert!(p.matches_search("  "));
        assert!(p.matches_search("meh"));
        assert!(p.matches_search("DEMIR"));
        assert!(p.matches_search("2223"));
        assert!(!p.matches_search("ali"));
    }

    #[test]
    fn test_filter_persons_keeps_order() {
        let list = vec![
            person("Ali", "Kaya", "1"),
            person("Veli", "Kaya", "2"),
            person("Zeynep", "Ak", "3"),
        ];
        let hits: Vec<_> = filter_persons(&list, "kaya").iter().map(|p| p.tcno.as_str()).collect();
        assert_eq!(hits, vec!["1", "2"]);
        assert_eq!(filter_persons(&list, "").len(), 3);
        assert_eq!(filter_persons(&list, "  ").len(), 3);
    }

    #[test]
    fn test_qr_file_name() {
        let p = person("Ali", "Kaya", "12345678901");
        assert_eq!(p.qr_file_name(), "qr-Ali-Kaya-12345678901.png");
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = UpdatePerson {
            biography: Some("yeni".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "biyografi": "yeni" }));
        assert!(!update.is_empty());
        assert!(UpdatePerson::default().is_empty());
    }

    #[test]
    fn test_lifespan_without_death_date() {
        let p = person("Ali", "Kaya", "1");
        assert_eq!(p.lifespan(), "1950 -");
    }
}
