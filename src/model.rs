use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_PHOTO_CAPTION: &str = "Sin descripción";

/// Device position reading. All fields stay `None` until a location is acquired.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Geolocation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl Geolocation {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }

    /// Coordinates of an acquired reading. A latitude or longitude that is
    /// zero or NaN counts as not acquired, the same as a missing one.
    pub fn acquired_coordinates(&self) -> Option<(f64, f64)> {
        self.coordinates()
            .filter(|&(lat, lon)| lat != 0.0 && lon != 0.0 && !lat.is_nan() && !lon.is_nan())
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }
}

/// Reverse-geocoded address attributes. Display strings only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationDetails {
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoEvidence {
    pub id: u64,
    /// Encoded image bytes (JPEG, PNG, ...). Never serialized.
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    /// Source file to read `image` from when the record comes from JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl PhotoEvidence {
    pub fn new(id: u64, image: Vec<u8>, description: &str, timestamp: DateTime<Utc>) -> Self {
        PhotoEvidence {
            id,
            image: Some(image),
            file: None,
            description: caption_or_default(description),
            timestamp,
        }
    }

    /// Metadata-only copy, as kept in drafts.
    pub fn stub(&self) -> Self {
        PhotoEvidence {
            id: self.id,
            image: None,
            file: None,
            description: self.description.clone(),
            timestamp: self.timestamp,
        }
    }
}

fn caption_or_default(caption: &str) -> String {
    if caption.trim().is_empty() {
        DEFAULT_PHOTO_CAPTION.to_string()
    } else {
        caption.to_string()
    }
}

/// One complete inspection entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    // General information
    pub supervisor_name: String,
    pub supervisor_role: String,
    pub visit_date: String,
    pub visit_location: String,
    pub artist: String,
    pub sponsorship_value: String,

    // Event details
    pub sales_visibility_exclusivity: String,
    pub product_availability: String,
    pub purchase_commitment: String,
    pub capacity: String,

    // Brand activation
    pub brand_visibility: String,
    pub brand_activation: String,
    pub brand_moment: String,

    // Results
    pub sales_report: String,
    pub general_observations: String,

    pub geolocation: Geolocation,
    pub photos: Vec<PhotoEvidence>,
    /// Encoded signature image. Never serialized.
    #[serde(skip)]
    pub signature: Option<Vec<u8>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approximate_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_details: Option<LocationDetails>,
    pub location_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
}

impl Record {
    /// Checks the fields the form marks as required.
    pub fn validate(&self) -> Result<(), Error> {
        let missing: Vec<&'static str> = [
            ("visitDate", &self.visit_date),
            ("supervisorName", &self.supervisor_name),
            ("visitLocation", &self.visit_location),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingFields(missing))
        }
    }

    /// Download name: `Acta_Supervisión_<date>_<location>.pdf`, with every
    /// character of the location outside `[A-Za-z0-9]` replaced by `_`.
    pub fn file_name(&self) -> String {
        let location: String = self
            .visit_location
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("Acta_Supervisión_{}_{}.pdf", self.visit_date, location)
    }

    pub fn add_photo(&mut self, photo: PhotoEvidence) {
        self.photos.push(photo);
    }

    /// Returns false when no photo has that id.
    pub fn set_photo_caption(&mut self, id: u64, caption: &str) -> bool {
        match self.photos.iter_mut().find(|p| p.id == id) {
            Some(photo) => {
                photo.description = caption_or_default(caption);
                true
            }
            None => false,
        }
    }

    pub fn remove_photo(&mut self, id: u64) -> bool {
        let before = self.photos.len();
        self.photos.retain(|p| p.id != id);
        self.photos.len() != before
    }
}

/// One label/value pair of a flowing table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub value: Option<String>,
}

impl TableRow {
    pub fn new(label: &str, value: &str) -> Self {
        TableRow {
            label: label.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// Blank values print as "N/A".
    pub fn display_value(&self) -> &str {
        match self.value.as_deref() {
            Some(v) if !v.trim().is_empty() => v,
            _ => "N/A",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn validate_reports_every_blank_required_field() {
        let record = Record {
            supervisor_name: "Ana".into(),
            visit_location: "  ".into(),
            ..Default::default()
        };
        match record.validate() {
            Err(Error::MissingFields(fields)) => {
                assert_eq!(fields, vec!["visitDate", "visitLocation"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_complete_record() {
        let record = Record {
            supervisor_name: "Ana".into(),
            visit_date: "2024-05-01".into(),
            visit_location: "Teatro".into(),
            ..Default::default()
        };
        assert!(record.validate().is_ok());
    }

    #[test]
    fn file_name_replaces_non_alphanumerics() {
        let record = Record {
            visit_date: "2024-05-01".into(),
            visit_location: "Plaza Mayor, Bogotá".into(),
            ..Default::default()
        };
        assert_eq!(
            record.file_name(),
            "Acta_Supervisión_2024-05-01_Plaza_Mayor__Bogot_.pdf"
        );
    }

    #[test]
    fn photo_caption_edit_and_delete() {
        let mut record = Record::default();
        record.add_photo(PhotoEvidence::new(1, vec![1, 2], "", ts()));
        record.add_photo(PhotoEvidence::new(2, vec![3], "stage", ts()));
        assert_eq!(record.photos[0].description, DEFAULT_PHOTO_CAPTION);

        assert!(record.set_photo_caption(2, "main stage"));
        assert_eq!(record.photos[1].description, "main stage");
        assert!(!record.set_photo_caption(9, "nothing"));

        assert!(record.remove_photo(1));
        assert!(!record.remove_photo(1));
        assert_eq!(record.photos.len(), 1);
        assert_eq!(record.photos[0].id, 2);
    }

    #[test]
    fn zero_coordinates_are_not_an_acquired_reading() {
        let at_origin = Geolocation {
            lat: Some(0.0),
            lon: Some(-74.08),
            ..Default::default()
        };
        assert_eq!(at_origin.coordinates(), Some((0.0, -74.08)));
        assert_eq!(at_origin.acquired_coordinates(), None);

        let reading = Geolocation {
            lat: Some(4.6),
            lon: Some(-74.08),
            ..Default::default()
        };
        assert_eq!(reading.acquired_coordinates(), Some((4.6, -74.08)));
    }

    #[test]
    fn blank_values_display_as_na() {
        assert_eq!(TableRow::new("Aforo:", "").display_value(), "N/A");
        let absent = TableRow {
            label: "Aforo:".into(),
            value: None,
        };
        assert_eq!(absent.display_value(), "N/A");
        assert_eq!(TableRow::new("Aforo:", "500").display_value(), "500");
    }
}
