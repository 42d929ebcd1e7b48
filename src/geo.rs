use serde::Deserialize;

use crate::error::Error;
use crate::model::{Geolocation, LocationDetails, Record};

const NO_ADDRESS: &str = "Dirección no disponible";
const NO_NEIGHBORHOOD: &str = "Barrio no disponible";
const NO_CITY: &str = "Ciudad no disponible";
const NO_STATE: &str = "Estado no disponible";
const NO_COUNTRY: &str = "País no disponible";

/// Resolves coordinates to a human-readable address. Implementations do the
/// network round trip; `None` means the lookup failed or found nothing.
pub trait Geocoder {
    fn reverse(&self, lat: f64, lon: f64) -> Option<LocationDetails>;
}

/// Request URL for an OpenStreetMap Nominatim reverse lookup.
pub fn nominatim_reverse_url(lat: f64, lon: f64) -> String {
    format!(
        "https://nominatim.openstreetmap.org/reverse?format=json&lat={lat}&lon={lon}&zoom=18&addressdetails=1"
    )
}

/// Embeddable OpenStreetMap view of a 0.02 degree box around the point.
pub fn map_url(lat: f64, lon: f64) -> String {
    format!(
        "https://www.openstreetmap.org/export/embed.html?bbox={}%2C{}%2C{}%2C{}&layer=mapnik&marker={lat}%2C{lon}",
        lon - 0.01,
        lat - 0.01,
        lon + 0.01,
        lat + 0.01,
    )
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct NominatimResponse {
    display_name: Option<String>,
    address: NominatimAddress,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct NominatimAddress {
    suburb: Option<String>,
    neighbourhood: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// First candidate that is present and not blank, else `fallback`.
fn first_of(candidates: &[&Option<String>], fallback: &str) -> String {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

impl LocationDetails {
    /// Maps a Nominatim reverse-geocoding JSON body. Attributes the service
    /// did not return get a "no disponible" placeholder.
    pub fn from_nominatim(body: &str) -> Result<Self, Error> {
        let resp: NominatimResponse = serde_json::from_str(body)?;
        let a = &resp.address;
        Ok(LocationDetails {
            address: first_of(&[&resp.display_name], NO_ADDRESS),
            neighborhood: first_of(&[&a.suburb, &a.neighbourhood], NO_NEIGHBORHOOD),
            city: first_of(&[&a.city, &a.town, &a.village], NO_CITY),
            state: first_of(&[&a.state], NO_STATE),
            country: first_of(&[&a.country], NO_COUNTRY),
            map_image_url: None,
            verified_at: None,
        })
    }
}

impl Geolocation {
    /// Tamper-evidence code over the fix: "GEO-<hash>-<lat>-<lon>". The hash
    /// is a 32-bit shift-and-subtract hash of "lat,lon,timestamp" with six
    /// decimals per coordinate. `None` unless all three values are non-zero.
    pub fn verification_code(&self) -> Option<String> {
        let (lat, lon) = self.acquired_coordinates()?;
        let timestamp = self.timestamp?;
        if timestamp == 0 {
            return None;
        }

        let source = format!("{lat:.6},{lon:.6},{timestamp}");
        let hash = source.encode_utf16().fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        });

        Some(format!(
            "GEO-{:X}-{lat:.2}-{lon:.2}",
            i64::from(hash).unsigned_abs()
        ))
    }
}

impl Record {
    /// Store a fresh position fix and mark it verified when a code can be
    /// derived from it.
    pub fn set_location(&mut self, fix: Geolocation) {
        self.verification_code = fix.verification_code();
        self.location_verified = self.verification_code.is_some();
        self.geolocation = fix;
    }

    /// Copy reverse-geocoded details onto the record, adding the map link.
    pub fn apply_location_details(&mut self, mut details: LocationDetails, verified_at: i64) {
        if let Some((lat, lon)) = self.geolocation.coordinates() {
            details.map_image_url = Some(map_url(lat, lon));
        }
        details.verified_at = Some(verified_at);
        self.approximate_address = Some(details.address.clone());
        self.neighborhood = Some(details.neighborhood.clone());
        self.location_details = Some(details);
    }
}

/// Record `fix` and, when the geocoder answers, the address around it.
/// Returns whether address details were found.
pub fn locate(record: &mut Record, fix: Geolocation, geocoder: &dyn Geocoder) -> bool {
    record.set_location(fix);
    let Some((lat, lon)) = record.geolocation.acquired_coordinates() else {
        return false;
    };

    match geocoder.reverse(lat, lon) {
        Some(details) => {
            let verified_at = chrono::Utc::now().timestamp_millis();
            record.apply_location_details(details, verified_at);
            true
        }
        None => {
            log::warn!("No address found for {lat:.4}, {lon:.4}");
            false
        }
    }
}
