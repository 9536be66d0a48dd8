use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Localized display label as returned by the backend, e.g. `{"tr": "Satılık", "en": "For Sale"}`
///
/// Locale entries that are not strings are dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalizedLabel(pub BTreeMap<String, String>);

impl LocalizedLabel {
    /// True if any locale variant equals `value`
    #[inline]
    pub fn contains(&self, value: &str) -> bool {
        self.0.values().any(|v| v == value)
    }
}

impl<'de> Deserialize<'de> for LocalizedLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(locale, value)| match value {
                Value::String(text) => Some((locale, text)),
                _ => None,
            })
            .collect())
    }
}

impl<K, V> FromIterator<(K, V)> for LocalizedLabel
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Price in a single currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

/// GeoJSON-style point. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Vec<f64>,
}

/// Non-numeric coordinate entries decode as NaN so the listing survives decoding
/// but never passes a proximity check.
fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .map(|v| v.as_f64().unwrap_or(f64::NAN))
        .collect())
}

impl GeoLocation {
    pub fn from_lat_lon(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: vec![longitude, latitude],
        }
    }

    /// Unpack `[lon, lat]` into `(lat, lon)`.
    ///
    /// Returns `None` unless exactly two finite values are present.
    #[inline]
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lon, lat] if lon.is_finite() && lat.is_finite() => Some((*lat, *lon)),
            _ => None,
        }
    }
}

/// Property listing as served by `GET /hotels`
///
/// Decoding goes through [`RawListing`]: a field of the wrong type decodes as
/// absent instead of rejecting the whole listing. Only a missing id is fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawListing")]
pub struct Listing {
    pub id: String,
    pub listing_type: Option<LocalizedLabel>,
    pub entrance_type: Option<LocalizedLabel>,
    pub housing_type: Option<LocalizedLabel>,
    pub price: Vec<Price>,
    pub project_area: Option<f64>,
    pub room_count: Option<u32>,
    pub bathroom_count: Option<u32>,
    pub room_as_text: Option<String>,
    pub feature_ids: Option<Vec<String>>,
    pub faces: Option<Vec<String>>,
    pub location: Option<GeoLocation>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Wire shape of a listing. Every field is read as loose JSON first.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawListing {
    #[serde(rename = "_id")]
    mongo_id: Value,
    id: Value,
    listing_type: Value,
    entrance_type: Value,
    housing_type: Value,
    price: Value,
    project_area: Value,
    room_count: Value,
    bathroom_count: Value,
    room_as_text: Value,
    feature_ids: Value,
    faces: Value,
    location: Value,
    created_at: Value,
}

impl TryFrom<RawListing> for Listing {
    type Error = String;

    fn try_from(raw: RawListing) -> Result<Self, Self::Error> {
        // `_id` wins when a document carries both keys
        let id = loose_id(raw.mongo_id)
            .or_else(|| loose_id(raw.id))
            .ok_or_else(|| "listing has no `_id` or `id`".to_string())?;

        Ok(Self {
            id,
            listing_type: loose(raw.listing_type),
            entrance_type: loose(raw.entrance_type),
            housing_type: loose(raw.housing_type),
            price: loose_prices(raw.price),
            project_area: raw.project_area.as_f64().filter(|a| a.is_finite()),
            room_count: loose_count(&raw.room_count),
            bathroom_count: loose_count(&raw.bathroom_count),
            room_as_text: loose(raw.room_as_text),
            feature_ids: loose_strings(raw.feature_ids),
            faces: loose_strings(raw.faces),
            location: loose(raw.location),
            created_at: loose(raw.created_at),
        })
    }
}

fn loose<T: serde::de::DeserializeOwned>(value: Value) -> Option<T> {
    match value {
        Value::Null => None,
        value => serde_json::from_value(value).ok(),
    }
}

fn loose_id(value: Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative integral numbers, including floats such as `3.0`
fn loose_count(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }

    value
        .as_f64()
        .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}

fn loose_prices(value: Value) -> Vec<Price> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(loose).collect(),
        _ => Vec::new(),
    }
}

fn loose_strings(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

impl Listing {
    /// Bare listing with only an id; every other field absent
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            listing_type: None,
            entrance_type: None,
            housing_type: None,
            price: Vec::new(),
            project_area: None,
            room_count: None,
            bathroom_count: None,
            room_as_text: None,
            feature_ids: None,
            faces: None,
            location: None,
            created_at: None,
        }
    }

    /// Price entry for `currency`, compared ASCII case-insensitively
    pub fn price_in(&self, currency: &str) -> Option<f64> {
        self.price
            .iter()
            .find(|p| p.currency.eq_ignore_ascii_case(currency))
            .map(|p| p.amount)
    }

    /// Listing position as `(lat, lon)`, if it carries a valid coordinate pair
    #[inline]
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        self.location.as_ref().and_then(GeoLocation::lat_lon)
    }
}

/// Location picked in the search box: a point plus a radius in kilometres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    /// `[longitude, latitude]`
    #[serde(default)]
    pub coordinates: Option<Vec<f64>>,
    #[serde(default = "default_radius_km")]
    pub radius: f64,
}

impl SelectedLocation {
    pub fn new(latitude: f64, longitude: f64, radius: f64) -> Self {
        Self {
            coordinates: Some(vec![longitude, latitude]),
            radius,
        }
    }

    /// Target point as `(lat, lon)`
    pub fn target(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_deref() {
            Some([lon, lat]) => Some((*lat, *lon)),
            _ => None,
        }
    }
}

pub const DEFAULT_RADIUS_KM: f64 = 10.0;

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

/// Filter criteria assembled from the search UI.
///
/// Every field is optional; an empty field skips its stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub listing_type: Option<String>,
    pub location: Option<SelectedLocation>,
    pub property_type: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub room_count: Option<u32>,
    pub bathroom_count: Option<u32>,
    pub interior_features: Vec<String>,
    pub exterior_features: Vec<String>,
    pub accessibility_features: Vec<String>,
    pub face_features: Vec<String>,
    pub is_new: bool,
    pub one_plus_one: bool,
    pub two_plus_one: bool,
    pub three_plus_one: bool,
    pub quick_filter_ids: Vec<String>,
}

impl FilterCriteria {
    /// True if no field is set, so every listing matches
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Room-shape labels selected through the shortcut toggles
    pub fn room_shapes(&self) -> Vec<&'static str> {
        [
            (self.one_plus_one, "1+1"),
            (self.two_plus_one, "2+1"),
            (self.three_plus_one, "3+1"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}

/// Listing paired with its distance from a search point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyListing {
    pub listing: Listing,
    pub distance_km: f64,
}
