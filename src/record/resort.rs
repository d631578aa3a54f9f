use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::de;
use super::field::{FieldError, FieldValue, ResortField};

/// Backend-assigned record identifier (`_id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An `{open, total}` pair used for runs and lifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTotal {
    #[serde(default, deserialize_with = "de::count_or_zero")]
    pub open: u32,
    #[serde(default, deserialize_with = "de::count_or_zero")]
    pub total: u32,
}

impl OpenTotal {
    pub const fn new(open: u32, total: u32) -> Self {
        Self { open, total }
    }
}

impl fmt::Display for OpenTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.open, self.total)
    }
}

/// A WGS84 point, stored on the wire as GeoJSON `{type: "Point", coordinates: [lng, lat]}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Build a point, rejecting coordinates outside the valid ranges.
    pub fn new(lng: f64, lat: f64) -> Option<Self> {
        let valid = (-180.0..=180.0).contains(&lng) && (-90.0..=90.0).contains(&lat);
        valid.then_some(Self { lng, lat })
    }

    pub(super) fn from_geojson(value: &Value) -> Option<Self> {
        let coords = value.get("coordinates")?.as_array()?;
        let lng = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        Self::new(lng, lat)
    }

    pub fn to_geojson(self) -> Value {
        json!({ "type": "Point", "coordinates": [self.lng, self.lat] })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lng, self.lat)
    }
}

impl Serialize for GeoPoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_geojson().serialize(serializer)
    }
}

/// A ski resort as stored by the backend.
///
/// Field names on the wire are camelCase except `_id` and `skiable_terrain`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resort {
    #[serde(rename = "_id", default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::text")]
    pub province: String,
    #[serde(default, deserialize_with = "de::text")]
    pub country: String,
    #[serde(default, deserialize_with = "de::text")]
    pub website: String,
    #[serde(default, deserialize_with = "de::text")]
    pub information: String,
    #[serde(default, deserialize_with = "de::text")]
    pub longest_run: String,
    #[serde(default, deserialize_with = "de::text")]
    pub base_elevation: String,
    #[serde(default, deserialize_with = "de::text")]
    pub top_elevation: String,
    #[serde(default, deserialize_with = "de::text")]
    pub notes: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub flagged: bool,
    #[serde(default, deserialize_with = "de::tally")]
    pub runs: OpenTotal,
    #[serde(default, deserialize_with = "de::count")]
    pub terrain_parks: Option<u32>,
    #[serde(default, deserialize_with = "de::tally")]
    pub lifts: OpenTotal,
    #[serde(default, deserialize_with = "de::count")]
    pub gondolas: Option<u32>,
    #[serde(rename = "skiable_terrain", default, deserialize_with = "de::text")]
    pub skiable_terrain: String,
    #[serde(default, deserialize_with = "de::nested")]
    pub snow_cats: Option<Value>,
    #[serde(default, deserialize_with = "de::nested")]
    pub helicopters: Option<Value>,
    #[serde(default, deserialize_with = "de::text")]
    pub mapbox_vector: String,
    #[serde(default, deserialize_with = "de::pass_refs")]
    pub ski_passes: Vec<RecordId>,
    #[serde(default, deserialize_with = "de::location")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Resort {
    /// Create a resort with only a name set, as the "add resort" prompt does.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Read a field as a tagged value.
    pub fn get(&self, field: ResortField) -> FieldValue {
        match field {
            ResortField::Name => FieldValue::Text(self.name.clone()),
            ResortField::Province => FieldValue::Text(self.province.clone()),
            ResortField::Country => FieldValue::Text(self.country.clone()),
            ResortField::Website => FieldValue::Text(self.website.clone()),
            ResortField::Information => FieldValue::Text(self.information.clone()),
            ResortField::LongestRun => FieldValue::Text(self.longest_run.clone()),
            ResortField::BaseElevation => FieldValue::Text(self.base_elevation.clone()),
            ResortField::TopElevation => FieldValue::Text(self.top_elevation.clone()),
            ResortField::Notes => FieldValue::Text(self.notes.clone()),
            ResortField::Flagged => FieldValue::Flag(self.flagged),
            ResortField::Runs => FieldValue::Tally(self.runs),
            ResortField::TerrainParks => FieldValue::Count(self.terrain_parks),
            ResortField::Lifts => FieldValue::Tally(self.lifts),
            ResortField::Gondolas => FieldValue::Count(self.gondolas),
            ResortField::SkiableTerrain => FieldValue::Text(self.skiable_terrain.clone()),
            ResortField::SnowCats => FieldValue::Json(self.snow_cats.clone()),
            ResortField::Helicopters => FieldValue::Json(self.helicopters.clone()),
            ResortField::MapboxVector => FieldValue::Text(self.mapbox_vector.clone()),
            ResortField::SkiPasses => FieldValue::Passes(self.ski_passes.clone()),
            ResortField::Location => FieldValue::Location(self.location),
        }
    }

    /// Overwrite a field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::KindMismatch`] if the value's kind does not match
    /// the field's kind. The record is left untouched in that case.
    pub fn set(&mut self, field: ResortField, value: FieldValue) -> Result<(), FieldError> {
        field.check(&value)?;
        match (field, value) {
            (ResortField::Name, FieldValue::Text(v)) => self.name = v,
            (ResortField::Province, FieldValue::Text(v)) => self.province = v,
            (ResortField::Country, FieldValue::Text(v)) => self.country = v,
            (ResortField::Website, FieldValue::Text(v)) => self.website = v,
            (ResortField::Information, FieldValue::Text(v)) => self.information = v,
            (ResortField::LongestRun, FieldValue::Text(v)) => self.longest_run = v,
            (ResortField::BaseElevation, FieldValue::Text(v)) => self.base_elevation = v,
            (ResortField::TopElevation, FieldValue::Text(v)) => self.top_elevation = v,
            (ResortField::Notes, FieldValue::Text(v)) => self.notes = v,
            (ResortField::Flagged, FieldValue::Flag(v)) => self.flagged = v,
            (ResortField::Runs, FieldValue::Tally(v)) => self.runs = v,
            (ResortField::TerrainParks, FieldValue::Count(v)) => self.terrain_parks = v,
            (ResortField::Lifts, FieldValue::Tally(v)) => self.lifts = v,
            (ResortField::Gondolas, FieldValue::Count(v)) => self.gondolas = v,
            (ResortField::SkiableTerrain, FieldValue::Text(v)) => self.skiable_terrain = v,
            (ResortField::SnowCats, FieldValue::Json(v)) => self.snow_cats = v,
            (ResortField::Helicopters, FieldValue::Json(v)) => self.helicopters = v,
            (ResortField::MapboxVector, FieldValue::Text(v)) => self.mapbox_vector = v,
            (ResortField::SkiPasses, FieldValue::Passes(v)) => self.ski_passes = v,
            (ResortField::Location, FieldValue::Location(v)) => self.location = v,
            // `check` already rejected every other combination.
            (field, value) => {
                return Err(FieldError::KindMismatch {
                    field,
                    expected: field.kind(),
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }
}
