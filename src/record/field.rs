use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::resort::{GeoPoint, OpenTotal, RecordId};

/// Every field of a resort that can be staged and sent to the backend.
///
/// Declaration order is the order fields appear in an update payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResortField {
    Name,
    Province,
    Country,
    Website,
    Information,
    LongestRun,
    BaseElevation,
    TopElevation,
    Notes,
    Flagged,
    Runs,
    TerrainParks,
    Lifts,
    Gondolas,
    SkiableTerrain,
    SnowCats,
    Helicopters,
    MapboxVector,
    SkiPasses,
    Location,
}

/// Shape of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    Count,
    Tally,
    Json,
    Passes,
    Location,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Flag => "yes/no",
            Self::Count => "count",
            Self::Tally => "open/total",
            Self::Json => "json",
            Self::Passes => "ski pass ids",
            Self::Location => "lng, lat",
        };
        f.write_str(name)
    }
}

/// A field value held in the pending change set or read from a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Count(Option<u32>),
    Tally(OpenTotal),
    Json(Option<Value>),
    Passes(Vec<RecordId>),
    Location(Option<GeoPoint>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{field} expects {expected}, got {found}")]
    KindMismatch {
        field: ResortField,
        expected: FieldKind,
        found: FieldKind,
    },
    #[error("{field}: cannot read {input:?} as {expected}")]
    Parse {
        field: ResortField,
        input: String,
        expected: FieldKind,
    },
}

impl ResortField {
    pub const ALL: [Self; 20] = [
        Self::Name,
        Self::Province,
        Self::Country,
        Self::Website,
        Self::Information,
        Self::LongestRun,
        Self::BaseElevation,
        Self::TopElevation,
        Self::Notes,
        Self::Flagged,
        Self::Runs,
        Self::TerrainParks,
        Self::Lifts,
        Self::Gondolas,
        Self::SkiableTerrain,
        Self::SnowCats,
        Self::Helicopters,
        Self::MapboxVector,
        Self::SkiPasses,
        Self::Location,
    ];

    /// Multipart form field name understood by the backend.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Province => "province",
            Self::Country => "country",
            Self::Website => "website",
            Self::Information => "information",
            Self::LongestRun => "longestRun",
            Self::BaseElevation => "baseElevation",
            Self::TopElevation => "topElevation",
            Self::Notes => "notes",
            Self::Flagged => "flagged",
            Self::Runs => "runs",
            Self::TerrainParks => "terrainParks",
            Self::Lifts => "lifts",
            Self::Gondolas => "gondolas",
            Self::SkiableTerrain => "skiable_terrain",
            Self::SnowCats => "snowCats",
            Self::Helicopters => "helicopters",
            Self::MapboxVector => "mapboxVector",
            Self::SkiPasses => "skiPasses",
            Self::Location => "location",
        }
    }

    /// Column heading.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Resort",
            Self::Province => "Province",
            Self::Country => "Country",
            Self::Website => "Website",
            Self::Information => "Information",
            Self::LongestRun => "Longest Run",
            Self::BaseElevation => "Base Elev.",
            Self::TopElevation => "Top Elev.",
            Self::Notes => "Notes",
            Self::Flagged => "Flag",
            Self::Runs => "Runs",
            Self::TerrainParks => "Parks",
            Self::Lifts => "Lifts",
            Self::Gondolas => "Gondolas",
            Self::SkiableTerrain => "Skiable Terrain",
            Self::SnowCats => "Snowcats",
            Self::Helicopters => "Heli",
            Self::MapboxVector => "Mapbox",
            Self::SkiPasses => "Passes",
            Self::Location => "Location",
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Flagged => FieldKind::Flag,
            Self::Runs | Self::Lifts => FieldKind::Tally,
            Self::TerrainParks | Self::Gondolas => FieldKind::Count,
            Self::SnowCats | Self::Helicopters => FieldKind::Json,
            Self::SkiPasses => FieldKind::Passes,
            Self::Location => FieldKind::Location,
            Self::Name
            | Self::Province
            | Self::Country
            | Self::Website
            | Self::Information
            | Self::LongestRun
            | Self::BaseElevation
            | Self::TopElevation
            | Self::Notes
            | Self::SkiableTerrain
            | Self::MapboxVector => FieldKind::Text,
        }
    }

    /// Verify that `value` can be stored in this field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::KindMismatch`] when the kinds differ.
    pub fn check(self, value: &FieldValue) -> Result<(), FieldError> {
        let found = value.kind();
        if found == self.kind() {
            Ok(())
        } else {
            Err(FieldError::KindMismatch {
                field: self,
                expected: self.kind(),
                found,
            })
        }
    }

    /// Parse text typed into a table cell into a value of this field's kind.
    ///
    /// Accepts exactly what [`FieldValue::edit_text`] produces, plus a few
    /// looser spellings.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Parse`] if the input does not fit the kind.
    pub fn parse_input(self, input: &str) -> Result<FieldValue, FieldError> {
        let trimmed = input.trim();
        let fail = || FieldError::Parse {
            field: self,
            input: input.to_string(),
            expected: self.kind(),
        };
        match self.kind() {
            FieldKind::Text => Ok(FieldValue::Text(trimmed.to_string())),
            FieldKind::Flag => match trimmed.to_ascii_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Ok(FieldValue::Flag(true)),
                "n" | "no" | "false" | "0" | "" => Ok(FieldValue::Flag(false)),
                _ => Err(fail()),
            },
            FieldKind::Count => {
                if trimmed.is_empty() {
                    return Ok(FieldValue::Count(None));
                }
                trimmed
                    .parse::<u32>()
                    .map(|n| FieldValue::Count(Some(n)))
                    .map_err(|_| fail())
            }
            FieldKind::Tally => {
                if trimmed.is_empty() {
                    return Ok(FieldValue::Tally(OpenTotal::default()));
                }
                let (open, total) = trimmed.split_once('/').ok_or_else(fail)?;
                let open = open.trim().parse::<u32>().map_err(|_| fail())?;
                let total = total.trim().parse::<u32>().map_err(|_| fail())?;
                Ok(FieldValue::Tally(OpenTotal::new(open, total)))
            }
            FieldKind::Json => {
                if trimmed.is_empty() {
                    return Ok(FieldValue::Json(None));
                }
                serde_json::from_str::<Value>(trimmed)
                    .map(|v| FieldValue::Json(Some(v).filter(|v| !v.is_null())))
                    .map_err(|_| fail())
            }
            FieldKind::Passes => Ok(FieldValue::Passes(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(RecordId::from)
                    .collect(),
            )),
            FieldKind::Location => {
                if trimmed.is_empty() {
                    return Ok(FieldValue::Location(None));
                }
                let (lng, lat) = trimmed.split_once(',').ok_or_else(fail)?;
                let lng = lng.trim().parse::<f64>().map_err(|_| fail())?;
                let lat = lat.trim().parse::<f64>().map_err(|_| fail())?;
                GeoPoint::new(lng, lat)
                    .map(|p| FieldValue::Location(Some(p)))
                    .ok_or_else(fail)
            }
        }
    }
}

impl fmt::Display for ResortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FieldValue {
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Flag(_) => FieldKind::Flag,
            Self::Count(_) => FieldKind::Count,
            Self::Tally(_) => FieldKind::Tally,
            Self::Json(_) => FieldKind::Json,
            Self::Passes(_) => FieldKind::Passes,
            Self::Location(_) => FieldKind::Location,
        }
    }

    /// Short human-readable form for table cells.
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Flag(true) => "yes".to_string(),
            Self::Flag(false) => "no".to_string(),
            Self::Count(n) => n.map(|n| n.to_string()).unwrap_or_default(),
            Self::Tally(t) => t.to_string(),
            Self::Json(None) => String::new(),
            Self::Json(Some(v)) => v.to_string(),
            Self::Passes(ids) => ids
                .iter()
                .map(RecordId::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Location(p) => p.map(|p| p.to_string()).unwrap_or_default(),
        }
    }

    /// Text used to seed the cell editor.
    pub fn edit_text(&self) -> String {
        match self {
            Self::Tally(t) => format!("{}/{}", t.open, t.total),
            Self::Passes(ids) => ids
                .iter()
                .map(RecordId::as_str)
                .collect::<Vec<_>>()
                .join(","),
            other => other.display(),
        }
    }
}
