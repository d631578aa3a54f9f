use reqwest::blocking::multipart::{Form, Part};
use serde_json::{Value, json};

use crate::record::{FieldValue, Resort, ResortField};

const GEOJSON_MIME: &str = "application/geo+json";

/// One multipart form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadPart {
    Text(String),
    File {
        file_name: String,
        mime: &'static str,
        bytes: Vec<u8>,
    },
}

/// The multipart body the backend expects for a resort create or update.
///
/// Built as a plain list so it can be inspected before it is turned into a
/// `reqwest` form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResortPayload {
    parts: Vec<(&'static str, PayloadPart)>,
}

impl ResortPayload {
    /// Body for `POST /resorts/ingest`.
    pub fn for_create(resort: &Resort) -> Self {
        let mut payload = Self::default();
        payload.push_fields(resort);
        payload
    }

    /// Body for `PUT /resorts/{id}`: the full record, led by `_id`.
    pub fn for_update(resort: &Resort) -> Self {
        let mut payload = Self::default();
        payload.push_text("_id", resort.id.to_string());
        payload.push_fields(resort);
        payload
    }

    fn push_fields(&mut self, resort: &Resort) {
        for field in ResortField::ALL {
            self.push_text(field.wire_name(), wire_text(&resort.get(field)));
        }
        if let Some(point) = resort.location {
            let feature = json!({
                "type": "Feature",
                "properties": { "name": resort.name },
                "geometry": point.to_geojson(),
            });
            self.parts.push((
                "geoJSONFile",
                PayloadPart::File {
                    file_name: "location.geojson".to_string(),
                    mime: GEOJSON_MIME,
                    bytes: feature.to_string().into_bytes(),
                },
            ));
        }
        if let Some(url) = &resort.image_url {
            self.push_text("existingImageUrl", url.clone());
        }
    }

    fn push_text(&mut self, name: &'static str, value: String) {
        self.parts.push((name, PayloadPart::Text(value)));
    }

    pub fn parts(&self) -> &[(&'static str, PayloadPart)] {
        &self.parts
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parts.iter().map(|(name, _)| *name)
    }

    /// The text value of part `name`, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, part)| match part {
            PayloadPart::Text(value) if *n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Build the multipart form.
    ///
    /// # Errors
    ///
    /// Fails only if a part carries an invalid MIME type.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, part) in self.parts {
            form = match part {
                PayloadPart::Text(value) => form.text(name, value),
                PayloadPart::File {
                    file_name,
                    mime,
                    bytes,
                } => form.part(name, Part::bytes(bytes).file_name(file_name).mime_str(mime)?),
            };
        }
        Ok(form)
    }
}

/// Encode a field value the way the multipart endpoints read it.
///
/// Absent optional values become empty strings; structured values are JSON text.
pub fn wire_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Flag(flag) => flag.to_string(),
        FieldValue::Count(count) => count.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::Tally(tally) => json!({ "open": tally.open, "total": tally.total }).to_string(),
        FieldValue::Json(value) => value.as_ref().map(Value::to_string).unwrap_or_default(),
        FieldValue::Passes(ids) => {
            Value::Array(ids.iter().map(|id| Value::from(id.as_str())).collect()).to_string()
        }
        FieldValue::Location(point) => point
            .map(|p| p.to_geojson().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{GeoPoint, OpenTotal, RecordId};

    fn sample() -> Resort {
        Resort {
            id: RecordId::from("r1"),
            country: "USA".into(),
            flagged: true,
            runs: OpenTotal::new(10, 40),
            gondolas: Some(2),
            ski_passes: vec![RecordId::from("p1"), RecordId::from("p2")],
            ..Resort::named("Alta")
        }
    }

    #[test]
    fn test_update_payload_uses_backend_field_names() {
        let payload = ResortPayload::for_update(&sample());
        let names: Vec<_> = payload.names().collect();
        assert_eq!(
            names,
            vec![
                "_id",
                "name",
                "province",
                "country",
                "website",
                "information",
                "longestRun",
                "baseElevation",
                "topElevation",
                "notes",
                "flagged",
                "runs",
                "terrainParks",
                "lifts",
                "gondolas",
                "skiable_terrain",
                "snowCats",
                "helicopters",
                "mapboxVector",
                "skiPasses",
                "location",
            ]
        );
    }

    #[test]
    fn test_create_payload_has_no_id() {
        let payload = ResortPayload::for_create(&sample());
        assert!(payload.text("_id").is_none());
        assert_eq!(payload.text("name"), Some("Alta"));
    }

    #[test]
    fn test_structured_values_are_json_text() {
        let payload = ResortPayload::for_update(&sample());
        assert_eq!(payload.text("_id"), Some("r1"));
        assert_eq!(payload.text("flagged"), Some("true"));
        assert_eq!(payload.text("runs"), Some(r#"{"open":10,"total":40}"#));
        assert_eq!(payload.text("terrainParks"), Some(""));
        assert_eq!(payload.text("gondolas"), Some("2"));
        assert_eq!(payload.text("skiPasses"), Some(r#"["p1","p2"]"#));
        assert_eq!(payload.text("snowCats"), Some(""));
        assert_eq!(payload.text("location"), Some(""));
    }

    #[test]
    fn test_location_adds_geojson_file_and_image_url() {
        let resort = Resort {
            location: GeoPoint::new(-111.6, 40.6),
            image_url: Some("https://example.test/alta.jpg".into()),
            ..sample()
        };
        let payload = ResortPayload::for_update(&resort);
        let location: Value = serde_json::from_str(payload.text("location").unwrap()).unwrap();
        assert_eq!(location["type"], "Point");
        assert_eq!(location["coordinates"][0], -111.6);

        let file = payload
            .parts()
            .iter()
            .find(|(name, _)| *name == "geoJSONFile")
            .map(|(_, part)| part)
            .unwrap();
        assert!(matches!(file, PayloadPart::File { mime, .. } if *mime == GEOJSON_MIME));
        assert_eq!(
            payload.text("existingImageUrl"),
            Some("https://example.test/alta.jpg")
        );
    }

    #[test]
    fn test_into_form_accepts_every_part() {
        let resort = Resort {
            location: GeoPoint::new(1.0, 2.0),
            ..sample()
        };
        assert!(ResortPayload::for_update(&resort).into_form().is_ok());
    }
}
