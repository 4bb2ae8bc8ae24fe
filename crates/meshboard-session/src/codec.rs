//! Session document codec
//!
//! Wire format:
//!
//! ```json
//! { "uploaded_files": { "<id>": { "name": "...", "data": "<base64>",
//!                                 "size": 123, "visible": true } },
//!   "timestamp": "2024-05-01T12:34:56+02:00",
//!   "camera": { ... } }
//! ```
//!
//! `camera` and `version` are optional so documents written without them
//! still load.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Local, NaiveDateTime};
use meshboard_assets::Asset;
use meshboard_scene::CameraDescriptor;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub const FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    FORMAT_VERSION
}

/// One stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    /// Base64 (standard alphabet, padded) payload
    pub data: String,
    pub size: u64,
    pub visible: bool,
}

/// Serialized snapshot of a session. A new document is produced on every
/// save; documents are never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Records keyed by asset id, in listing order
    #[serde(with = "ordered_records")]
    pub uploaded_files: Vec<(String, AssetRecord)>,
    /// ISO-8601 creation time
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraDescriptor>,
}

impl SessionDocument {
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Creation time as local wall-clock time. Accepts RFC 3339 stamps as
    /// well as offset-less ones.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
    }
}

/// Assets and camera reconstructed from a document. Ids are freshly minted.
#[derive(Debug, Clone)]
pub struct RestoredSession {
    pub assets: Vec<Asset>,
    pub camera: Option<CameraDescriptor>,
}

/// Snapshot `assets` (in order) and the pinned camera into a document.
pub fn serialize(assets: &[Asset], camera: Option<&CameraDescriptor>) -> SessionDocument {
    let uploaded_files = assets
        .iter()
        .map(|asset| {
            let record = AssetRecord {
                name: asset.name().to_string(),
                data: STANDARD.encode(asset.payload()),
                size: asset.size() as u64,
                visible: asset.is_visible(),
            };
            (asset.id().to_string(), record)
        })
        .collect();

    SessionDocument {
        version: FORMAT_VERSION,
        uploaded_files,
        timestamp: Local::now().to_rfc3339(),
        camera: camera.copied(),
    }
}

/// Rebuild assets from a document, validating every record first.
pub fn deserialize(document: &SessionDocument) -> Result<RestoredSession, ParseError> {
    if document.created_at().is_none() {
        return Err(ParseError::Timestamp(document.timestamp.clone()));
    }

    let mut assets = Vec::with_capacity(document.uploaded_files.len());

    for (id, record) in &document.uploaded_files {
        let payload = STANDARD
            .decode(record.data.as_bytes())
            .map_err(|e| ParseError::Base64 {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        if payload.len() as u64 != record.size {
            return Err(ParseError::SizeMismatch {
                id: id.clone(),
                declared: record.size,
                actual: payload.len(),
            });
        }
        assets.push(Asset::restored(record.name.clone(), payload, record.visible));
    }

    Ok(RestoredSession {
        assets,
        camera: document.camera,
    })
}

/// Serde adapter storing `Vec<(String, AssetRecord)>` as a JSON object while
/// keeping key order and rejecting repeated keys.
mod ordered_records {
    use std::collections::HashSet;
    use std::fmt;

    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::AssetRecord;

    pub fn serialize<S>(records: &[(String, AssetRecord)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(records.len()))?;
        for (id, record) in records {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, AssetRecord)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordsVisitor)
    }

    struct RecordsVisitor;

    impl<'de> Visitor<'de> for RecordsVisitor {
        type Value = Vec<(String, AssetRecord)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of asset id to asset record")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut seen = HashSet::new();
            let mut records = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((id, record)) = access.next_entry::<String, AssetRecord>()? {
                if !seen.insert(id.clone()) {
                    return Err(de::Error::custom(format!("duplicate asset id '{}'", id)));
                }
                records.push((id, record));
            }
            Ok(records)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_assets() -> Vec<Asset> {
        vec![
            Asset::new("first.stl", b"solid first".to_vec()),
            Asset::restored("second.stl", vec![0u8, 159, 255, 1], false),
            Asset::new("first.stl", b"solid first".to_vec()),
        ]
    }

    fn tuples(assets: &[Asset]) -> Vec<(String, Vec<u8>, usize, bool)> {
        let mut out: Vec<_> = assets
            .iter()
            .map(|a| (a.name().to_string(), a.payload().to_vec(), a.size(), a.is_visible()))
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_round_trip_preserves_every_field_but_ids() {
        let assets = sample_assets();
        let json = serialize(&assets, None).to_json().unwrap();
        let restored = deserialize(&SessionDocument::from_json(&json).unwrap()).unwrap();

        assert_eq!(tuples(&restored.assets), tuples(&assets));
        assert!(restored.camera.is_none());
        for (before, after) in assets.iter().zip(&restored.assets) {
            assert_ne!(before.id(), after.id());
            assert_eq!(before.name(), after.name());
        }
    }

    #[test]
    fn test_wire_format_matches_schema() {
        let assets = vec![Asset::restored("a.stl", b"abc".to_vec(), false)];
        let document = serialize(&assets, None);
        let value: serde_json::Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();

        let id = assets[0].id().to_string();
        let record = &value["uploaded_files"][&id];
        assert_eq!(record["name"], "a.stl");
        assert_eq!(record["data"], "YWJj");
        assert_eq!(record["size"], 3);
        assert_eq!(record["visible"], false);
        assert!(value["timestamp"].is_string());
        assert!(value.get("camera").is_none());
        assert!(document.created_at().is_some());
    }

    #[test]
    fn test_accepts_documents_without_optional_fields() {
        let json = r#"{
            "uploaded_files": {
                "b7c2": { "name": "x.stl", "data": "AAEC", "size": 3, "visible": true },
                "a1f0": { "name": "y.stl", "data": "", "size": 0, "visible": false }
            },
            "timestamp": "2024-05-01T12:34:56.123456"
        }"#;
        let document = SessionDocument::from_json(json).unwrap();
        assert_eq!(document.version, FORMAT_VERSION);
        assert_eq!(document.uploaded_files[0].0, "b7c2");
        assert!(document.created_at().is_some());

        let restored = deserialize(&document).unwrap();
        assert_eq!(restored.assets[0].payload(), &[0, 1, 2]);
        assert_eq!(restored.assets[1].name(), "y.stl");
        assert!(!restored.assets[1].is_visible());
    }

    #[test]
    fn test_rejects_missing_fields() {
        let json = r#"{ "uploaded_files": { "a": { "name": "x.stl", "size": 1, "visible": true } },
                        "timestamp": "2024-05-01T12:34:56+02:00" }"#;
        assert!(matches!(
            SessionDocument::from_json(json),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            SessionDocument::from_json(r#"{ "timestamp": "2024-05-01T12:34:56+02:00" }"#),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            SessionDocument::from_json("[1, 2, 3]"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_bad_base64_and_size() {
        let mut document = serialize(&sample_assets(), None);
        document.uploaded_files[1].1.data = "!!not base64!!".to_string();
        assert!(matches!(
            deserialize(&document),
            Err(ParseError::Base64 { .. })
        ));

        let mut document = serialize(&sample_assets(), None);
        document.uploaded_files[0].1.size += 1;
        assert!(matches!(
            deserialize(&document),
            Err(ParseError::SizeMismatch { declared: 12, actual: 11, .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_timestamp() {
        let json = r#"{ "uploaded_files": {
                "a": { "name": "x.stl", "data": "AAEC", "size": 3, "visible": true } },
            "timestamp": "now" }"#;
        let document = SessionDocument::from_json(json).unwrap();
        assert!(document.created_at().is_none());
        assert_eq!(
            deserialize(&document).unwrap_err(),
            ParseError::Timestamp("now".to_string())
        );
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"{ "uploaded_files": {
                "same": { "name": "x.stl", "data": "", "size": 0, "visible": true },
                "same": { "name": "y.stl", "data": "", "size": 0, "visible": true } },
            "timestamp": "2024-05-01T12:34:56+02:00" }"#;
        assert!(matches!(
            SessionDocument::from_json(json),
            Err(ParseError::Json(msg)) if msg.contains("duplicate asset id")
        ));
    }
}
