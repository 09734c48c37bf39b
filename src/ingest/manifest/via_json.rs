//! VIA JSON export.
//!
//! An object keyed by image (`"<filename><size>"`), each entry carrying its
//! own `filename`, `file_attributes` and `regions`. Full project saves wrap
//! the same map in `_via_img_metadata`. Regions are an array in VIA 2 and an
//! index-keyed object in VIA 1; both are accepted. Entry order is preserved.

use serde::Deserialize;
use serde_json::Value;

use super::{AnnotationRecord, ManifestError, ManifestFormat, RawRegion};

/// VIA JSON manifest format.
pub struct ViaJsonFormat;

#[derive(Debug, Deserialize)]
struct ViaEntry {
    filename: String,
    #[serde(default)]
    file_attributes: Value,
    #[serde(default)]
    regions: Value,
}

#[derive(Debug, Deserialize)]
struct ViaRegion {
    #[serde(default)]
    shape_attributes: Value,
    #[serde(default)]
    region_attributes: Value,
}

impl ManifestFormat for ViaJsonFormat {
    fn id(&self) -> &'static str {
        "via-json"
    }

    fn display_name(&self) -> &'static str {
        "VIA annotations (JSON)"
    }

    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    fn parse(&self, content: &str) -> Result<Vec<AnnotationRecord>, ManifestError> {
        let root: Value = serde_json::from_str(content)?;
        let root = root.get("_via_img_metadata").unwrap_or(&root);
        let entries = root.as_object().ok_or_else(|| ManifestError::InvalidRecord {
            row: 0,
            message: "expected an object of image entries".to_string(),
        })?;

        let mut records = Vec::new();
        for (key, value) in entries {
            let entry: ViaEntry =
                serde_json::from_value(value.clone()).map_err(|e| ManifestError::InvalidRecord {
                    row: records.len() + 1,
                    message: format!("entry '{key}': {e}"),
                })?;

            let filename = entry.filename.trim().to_string();
            if filename.is_empty() {
                return Err(ManifestError::InvalidRecord {
                    row: records.len() + 1,
                    message: format!("entry '{key}' has an empty filename"),
                });
            }

            let regions = region_values(&entry.regions);
            if regions.is_empty() {
                records.push(AnnotationRecord {
                    row: records.len() + 1,
                    filename,
                    file_attributes: entry.file_attributes,
                    region: None,
                });
                continue;
            }

            for region in regions {
                let row = records.len() + 1;
                let region: ViaRegion = serde_json::from_value(region.clone()).map_err(|e| {
                    ManifestError::InvalidRecord {
                        row,
                        message: format!("region of '{filename}': {e}"),
                    }
                })?;
                records.push(AnnotationRecord {
                    row,
                    filename: filename.clone(),
                    file_attributes: entry.file_attributes.clone(),
                    region: RawRegion::from_values(
                        region.shape_attributes,
                        region.region_attributes,
                    ),
                });
            }
        }

        log::trace!("Parsed {} JSON records", records.len());
        Ok(records)
    }
}

/// Regions as a list, whether stored as an array or an index-keyed object.
fn region_values(regions: &Value) -> Vec<&Value> {
    match regions {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_export() {
        let content = json!({
            "sink.jpg52311": {
                "filename": "sink.jpg",
                "size": 52311,
                "file_attributes": {"type": "plumbing", "difficulty": "hard"},
                "regions": [
                    {
                        "shape_attributes": {"name": "rect", "x": 1, "y": 2, "width": 3, "height": 4},
                        "region_attributes": {"isCorrect": "true", "label": "drip"}
                    },
                    {
                        "shape_attributes": {"name": "circle", "cx": 5, "cy": 5, "r": 2},
                        "region_attributes": {"isCorrect": "false"}
                    }
                ]
            },
            "attic.png10": {
                "filename": "attic.png",
                "file_attributes": {},
                "regions": []
            }
        })
        .to_string();

        let records = ViaJsonFormat.parse(&content).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].filename, "sink.jpg");
        assert_eq!(records[0].file_attributes["difficulty"], "hard");
        assert_eq!(records[1].region.as_ref().unwrap().shape["name"], "circle");
        assert_eq!(records[2].filename, "attic.png");
        assert!(records[2].region.is_none());
        assert_eq!(
            records.iter().map(|r| r.row).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_entry_order_preserved() {
        let content = r#"{
            "z.jpg1": {"filename": "z.jpg", "regions": []},
            "a.jpg1": {"filename": "a.jpg", "regions": []}
        }"#;
        let records = ViaJsonFormat.parse(content).unwrap();
        assert_eq!(records[0].filename, "z.jpg");
        assert_eq!(records[1].filename, "a.jpg");
    }

    #[test]
    fn test_project_wrapper_and_keyed_regions() {
        let content = json!({
            "_via_settings": {},
            "_via_img_metadata": {
                "a.jpg1": {
                    "filename": "a.jpg",
                    "regions": {
                        "0": {
                            "shape_attributes": {"name": "ellipse", "cx": 1, "cy": 1, "rx": 1, "ry": 1},
                            "region_attributes": {}
                        }
                    }
                }
            }
        })
        .to_string();

        let records = ViaJsonFormat.parse(&content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_attributes, Value::Null);
        assert!(records[0].region.is_some());
    }

    #[test]
    fn test_invalid_root() {
        assert!(matches!(
            ViaJsonFormat.parse("[1, 2]"),
            Err(ManifestError::InvalidRecord { .. })
        ));
        assert!(matches!(
            ViaJsonFormat.parse("{"),
            Err(ManifestError::Json(_))
        ));
    }

    #[test]
    fn test_missing_filename() {
        let content = r#"{"a": {"regions": []}}"#;
        assert!(matches!(
            ViaJsonFormat.parse(content),
            Err(ManifestError::InvalidRecord { row: 1, .. })
        ));
    }
}
