//! VIA CSV export.
//!
//! One row per region:
//!
//! ```text
//! filename,file_size,file_attributes,region_count,region_id,region_shape_attributes,region_attributes
//! sink.jpg,52311,"{""type"":""plumbing""}",1,0,"{""name"":""rect"",""x"":10,...}","{""isCorrect"":""true"",""label"":""drip""}"
//! ```
//!
//! Only `filename`, `region_shape_attributes` and `region_attributes` are
//! required; older exports name the first column `#filename`.

use serde::Deserialize;

use super::{AnnotationRecord, ManifestError, ManifestFormat, RawRegion, parse_json_column};

/// VIA CSV manifest format.
pub struct ViaCsvFormat;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "#filename")]
    filename: String,
    #[serde(default)]
    file_attributes: String,
    region_shape_attributes: String,
    region_attributes: String,
}

impl ManifestFormat for ViaCsvFormat {
    fn id(&self) -> &'static str {
        "via-csv"
    }

    fn display_name(&self) -> &'static str {
        "VIA annotations (CSV)"
    }

    fn extensions(&self) -> &[&'static str] {
        &["csv"]
    }

    fn parse(&self, content: &str) -> Result<Vec<AnnotationRecord>, ManifestError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row_number = index + 1;
            let row = row?;

            let filename = row.filename.trim();
            if filename.is_empty() {
                return Err(ManifestError::InvalidRecord {
                    row: row_number,
                    message: "empty filename".to_string(),
                });
            }

            let file_attributes =
                parse_json_column(&row.file_attributes, row_number, "file_attributes")?;
            let shape = parse_json_column(
                &row.region_shape_attributes,
                row_number,
                "region_shape_attributes",
            )?;
            let attributes =
                parse_json_column(&row.region_attributes, row_number, "region_attributes")?;

            records.push(AnnotationRecord {
                row: row_number,
                filename: filename.to_string(),
                file_attributes,
                region: RawRegion::from_values(shape, attributes),
            });
        }

        log::trace!("Parsed {} CSV records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HEADER: &str = "filename,file_size,file_attributes,region_count,region_id,region_shape_attributes,region_attributes";

    #[test]
    fn test_parse_rows() {
        let csv = format!(
            "{HEADER}\n\
             sink.jpg,100,\"{{\"\"type\"\":\"\"plumbing\"\"}}\",2,0,\"{{\"\"name\"\":\"\"rect\"\",\"\"x\"\":10,\"\"y\"\":20,\"\"width\"\":30,\"\"height\"\":40}}\",\"{{\"\"isCorrect\"\":\"\"true\"\",\"\"label\"\":\"\"drip\"\"}}\"\n\
             sink.jpg,100,\"{{}}\",2,1,\"{{\"\"name\"\":\"\"ellipse\"\",\"\"cx\"\":5,\"\"cy\"\":5,\"\"rx\"\":2,\"\"ry\"\":1}}\",\"{{\"\"isCorrect\"\":\"\"false\"\",\"\"label\"\":\"\"tap\"\"}}\"\n"
        );

        let records = ViaCsvFormat.parse(&csv).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].row, 1);
        assert_eq!(records[0].filename, "sink.jpg");
        assert_eq!(records[0].file_attributes, json!({"type": "plumbing"}));
        let region = records[0].region.as_ref().unwrap();
        assert_eq!(region.shape["name"], "rect");
        assert_eq!(region.shape["height"], 40);
        assert_eq!(region.attributes["label"], "drip");

        assert_eq!(records[1].row, 2);
        assert_eq!(records[1].region.as_ref().unwrap().shape["name"], "ellipse");
    }

    #[test]
    fn test_image_without_regions() {
        let csv = format!("{HEADER}\nempty.png,10,{{}},0,0,{{}},{{}}\n");
        let records = ViaCsvFormat.parse(&csv).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].region.is_none());
    }

    #[test]
    fn test_legacy_header_and_minimal_columns() {
        let csv = "#filename,region_shape_attributes,region_attributes\n\
                   a.jpg,\"{\"\"name\"\":\"\"rect\"\",\"\"x\"\":1,\"\"y\"\":1,\"\"width\"\":1,\"\"height\"\":1}\",{}\n";
        let records = ViaCsvFormat.parse(csv).unwrap();
        assert_eq!(records[0].filename, "a.jpg");
        assert_eq!(records[0].file_attributes, json!({}));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "filename,region_attributes\na.jpg,{}\n";
        assert!(matches!(
            ViaCsvFormat.parse(csv),
            Err(ManifestError::Csv(_))
        ));
    }

    #[test]
    fn test_broken_json_is_fatal() {
        let csv = format!("{HEADER}\na.jpg,1,{{}},1,0,{{not json,{{}}\n");
        assert!(matches!(
            ViaCsvFormat.parse(&csv),
            Err(ManifestError::InvalidRecord { row: 1, .. })
        ));
    }
}
