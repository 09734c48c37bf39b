//! Tests for the ingestion pipeline against real files.
//!
//! Each test works in its own directory under the system temp dir, with
//! source images generated on the fly.


use std::path::PathBuf;

use image::{Rgb, RgbImage};

/// Scratch directory with `images/` and `out/` subdirectories.
pub(super) struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "clickproof-ingest-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("images")).unwrap();
        Self { root }
    }

    pub fn images(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn output(&self) -> PathBuf {
        self.root.join("out")
    }

    /// Write a solid-color source image.
    pub fn add_image(&self, filename: &str, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([90, 120, 150]))
            .save(self.images().join(filename))
            .unwrap();
    }

    /// Write a manifest file and return its path.
    pub fn add_manifest(&self, filename: &str, content: &str) -> PathBuf {
        let path = self.root.join(filename);
        std::fs::write(&path, content).unwrap();
        path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub(super) const CSV_HEADER: &str = "filename,file_size,file_attributes,region_count,region_id,region_shape_attributes,region_attributes";

/// Quote a JSON value as a CSV field.
pub(super) fn csv_json(value: &serde_json::Value) -> String {
    format!("\"{}\"", value.to_string().replace('"', "\"\""))
}

/// One VIA CSV row.
pub(super) fn csv_row(
    filename: &str,
    file_attributes: serde_json::Value,
    shape: serde_json::Value,
    attributes: serde_json::Value,
) -> String {
    format!(
        "{},0,{},1,0,{},{}",
        filename,
        csv_json(&file_attributes),
        csv_json(&shape),
        csv_json(&attributes)
    )
}

/// Build a CSV manifest from rows.
pub(super) fn csv_manifest(rows: &[String]) -> String {
    let mut content = String::from(CSV_HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    content
}
