//! Batch ingestion: manifest + source images → canonical images + corpus.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::image::{ImageNormalizer, probe_dimensions};
use super::manifest::attributes::{FileAttributes, RegionError, parse_region};
use super::manifest::{AnnotationRecord, ManifestRegistry, RawRegion};
use super::IngestError;
use crate::config::IngestConfig;
use crate::corpus::save_corpus;
use crate::model::{Challenge, Corpus, Region};

/// Summary of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Distinct source files encountered in the manifest.
    pub images_processed: usize,
    pub challenges_created: usize,
    pub regions_created: usize,
    /// Files that produced no challenge, with the reason.
    pub skipped_files: Vec<(String, String)>,
    /// Non-fatal problems: skipped regions, defaulted attributes.
    pub warnings: Vec<String>,
    /// Where the corpus artifact was written.
    pub corpus_path: PathBuf,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub corpus: Corpus,
    pub report: IngestReport,
}

/// All records sharing one source filename.
#[derive(Debug)]
struct ImageGroup {
    filename: String,
    file_attributes: Value,
    regions: Vec<RawRegion>,
}

/// Collapse records into one group per filename, in first-occurrence order.
///
/// File attributes come from the first record of each file.
fn group_by_filename(records: Vec<AnnotationRecord>) -> Vec<ImageGroup> {
    let mut groups: Vec<ImageGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.filename.clone()).or_insert_with(|| {
            groups.push(ImageGroup {
                filename: record.filename.clone(),
                file_attributes: record.file_attributes.clone(),
                regions: Vec::new(),
            });
            groups.len() - 1
        });
        if let Some(region) = record.region {
            groups[slot].regions.push(region);
        }
    }

    groups
}

/// Derive a challenge id from a source filename (stem without extension).
pub fn challenge_id(filename: &str) -> Option<String> {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Runs the ingestion pipeline.
pub struct Ingestor {
    config: IngestConfig,
    registry: ManifestRegistry,
    normalizer: ImageNormalizer,
}

impl Ingestor {
    /// Create an ingestor with the built-in manifest formats.
    pub fn new(config: IngestConfig) -> Self {
        Self::with_registry(config, ManifestRegistry::new())
    }

    /// Create an ingestor with a custom manifest registry.
    pub fn with_registry(config: IngestConfig, registry: ManifestRegistry) -> Self {
        let normalizer = ImageNormalizer::new(config.background, config.output_format);
        Self {
            config,
            registry,
            normalizer,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest a manifest file.
    ///
    /// The output directory is created if needed. Normalized images are
    /// written as `<id>.<ext>` next to the corpus artifact.
    pub fn run(
        &self,
        manifest: &Path,
        image_dir: &Path,
        output_dir: &Path,
    ) -> Result<IngestOutcome, IngestError> {
        let records = self.registry.read(manifest)?;
        self.ingest_records(records, image_dir, output_dir)
    }

    /// Ingest already-parsed manifest records.
    pub fn ingest_records(
        &self,
        records: Vec<AnnotationRecord>,
        image_dir: &Path,
        output_dir: &Path,
    ) -> Result<IngestOutcome, IngestError> {
        let groups = group_by_filename(records);
        if groups.is_empty() {
            return Err(IngestError::EmptyBatch);
        }

        std::fs::create_dir_all(output_dir).map_err(|e| IngestError::io(output_dir, e))?;

        let mut report = IngestReport {
            images_processed: groups.len(),
            ..Default::default()
        };
        let mut challenges = Vec::with_capacity(groups.len());
        let mut ids = HashSet::new();

        for group in &groups {
            log::info!("Processing {}", group.filename);
            match self.ingest_image(group, image_dir, output_dir, &ids, &mut report.warnings) {
                Ok(challenge) => {
                    report.regions_created += challenge.regions.len();
                    ids.insert(challenge.id.clone());
                    challenges.push(challenge);
                }
                Err(e) if e.is_fatal() || !self.config.continue_on_error => {
                    log::error!("Aborting batch at {}: {}", group.filename, e);
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", group.filename, e);
                    report.skipped_files.push((group.filename.clone(), e.to_string()));
                }
            }
        }

        report.challenges_created = challenges.len();
        let corpus = Corpus::new(challenges);
        report.corpus_path = output_dir.join(&self.config.corpus_filename);
        save_corpus(&corpus, &report.corpus_path)?;

        log::info!("Processed {} images", report.images_processed);
        log::info!("Created {} challenges", report.challenges_created);
        if !report.skipped_files.is_empty() {
            log::warn!("Skipped {} files", report.skipped_files.len());
        }

        Ok(IngestOutcome { corpus, report })
    }

    /// Normalize one source image and build its challenge.
    fn ingest_image(
        &self,
        group: &ImageGroup,
        image_dir: &Path,
        output_dir: &Path,
        existing_ids: &HashSet<String>,
        warnings: &mut Vec<String>,
    ) -> Result<Challenge, IngestError> {
        let id = challenge_id(&group.filename)
            .ok_or_else(|| IngestError::InvalidFilename(group.filename.clone()))?;
        if existing_ids.contains(&id) {
            return Err(IngestError::DuplicateId {
                id,
                filename: group.filename.clone(),
            });
        }

        let source = image_dir.join(&group.filename);
        let (width, height) = probe_dimensions(&source)?;
        let transform = self
            .config
            .resize_policy
            .canvas_transform(width, height)
            .map_err(|source_err| IngestError::Transform {
                image: source.clone(),
                source: source_err,
            })?;
        log::debug!(
            "{}: {}x{} source, scale ({:.4}, {:.4}), offset ({}, {})",
            group.filename,
            width,
            height,
            transform.scale.x,
            transform.scale.y,
            transform.offset_x,
            transform.offset_y
        );

        let extension = self.normalizer.format().extension();
        let target = output_dir.join(format!("{id}.{extension}"));
        self.normalizer.normalize(&source, &target, &transform)?;

        let mut attribute_warnings = Vec::new();
        let attributes = FileAttributes::from_value(&group.file_attributes, &mut attribute_warnings);
        for warning in attribute_warnings {
            log::warn!("{}: {}", group.filename, warning);
            warnings.push(format!("{}: {}", group.filename, warning));
        }

        let mut regions = Vec::with_capacity(group.regions.len());
        for (index, raw) in group.regions.iter().enumerate() {
            let region = parse_region(raw).and_then(|parsed| {
                let shape = transform.apply(&parsed.shape).map_err(RegionError::from)?;
                Ok(Region::new(shape, parsed.is_correct, parsed.label))
            });
            match region {
                Ok(region) => regions.push(region),
                Err(source) => {
                    let e = IngestError::Shape {
                        filename: group.filename.clone(),
                        index,
                        source,
                    };
                    log::warn!("Skipping region: {}", e);
                    warnings.push(e.to_string());
                }
            }
        }

        if !regions.iter().any(|r| r.is_correct) {
            log::warn!("{}: no correct region, challenge cannot be passed", group.filename);
        }

        Ok(Challenge {
            image_url: format!(
                "{}/{}.{}",
                self.config.image_url_prefix.trim_end_matches('/'),
                id,
                extension
            ),
            id,
            kind: attributes.kind,
            question: attributes.question,
            difficulty: attributes.difficulty,
            regions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(row: usize, filename: &str, region: Option<RawRegion>) -> AnnotationRecord {
        AnnotationRecord {
            row,
            filename: filename.to_string(),
            file_attributes: json!({"type": format!("t{row}")}),
            region,
        }
    }

    fn rect_region() -> RawRegion {
        RawRegion {
            shape: json!({"name": "rect", "x": 0, "y": 0, "width": 1, "height": 1}),
            attributes: json!({}),
        }
    }

    #[test]
    fn test_group_by_filename() {
        let groups = group_by_filename(vec![
            record(1, "b.jpg", Some(rect_region())),
            record(2, "a.jpg", None),
            record(3, "b.jpg", Some(rect_region())),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].filename, "b.jpg");
        assert_eq!(groups[0].regions.len(), 2);
        assert_eq!(groups[0].file_attributes["type"], "t1");
        assert_eq!(groups[1].filename, "a.jpg");
        assert!(groups[1].regions.is_empty());
    }

    #[test]
    fn test_challenge_id() {
        assert_eq!(challenge_id("sink.jpg").as_deref(), Some("sink"));
        assert_eq!(challenge_id("leaky.roof.png").as_deref(), Some("leaky.roof"));
        assert_eq!(challenge_id("sub/attic.webp").as_deref(), Some("attic"));
        assert_eq!(challenge_id("noext").as_deref(), Some("noext"));
        assert_eq!(challenge_id(""), None);
    }
}
