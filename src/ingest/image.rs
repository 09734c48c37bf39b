//! Source image probing, resizing and encoding.

use std::path::Path;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::IngestError;
use crate::constants::{TARGET_HEIGHT, TARGET_WIDTH};
use crate::transform::{CanvasTransform, TransformError};

/// How a source image is fitted into the canonical canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePolicy {
    /// Scale each axis independently to fill the canvas.
    #[default]
    Stretch,
    /// Scale uniformly to fit, centre, and pad with the background color.
    Contain,
}

impl ResizePolicy {
    /// Get the name used in config files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            ResizePolicy::Stretch => "stretch",
            ResizePolicy::Contain => "contain",
        }
    }

    /// Build the transform that maps a source of this size onto the canvas.
    ///
    /// Images and regions go through the same transform, so region geometry
    /// always lines up with the resized pixels.
    pub fn canvas_transform(&self, width: u32, height: u32) -> Result<CanvasTransform, TransformError> {
        match self {
            ResizePolicy::Stretch => CanvasTransform::stretch(width, height),
            ResizePolicy::Contain => CanvasTransform::contain(width, height),
        }
    }
}

impl FromStr for ResizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stretch" => Ok(ResizePolicy::Stretch),
            "contain" => Ok(ResizePolicy::Contain),
            other => Err(format!(
                "unknown resize policy '{other}' (expected stretch or contain)"
            )),
        }
    }
}

/// Encoding of normalized images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless WebP
    #[default]
    WebP,
    Png,
}

impl OutputFormat {
    /// Get the file extension (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Png => "png",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Png => ImageFormat::Png,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(OutputFormat::WebP),
            "png" => Ok(OutputFormat::Png),
            other => Err(format!(
                "unknown output format '{other}' (expected webp or png)"
            )),
        }
    }
}

/// Read the intrinsic size of a source image without decoding it.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32), IngestError> {
    if !path.is_file() {
        return Err(IngestError::ImageNotFound(path.to_path_buf()));
    }

    let missing = || IngestError::MissingDimensions {
        image: path.to_path_buf(),
    };

    match image::image_dimensions(path) {
        Ok((width, height)) if width > 0 && height > 0 => Ok((width, height)),
        Ok(_) => Err(missing()),
        Err(e) => {
            log::debug!("Could not read dimensions of {:?}: {}", path, e);
            Err(missing())
        }
    }
}

/// Resizes source images onto the canonical canvas and writes them out.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    background: [u8; 3],
    format: OutputFormat,
}

impl ImageNormalizer {
    /// Create a normalizer with the given padding color and output format.
    pub fn new(background: [u8; 3], format: OutputFormat) -> Self {
        Self { background, format }
    }

    /// Get the output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Resize `source` according to `transform` and encode it to `target`.
    pub fn normalize(
        &self,
        source: &Path,
        target: &Path,
        transform: &CanvasTransform,
    ) -> Result<(), IngestError> {
        let img = image::open(source).map_err(|e| IngestError::image(source, e))?;
        let canvas = self.render(&img, transform);

        DynamicImage::ImageRgba8(canvas)
            .to_rgb8()
            .save_with_format(target, self.format.image_format())
            .map_err(|e| IngestError::encode(target, e))?;

        log::debug!(
            "Wrote {:?} ({}x{} content at {},{})",
            target,
            transform.content_width,
            transform.content_height,
            transform.offset_x,
            transform.offset_y
        );
        Ok(())
    }

    /// Draw the resized image onto a background-filled canonical canvas.
    fn render(&self, img: &DynamicImage, transform: &CanvasTransform) -> RgbaImage {
        let scaled = imageops::resize(
            &img.to_rgba8(),
            transform.content_width,
            transform.content_height,
            FilterType::Lanczos3,
        );

        let [r, g, b] = self.background;
        let mut canvas = RgbaImage::from_pixel(TARGET_WIDTH, TARGET_HEIGHT, Rgba([r, g, b, 255]));
        imageops::overlay(
            &mut canvas,
            &scaled,
            i64::from(transform.offset_x),
            i64::from(transform.offset_y),
        );
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "clickproof-image-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_solid(path: &Path, width: u32, height: u32, color: [u8; 3]) {
        RgbImage::from_pixel(width, height, Rgb(color))
            .save(path)
            .unwrap();
    }

    fn close(a: &[u8], b: &[u8]) -> bool {
        a.iter().zip(b).all(|(x, y)| x.abs_diff(*y) <= 2)
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Contain".parse::<ResizePolicy>(), Ok(ResizePolicy::Contain));
        assert_eq!("stretch".parse::<ResizePolicy>(), Ok(ResizePolicy::Stretch));
        assert!("cover".parse::<ResizePolicy>().is_err());
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("WEBP".parse::<OutputFormat>(), Ok(OutputFormat::WebP));
        assert_eq!(ResizePolicy::Contain.name(), "contain");
        assert_eq!(OutputFormat::WebP.extension(), "webp");
    }

    #[test]
    fn test_probe_dimensions() {
        let dir = temp_dir("probe");
        let path = dir.join("src.png");
        write_solid(&path, 40, 30, [1, 2, 3]);
        assert_eq!(probe_dimensions(&path).unwrap(), (40, 30));

        assert!(matches!(
            probe_dimensions(&dir.join("absent.png")),
            Err(IngestError::ImageNotFound(_))
        ));

        let corrupt = dir.join("corrupt.png");
        std::fs::write(&corrupt, b"not an image").unwrap();
        assert!(matches!(
            probe_dimensions(&corrupt),
            Err(IngestError::MissingDimensions { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_stretch_fills_canvas() {
        let dir = temp_dir("stretch");
        let source = dir.join("src.png");
        let target = dir.join("out.webp");
        write_solid(&source, 160, 60, [200, 10, 10]);

        let transform = ResizePolicy::Stretch.canvas_transform(160, 60).unwrap();
        ImageNormalizer::new([255, 255, 255], OutputFormat::WebP)
            .normalize(&source, &target, &transform)
            .unwrap();

        let out = image::open(&target).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (TARGET_WIDTH, TARGET_HEIGHT));
        assert!(close(&out.get_pixel(0, 0).0, &[200, 10, 10]));
        assert!(close(&out.get_pixel(799, 599).0, &[200, 10, 10]));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_contain_pads_with_background() {
        let dir = temp_dir("contain");
        let source = dir.join("src.png");
        let target = dir.join("out.png");
        write_solid(&source, 1600, 800, [10, 200, 10]);

        let transform = ResizePolicy::Contain.canvas_transform(1600, 800).unwrap();
        assert_eq!((transform.offset_x, transform.offset_y), (0, 100));
        ImageNormalizer::new([0, 0, 255], OutputFormat::Png)
            .normalize(&source, &target, &transform)
            .unwrap();

        let out = image::open(&target).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (TARGET_WIDTH, TARGET_HEIGHT));
        assert_eq!(out.get_pixel(400, 50).0, [0, 0, 255]);
        assert_eq!(out.get_pixel(400, 550).0, [0, 0, 255]);
        assert!(close(&out.get_pixel(400, 300).0, &[10, 200, 10]));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_undecodable_source() {
        let dir = temp_dir("undecodable");
        let source = dir.join("bad.png");
        std::fs::write(&source, b"garbage").unwrap();

        let transform = ResizePolicy::Stretch.canvas_transform(10, 10).unwrap();
        let result = ImageNormalizer::new([255, 255, 255], OutputFormat::Png).normalize(
            &source,
            &dir.join("out.png"),
            &transform,
        );
        assert!(matches!(result, Err(IngestError::Image { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
