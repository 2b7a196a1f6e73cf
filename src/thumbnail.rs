use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const THUMB_WIDTH: u32 = 480;
pub const THUMB_HEIGHT: u32 = 270;

const JPEG_QUALITY: u8 = 88;

/// Thumbnail index for downloaded wallpapers.
///
/// This is the desktop stand-in for a media scanner: indexing a file decodes
/// it and drops a small JPEG preview next to the others.
pub struct ThumbnailCache {
    cache_dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Generate a hash-based filename for the thumbnail
    fn thumb_filename(&self, source_path: &Path) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        source_path.to_string_lossy().hash(&mut hasher);

        if let Ok(modified) = fs::metadata(source_path).and_then(|m| m.modified()) {
            modified.hash(&mut hasher);
        }

        self.cache_dir.join(format!("{:016x}.jpg", hasher.finish()))
    }

    /// Return the cached thumbnail for `source_path`, if already indexed
    pub fn get_cached(&self, source_path: &Path) -> Option<PathBuf> {
        let thumb_path = self.thumb_filename(source_path);
        thumb_path.exists().then_some(thumb_path)
    }

    /// Index a source image, returning the thumbnail path.
    pub fn index(&self, source_path: &Path) -> Result<PathBuf> {
        if let Some(existing) = self.get_cached(source_path) {
            return Ok(existing);
        }

        let src_image = image::open(source_path)
            .with_context(|| format!("Failed to open image: {}", source_path.display()))?;
        let (dst_width, dst_height) = Self::fit_dimensions(
            src_image.width(),
            src_image.height(),
            THUMB_WIDTH,
            THUMB_HEIGHT,
        );
        let thumb = src_image.resize_exact(dst_width, dst_height, FilterType::Triangle);

        fs::create_dir_all(&self.cache_dir)?;
        let thumb_path = self.thumb_filename(source_path);
        save_as_jpeg(&thumb, &thumb_path, JPEG_QUALITY)?;
        Ok(thumb_path)
    }

    /// Calculate dimensions that fit within bounds while maintaining aspect ratio
    fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
        if src_w == 0 || src_h == 0 {
            return (max_w.max(1), max_h.max(1));
        }
        let ratio_w = max_w as f32 / src_w as f32;
        let ratio_h = max_h as f32 / src_h as f32;
        let ratio = ratio_w.min(ratio_h).min(1.0);

        let dst_w = (src_w as f32 * ratio).round() as u32;
        let dst_h = (src_h as f32 * ratio).round() as u32;

        (dst_w.max(1), dst_h.max(1))
    }
}

fn save_as_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
    let rgb_img = img.to_rgb8();
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
    encoder
        .encode_image(&rgb_img)
        .with_context(|| format!("Failed to encode JPEG: {}", path.display()))?;

    Ok(())
}
