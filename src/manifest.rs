//! Remote wallpaper manifest
//!
//! The manifest is a JSON array served next to the wallpapers themselves:
//!
//! ```json
//! [{"full_src":"a.jpg","thumb_src":"a_t.jpg","title":"Dawn","byline":"X","file_size":1024}]
//! ```

use serde::{Deserialize, Serialize};

/// File name requested when no explicit metadata URL is configured
pub const DEFAULT_METADATA_FILE_NAME: &str = "wallpapers.json";

/// One wallpaper entry as published in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub full_src: String,
    pub thumb_src: String,
    pub title: String,
    pub byline: String,
    pub file_size: u64,
}

/// Decode a manifest body. Every field is required; one bad entry fails the whole body.
pub fn parse(body: &str) -> Result<Vec<ManifestEntry>, serde_json::Error> {
    serde_json::from_str(body)
}

/// Join two URL pieces with exactly one slash between them.
pub fn join_url(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_start_matches('/');
    if segment.is_empty() {
        return base.to_string();
    }
    format!("{base}/{segment}")
}

/// Prefix that relative manifest paths are appended to: `{storage}/{path}/`.
pub fn path_prefix(storage_url: &str, wallpaper_path: &str) -> String {
    let mut prefix = join_url(storage_url, wallpaper_path.trim_end_matches('/'));
    prefix.push('/');
    prefix
}
