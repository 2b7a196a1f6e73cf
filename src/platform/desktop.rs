use super::{Platform, ResourceId, DRAWABLE};
use crate::swww::{self, Transition};
use crate::thumbnail::ThumbnailCache;
use crate::utils::is_image_file;
use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use walkdir::WalkDir;

/// Platform adapter for Wayland desktops driven by `swww`.
///
/// Bundled resources live under `{resources_dir}/{package}/{kind}/`, one image
/// file per resource name. Handles are issued on lookup and always refer to the
/// file they were resolved from, whichever package that was.
pub struct DesktopPlatform {
    resources_dir: PathBuf,
    /// Resolved files; a handle is the 1-based index into this list
    issued: Mutex<Vec<PathBuf>>,
    cache_dir: PathBuf,
    output: Option<String>,
    transition: Transition,
    thumbnails: ThumbnailCache,
}

impl DesktopPlatform {
    pub fn new(resources_dir: PathBuf) -> Self {
        let cache_dir = directories::ProjectDirs::from("com", "wallshelf", "wallshelf")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("/tmp/wallshelf"));
        Self::with_cache_dir(resources_dir, cache_dir)
    }

    pub fn with_cache_dir(resources_dir: PathBuf, cache_dir: PathBuf) -> Self {
        let thumbnails = ThumbnailCache::new(cache_dir.join("thumbs"));
        Self {
            resources_dir,
            issued: Mutex::new(Vec::new()),
            cache_dir,
            output: None,
            transition: Transition::default(),
            thumbnails,
        }
    }

    /// Restrict wallpaper changes to one output instead of all of them
    pub fn with_output(mut self, output: Option<String>) -> Self {
        self.output = output;
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    fn resource_files(&self, kind: &str, package: &str) -> Vec<PathBuf> {
        let dir = self.resources_dir.join(package).join(kind);
        let mut files: Vec<PathBuf> = WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();
        files.sort();
        files
    }

    fn issue(&self, path: PathBuf) -> Option<ResourceId> {
        let mut issued = self.issued.lock().expect("resource registry lock poisoned");
        let index = match issued.iter().position(|known| *known == path) {
            Some(index) => index,
            None => {
                issued.push(path);
                issued.len() - 1
            }
        };
        u32::try_from(index + 1).ok().map(ResourceId)
    }

    fn resource_path(&self, id: ResourceId) -> Option<PathBuf> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.issued
            .lock()
            .expect("resource registry lock poisoned")
            .get(index)
            .cloned()
    }

    fn apply_file(&self, path: &Path) -> Result<()> {
        swww::set_wallpaper(self.output.as_deref(), path, &self.transition)
    }
}

impl Platform for DesktopPlatform {
    fn resource_id(&self, name: &str, kind: &str, package: &str) -> Option<ResourceId> {
        let path = self
            .resource_files(kind, package)
            .into_iter()
            .find(|path| path.file_stem().is_some_and(|stem| stem == name))?;
        self.issue(path)
    }

    fn set_resource(&self, id: ResourceId) -> Result<()> {
        let path = self
            .resource_path(id)
            .with_context(|| format!("No bundled wallpaper with resource id {id}"))?;
        debug!(resource = %id, path = %path.display(), "setting bundled wallpaper");
        self.apply_file(&path)
    }

    fn set_bitmap(&self, bitmap: &DynamicImage) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_dir.join("current.png");
        bitmap
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.apply_file(&path)
    }

    fn index_media(&self, path: &Path) -> Result<()> {
        let thumb = self.thumbnails.index(path)?;
        debug!(source = %path.display(), thumb = %thumb.display(), "indexed media");
        Ok(())
    }
}
