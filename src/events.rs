//! Catalog observers
//!
//! Four independent listener categories. Callbacks run inline on whichever
//! task performed the operation, in registration order.

use crate::error::CatalogError;
use crate::record::WallpaperRecord;
use image::DynamicImage;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Maximum value reported by [`DownloadProgress::Percent`]
pub const MAX_PROGRESS: u8 = 100;

/// Progress of a running download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadProgress {
    /// Share of the declared size written so far
    Percent(u8),
    /// Neither the record nor the response declared a size
    Unknown {
        /// Bytes written so far
        bytes: u64,
    },
}

impl DownloadProgress {
    /// Progress after writing `bytes` of a `total`-byte download.
    pub fn from_bytes(bytes: u64, total: Option<u64>) -> Self {
        match total.filter(|total| *total > 0) {
            Some(total) => {
                let percent = (u128::from(bytes) * 100 / u128::from(total))
                    .min(u128::from(MAX_PROGRESS));
                DownloadProgress::Percent(percent as u8)
            }
            None => DownloadProgress::Unknown { bytes },
        }
    }
}

pub trait LocalWallpaperListener: Send + Sync {
    fn on_local_wallpapers_loading(&self) {}
    fn on_local_wallpapers_loaded(&self) {}
}

pub trait RemoteWallpaperListener: Send + Sync {
    fn on_remote_wallpapers_loading(&self) {}
    fn on_remote_wallpapers_loaded(&self) {}
    /// Only raised by background fetches; awaited fetches return the error instead.
    fn on_remote_wallpapers_failed(&self, _error: &CatalogError) {}
}

pub trait WallpaperSetListener: Send + Sync {
    /// `bitmap` is the decoded remote image, `None` for bundled wallpapers.
    fn on_wallpaper_set(&self, _bitmap: Option<&DynamicImage>) {}
    fn on_wallpaper_set_failed(&self, _record: &WallpaperRecord, _error: &CatalogError) {}
}

pub trait WallpaperDownloadListener: Send + Sync {
    fn on_wallpaper_downloading(&self, _record: &WallpaperRecord, _progress: DownloadProgress) {}
    fn on_wallpaper_downloaded(&self, _record: &WallpaperRecord, _path: &Path) {}
    fn on_wallpaper_download_failed(&self, _record: &WallpaperRecord, _error: &CatalogError) {}
}

/// Ordered listener registry. Duplicates are kept.
pub struct ListenerList<L: ?Sized> {
    listeners: RwLock<Vec<Arc<L>>>,
}

impl<L: ?Sized> Default for ListenerList<L> {
    fn default() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }
}

impl<L: ?Sized> ListenerList<L> {
    pub fn add(&self, listener: Arc<L>) {
        self.listeners
            .write()
            .expect("listener lock poisoned")
            .push(listener);
    }

    /// Remove the first registration of `listener`. Returns whether one was found.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut listeners = self.listeners.write().expect("listener lock poisoned");
        match listeners.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.listeners
            .write()
            .expect("listener lock poisoned")
            .clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.read().expect("listener lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call `f` on every listener. The registry is not locked while callbacks run.
    pub fn notify(&self, f: impl Fn(&L)) {
        let snapshot: Vec<Arc<L>> = self
            .listeners
            .read()
            .expect("listener lock poisoned")
            .clone();
        for listener in &snapshot {
            f(&**listener);
        }
    }
}

/// One registry per event category.
#[derive(Default)]
pub struct Listeners {
    pub local: ListenerList<dyn LocalWallpaperListener>,
    pub remote: ListenerList<dyn RemoteWallpaperListener>,
    pub set: ListenerList<dyn WallpaperSetListener>,
    pub download: ListenerList<dyn WallpaperDownloadListener>,
}

impl Listeners {
    pub fn clear_all(&self) {
        self.local.clear();
        self.remote.clear();
        self.set.clear();
        self.download.clear();
    }
}
