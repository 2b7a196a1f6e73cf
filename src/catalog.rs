//! Wallpaper catalog
//!
//! Owns the local and remote wallpaper lists, fetches them, and fans out
//! lifecycle events to listeners. Download and apply live in sub-modules.

mod apply;
mod download;

use crate::error::{CatalogError, Result};
use crate::events::{
    Listeners, LocalWallpaperListener, RemoteWallpaperListener, WallpaperDownloadListener,
    WallpaperSetListener,
};
use crate::platform::{Platform, DRAWABLE};
use crate::record::WallpaperRecord;
use crate::remote::RemoteClient;
use crate::settings::ManagerSettings;
use crate::task::{Scheduling, TaskExecutor, TaskHandle, TaskSlot, TaskStatus};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

struct CatalogInner {
    settings: RwLock<Arc<ManagerSettings>>,
    local: RwLock<Vec<WallpaperRecord>>,
    remote: RwLock<Vec<WallpaperRecord>>,
    listeners: Listeners,
    platform: Arc<dyn Platform>,
    client: RemoteClient,
    executor: TaskExecutor,
    local_task: TaskSlot,
    remote_task: TaskSlot,
}

/// Shared handle to a wallpaper catalog. Clones refer to the same catalog.
#[derive(Clone)]
pub struct WallpaperCatalog {
    inner: Arc<CatalogInner>,
}

impl WallpaperCatalog {
    /// Create a catalog bound to the current tokio runtime.
    pub fn new(settings: ManagerSettings, platform: Arc<dyn Platform>) -> Result<Self> {
        Self::with_executor(settings, platform, TaskExecutor::current()?)
    }

    pub fn with_executor(
        settings: ManagerSettings,
        platform: Arc<dyn Platform>,
        executor: TaskExecutor,
    ) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(CatalogInner {
                settings: RwLock::new(Arc::new(settings)),
                local: RwLock::new(Vec::new()),
                remote: RwLock::new(Vec::new()),
                listeners: Listeners::default(),
                platform,
                client: RemoteClient::new()?,
                executor,
                local_task: TaskSlot::new("local-wallpapers"),
                remote_task: TaskSlot::new("remote-wallpapers"),
            }),
        })
    }

    /// Current settings snapshot
    pub fn settings(&self) -> Arc<ManagerSettings> {
        Arc::clone(&self.inner.settings.read().expect("settings lock poisoned"))
    }

    /// Replace the whole configuration. Operations already running keep their snapshot.
    pub fn set_settings(&self, settings: ManagerSettings) {
        *self.inner.settings.write().expect("settings lock poisoned") = Arc::new(settings);
    }

    /// Local wallpapers followed by remote ones
    pub fn wallpapers(&self) -> Vec<WallpaperRecord> {
        let mut all = self.local_wallpapers();
        all.extend(self.remote_wallpapers());
        all
    }

    pub fn local_wallpapers(&self) -> Vec<WallpaperRecord> {
        self.inner.local.read().expect("wallpaper lock poisoned").clone()
    }

    pub fn remote_wallpapers(&self) -> Vec<WallpaperRecord> {
        self.inner.remote.read().expect("wallpaper lock poisoned").clone()
    }

    pub fn wallpaper_count(&self) -> usize {
        let local = self.inner.local.read().expect("wallpaper lock poisoned").len();
        let remote = self.inner.remote.read().expect("wallpaper lock poisoned").len();
        local + remote
    }

    /// Resolve the configured bundled wallpapers, replacing the local list.
    ///
    /// Names that do not resolve are skipped silently; a missing thumbnail is kept as `None`.
    pub fn fetch_local(&self) {
        let settings = self.settings();
        let listeners = &self.inner.listeners.local;
        let platform = &self.inner.platform;

        debug!(names = settings.local_wallpapers.len(), "loading local wallpapers");
        listeners.notify(|l| l.on_local_wallpapers_loading());

        let records: Vec<WallpaperRecord> = settings
            .local_wallpapers
            .iter()
            .filter_map(|name| {
                let full = platform.resource_id(name, DRAWABLE, &settings.package_name)?;
                let thumb_name = format!("{name}{}", settings.thumb_suffix);
                let thumb = platform.resource_id(&thumb_name, DRAWABLE, &settings.package_name);
                Some(WallpaperRecord::local(
                    &settings.package_name,
                    name,
                    &settings.thumb_suffix,
                    full,
                    thumb,
                ))
            })
            .collect();

        let count = records.len();
        *self.inner.local.write().expect("wallpaper lock poisoned") = records;

        info!(count, "loaded local wallpapers");
        listeners.notify(|l| l.on_local_wallpapers_loaded());
    }

    /// Download the manifest and replace the remote list.
    ///
    /// Does nothing when web access is disabled. On failure the previous remote
    /// list is kept and the error is returned.
    pub async fn fetch_remote(&self) -> Result<()> {
        let settings = self.settings();
        if !settings.web_enabled {
            debug!("remote wallpapers are disabled in settings, skipping fetch");
            return Ok(());
        }

        let listeners = &self.inner.listeners.remote;
        let url = settings.metadata_url();
        listeners.notify(|l| l.on_remote_wallpapers_loading());

        debug!(%url, "requesting wallpaper manifest");
        let entries = self.inner.client.fetch_manifest(&url).await?;

        let prefix = settings.path_prefix();
        let records: Vec<WallpaperRecord> = entries
            .into_iter()
            .map(|entry| WallpaperRecord::remote(&prefix, entry))
            .collect();

        let count = records.len();
        *self.inner.remote.write().expect("wallpaper lock poisoned") = records;

        info!(count, %url, "loaded remote wallpapers");
        listeners.notify(|l| l.on_remote_wallpapers_loaded());
        Ok(())
    }

    /// Local fetch then remote fetch. A remote failure leaves the local result in place.
    pub async fn fetch_all(&self) -> Result<()> {
        self.fetch_local();
        self.fetch_remote().await
    }

    /// Run [`fetch_local`](Self::fetch_local) in the background.
    ///
    /// Returns `None` without doing anything if a local fetch is already running.
    pub fn fetch_local_in_background(&self, scheduling: Scheduling) -> Option<TaskHandle> {
        let guard = self.inner.local_task.try_acquire()?;
        let catalog = self.clone();
        Some(self.inner.executor.submit(scheduling, async move {
            let _guard = guard;
            if let Err(err) = tokio::task::spawn_blocking(move || catalog.fetch_local()).await {
                warn!(error = %err, "background local fetch panicked");
            }
        }))
    }

    /// Run [`fetch_remote`](Self::fetch_remote) in the background.
    ///
    /// Failures go to `on_remote_wallpapers_failed`. Returns `None` if a remote
    /// fetch is already running.
    pub fn fetch_remote_in_background(&self, scheduling: Scheduling) -> Option<TaskHandle> {
        let guard = self.inner.remote_task.try_acquire()?;
        let catalog = self.clone();
        Some(self.inner.executor.submit(scheduling, async move {
            let _guard = guard;
            if let Err(err) = catalog.fetch_remote().await {
                warn!(error = %err, "background remote fetch failed");
                catalog
                    .inner
                    .listeners
                    .remote
                    .notify(|l| l.on_remote_wallpapers_failed(&err));
            }
        }))
    }

    /// Start both background fetches, returning handles for those actually started.
    pub fn fetch_all_in_background(&self, scheduling: Scheduling) -> Vec<TaskHandle> {
        [
            self.fetch_local_in_background(scheduling),
            self.fetch_remote_in_background(scheduling),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn local_task_status(&self) -> TaskStatus {
        self.inner.local_task.status()
    }

    pub fn remote_task_status(&self) -> TaskStatus {
        self.inner.remote_task.status()
    }

    pub fn add_local_listener(&self, listener: Arc<dyn LocalWallpaperListener>) {
        self.inner.listeners.local.add(listener);
    }

    pub fn remove_local_listener(&self, listener: &Arc<dyn LocalWallpaperListener>) -> bool {
        self.inner.listeners.local.remove(listener)
    }

    pub fn remove_all_local_listeners(&self) {
        self.inner.listeners.local.clear();
    }

    pub fn add_remote_listener(&self, listener: Arc<dyn RemoteWallpaperListener>) {
        self.inner.listeners.remote.add(listener);
    }

    pub fn remove_remote_listener(&self, listener: &Arc<dyn RemoteWallpaperListener>) -> bool {
        self.inner.listeners.remote.remove(listener)
    }

    pub fn remove_all_remote_listeners(&self) {
        self.inner.listeners.remote.clear();
    }

    pub fn add_set_listener(&self, listener: Arc<dyn WallpaperSetListener>) {
        self.inner.listeners.set.add(listener);
    }

    pub fn remove_set_listener(&self, listener: &Arc<dyn WallpaperSetListener>) -> bool {
        self.inner.listeners.set.remove(listener)
    }

    pub fn remove_all_set_listeners(&self) {
        self.inner.listeners.set.clear();
    }

    pub fn add_download_listener(&self, listener: Arc<dyn WallpaperDownloadListener>) {
        self.inner.listeners.download.add(listener);
    }

    pub fn remove_download_listener(&self, listener: &Arc<dyn WallpaperDownloadListener>) -> bool {
        self.inner.listeners.download.remove(listener)
    }

    pub fn remove_all_download_listeners(&self) {
        self.inner.listeners.download.clear();
    }

    /// Drop every listener in every category.
    pub fn remove_all_listeners(&self) {
        self.inner.listeners.clear_all();
    }

    fn platform(&self) -> Arc<dyn Platform> {
        Arc::clone(&self.inner.platform)
    }
}

/// Run a blocking platform call off the async worker threads.
async fn run_platform<T, F>(platform: Arc<dyn Platform>, call: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Platform) -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || call(platform.as_ref()))
        .await
        .map_err(|err| CatalogError::Platform(err.to_string()))?
        .map_err(CatalogError::platform)
}
