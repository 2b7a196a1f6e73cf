use super::{run_platform, WallpaperCatalog};
use crate::error::{CatalogError, Result};
use crate::record::WallpaperRecord;
use crate::task::{Scheduling, TaskHandle};
use std::sync::Arc;
use tracing::{info, warn};

impl WallpaperCatalog {
    /// Make `record` the desktop background.
    ///
    /// Bundled wallpapers are set from their resource handle; remote ones are
    /// fetched and decoded in memory first.
    pub async fn apply(&self, record: &WallpaperRecord) -> Result<()> {
        let listeners = &self.inner.listeners.set;

        if record.is_local() {
            let id = record.full_resource().ok_or_else(|| {
                CatalogError::Platform(format!("{} has no resource handle", record.full_uri()))
            })?;
            run_platform(self.platform(), move |platform| platform.set_resource(id)).await?;

            info!(uri = record.full_uri(), "bundled wallpaper applied");
            listeners.notify(|l| l.on_wallpaper_set(None));
            return Ok(());
        }

        let url = record.full_url();
        let bitmap = Arc::new(self.inner.client.fetch_bitmap(&url).await?);
        let decoded = Arc::clone(&bitmap);
        run_platform(self.platform(), move |platform| platform.set_bitmap(&decoded)).await?;

        info!(%url, width = bitmap.width(), height = bitmap.height(), "remote wallpaper applied");
        listeners.notify(|l| l.on_wallpaper_set(Some(&bitmap)));
        Ok(())
    }

    /// Run [`apply`](Self::apply) in the background, reporting failures through
    /// `on_wallpaper_set_failed`.
    pub fn apply_in_background(
        &self,
        record: WallpaperRecord,
        scheduling: Scheduling,
    ) -> TaskHandle {
        let catalog = self.clone();
        self.inner.executor.submit(scheduling, async move {
            if let Err(err) = catalog.apply(&record).await {
                warn!(uri = record.full_uri(), error = %err, "failed to apply wallpaper");
                catalog
                    .inner
                    .listeners
                    .set
                    .notify(|l| l.on_wallpaper_set_failed(&record, &err));
            }
        })
    }
}
