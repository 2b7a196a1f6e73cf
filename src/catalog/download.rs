use super::{run_platform, WallpaperCatalog};
use crate::error::{CatalogError, Result};
use crate::events::DownloadProgress;
use crate::record::WallpaperRecord;
use crate::task::{Scheduling, TaskHandle};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

impl WallpaperCatalog {
    /// Stream a remote wallpaper into the save location.
    ///
    /// Returns the written path, or `None` for bundled wallpapers which have
    /// nothing to download. A transfer that fails midway removes its partial file.
    pub async fn download(&self, record: &WallpaperRecord) -> Result<Option<PathBuf>> {
        if record.is_local() {
            debug!(uri = record.full_uri(), "bundled wallpaper, nothing to download");
            return Ok(None);
        }

        let settings = self.settings();
        let listeners = &self.inner.listeners.download;
        listeners.notify(|l| l.on_wallpaper_downloading(record, DownloadProgress::Percent(0)));

        let path = record.save_path(&settings.save_location).ok_or_else(|| {
            CatalogError::InvalidFileName(record.relative_full_url().to_string())
        })?;

        let url = record.full_url();
        let response = self.inner.client.get(&url).await?;
        let total = Some(record.file_size())
            .filter(|size| *size > 0)
            .or_else(|| response.content_length());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        debug!(%url, path = %path.display(), ?total, "downloading wallpaper");

        let chunk_size = settings.read_chunk_size();
        let file = fs::File::create(&path).await?;
        let written = match self
            .write_body(record, response, file, total, chunk_size)
            .await
        {
            Ok(written) => written,
            Err(err) => {
                if let Err(remove_err) = fs::remove_file(&path).await {
                    warn!(
                        path = %path.display(),
                        error = %remove_err,
                        "failed to remove partial download"
                    );
                }
                return Err(err);
            }
        };

        let indexed = path.clone();
        if let Err(err) =
            run_platform(self.platform(), move |platform| platform.index_media(&indexed)).await
        {
            warn!(path = %path.display(), error = %err, "failed to index downloaded wallpaper");
        }

        info!(path = %path.display(), bytes = written, "wallpaper downloaded");
        listeners.notify(|l| l.on_wallpaper_downloaded(record, &path));
        Ok(Some(path))
    }

    async fn write_body(
        &self,
        record: &WallpaperRecord,
        mut response: reqwest::Response,
        file: fs::File,
        total: Option<u64>,
        chunk_size: usize,
    ) -> Result<u64> {
        let listeners = &self.inner.listeners.download;
        let mut writer = BufWriter::with_capacity(chunk_size, file);
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            for piece in chunk.chunks(chunk_size) {
                writer.write_all(piece).await?;
                written += piece.len() as u64;
                let progress = DownloadProgress::from_bytes(written, total);
                listeners.notify(|l| l.on_wallpaper_downloading(record, progress));
            }
        }
        writer.shutdown().await?;
        Ok(written)
    }

    /// Run [`download`](Self::download) in the background.
    ///
    /// Failures are reported through `on_wallpaper_download_failed` only.
    pub fn download_in_background(
        &self,
        record: WallpaperRecord,
        scheduling: Scheduling,
    ) -> TaskHandle {
        let catalog = self.clone();
        self.inner.executor.submit(scheduling, async move {
            if let Err(err) = catalog.download(&record).await {
                warn!(url = %record.full_url(), error = %err, "background download failed");
                catalog
                    .inner
                    .listeners
                    .download
                    .notify(|l| l.on_wallpaper_download_failed(&record, &err));
            }
        })
    }
}
