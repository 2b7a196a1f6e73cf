use axum::body::Bytes;
use axum::routing::get;
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wallshelf::manifest::ManifestEntry;
use wallshelf::{
    CatalogError, DownloadProgress, ManagerSettings, Platform, RemoteWallpaperListener,
    ResourceId, Scheduling, WallpaperCatalog, WallpaperDownloadListener, WallpaperRecord,
    WallpaperSetListener,
};

/// Records what the catalog asked the host to do.
#[derive(Default)]
struct RecordingPlatform {
    bitmaps: Mutex<Vec<(u32, u32)>>,
    indexed: Mutex<Vec<PathBuf>>,
}

impl Platform for RecordingPlatform {
    fn resource_id(&self, _name: &str, _kind: &str, _package: &str) -> Option<ResourceId> {
        None
    }

    fn set_resource(&self, _id: ResourceId) -> anyhow::Result<()> {
        anyhow::bail!("no bundled wallpapers in this host")
    }

    fn set_bitmap(&self, bitmap: &DynamicImage) -> anyhow::Result<()> {
        self.bitmaps
            .lock()
            .unwrap()
            .push((bitmap.width(), bitmap.height()));
        Ok(())
    }

    fn index_media(&self, path: &Path) -> anyhow::Result<()> {
        self.indexed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
struct Events(Mutex<Vec<String>>);

impl Events {
    fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl RemoteWallpaperListener for Events {
    fn on_remote_wallpapers_loading(&self) {
        self.push("loading");
    }
    fn on_remote_wallpapers_loaded(&self) {
        self.push("loaded");
    }
    fn on_remote_wallpapers_failed(&self, _error: &CatalogError) {
        self.push("failed");
    }
}

impl WallpaperDownloadListener for Events {
    fn on_wallpaper_downloading(&self, _record: &WallpaperRecord, progress: DownloadProgress) {
        match progress {
            DownloadProgress::Percent(percent) => self.push(format!("progress:{percent}")),
            DownloadProgress::Unknown { bytes } => self.push(format!("bytes:{bytes}")),
        }
    }
    fn on_wallpaper_downloaded(&self, _record: &WallpaperRecord, _path: &Path) {
        self.push("downloaded");
    }
    fn on_wallpaper_download_failed(&self, _record: &WallpaperRecord, _error: &CatalogError) {
        self.push("download-failed");
    }
}

impl WallpaperSetListener for Events {
    fn on_wallpaper_set(&self, bitmap: Option<&DynamicImage>) {
        match bitmap {
            Some(bitmap) => self.push(format!("set:{}x{}", bitmap.width(), bitmap.height())),
            None => self.push("set"),
        }
    }
    fn on_wallpaper_set_failed(&self, _record: &WallpaperRecord, _error: &CatalogError) {
        self.push("set-failed");
    }
}

struct Fixture {
    base: String,
    png: Bytes,
}

fn png_bytes(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 4) as u8, (y * 7) as u8, (x * y % 251) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    Bytes::from(out.into_inner())
}

/// Serve a manifest, two images and a broken manifest on an ephemeral port.
async fn serve() -> Fixture {
    let png = png_bytes(64, 36);
    let manifest = format!(
        r#"[
            {{"full_src":"full/dawn.png","thumb_src":"thumb/dawn.png","title":"Dawn","byline":"X","file_size":{}}},
            {{"full_src":"full/dawn.png","thumb_src":"thumb/dawn.png","title":"Night","byline":"Y","file_size":0}},
            {{"full_src":"full/broken.png","thumb_src":"thumb/broken.png","title":"Broken","byline":"Z","file_size":7}}
        ]"#,
        png.len()
    );

    let app = Router::new()
        .route("/w/wallpapers.json", get(move || async move { manifest }))
        .route("/bad/wallpapers.json", get(|| async { "not a manifest" }))
        .route("/w/full/dawn.png", {
            let png = png.clone();
            get(move || async move { png })
        })
        .route("/w/full/broken.png", get(|| async { "garbage" }));

    Fixture {
        base: serve_router(app).await,
        png,
    }
}

async fn serve_router(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Answers every request with a header promising more body than it sends.
async fn serve_truncated() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\nConnection: close\r\n\r\n")
                .await;
            let _ = socket.write_all(&[7u8; 512]).await;
        }
    });
    format!("http://{addr}")
}

fn untitled(prefix: &str, full_src: &str) -> WallpaperRecord {
    WallpaperRecord::remote(
        prefix,
        ManifestEntry {
            full_src: full_src.into(),
            thumb_src: String::new(),
            title: String::new(),
            byline: String::new(),
            file_size: 0,
        },
    )
}

fn settings(fixture: &Fixture, save_location: &Path) -> ManagerSettings {
    ManagerSettings::builder()
        .storage_url(&fixture.base)
        .wallpaper_path("/w")
        .save_location(save_location)
        .byte_buffer(64)
        .build()
}

async fn loaded_catalog(
    fixture: &Fixture,
    save_location: &Path,
) -> (WallpaperCatalog, Arc<RecordingPlatform>, Arc<Events>) {
    let platform = Arc::new(RecordingPlatform::default());
    let catalog =
        WallpaperCatalog::new(settings(fixture, save_location), platform.clone()).unwrap();
    let events = Arc::new(Events::default());
    catalog.add_remote_listener(events.clone());
    catalog.add_download_listener(events.clone());
    catalog.add_set_listener(events.clone());

    catalog.fetch_remote().await.unwrap();
    events.take();
    (catalog, platform, events)
}

fn by_title(catalog: &WallpaperCatalog, title: &str) -> WallpaperRecord {
    catalog
        .remote_wallpapers()
        .into_iter()
        .find(|wp| wp.title() == title)
        .unwrap()
}

#[tokio::test]
async fn manifest_entries_become_remote_records() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let catalog = WallpaperCatalog::new(
        settings(&fixture, dir.path()),
        Arc::new(RecordingPlatform::default()),
    )
    .unwrap();
    let events = Arc::new(Events::default());
    catalog.add_remote_listener(events.clone());

    catalog.fetch_remote().await.unwrap();

    let remote = catalog.remote_wallpapers();
    assert_eq!(remote.len(), 3);
    assert_eq!(catalog.wallpaper_count(), 3);
    assert!(catalog.local_wallpapers().is_empty());

    let dawn = &remote[0];
    assert!(!dawn.is_local());
    assert_eq!(dawn.title(), "Dawn");
    assert_eq!(dawn.byline(), "X");
    assert_eq!(dawn.file_size(), fixture.png.len() as u64);
    assert_eq!(dawn.relative_full_url(), "full/dawn.png");
    assert_eq!(dawn.full_uri(), format!("{}/w/full/dawn.png", fixture.base));
    assert_eq!(dawn.thumb_uri(), format!("{}/w/thumb/dawn.png", fixture.base));
    assert_eq!(events.take(), vec!["loading", "loaded"]);
}

#[tokio::test]
async fn malformed_manifest_keeps_previous_list() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let (catalog, _platform, events) = loaded_catalog(&fixture, dir.path()).await;

    let mut broken = (*catalog.settings()).clone();
    broken.wallpaper_path = Some("/bad".into());
    catalog.set_settings(broken);

    let err = catalog.fetch_remote().await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)), "got {err:?}");
    assert_eq!(catalog.remote_wallpapers().len(), 3);
    assert_eq!(events.take(), vec!["loading"]);
}

#[tokio::test]
async fn missing_manifest_reports_status_in_background() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(&fixture, dir.path());
    settings.metadata_url = Some(format!("{}/nowhere.json", fixture.base));
    let catalog =
        WallpaperCatalog::new(settings, Arc::new(RecordingPlatform::default())).unwrap();
    let events = Arc::new(Events::default());
    catalog.add_remote_listener(events.clone());

    let err = catalog.fetch_remote().await.unwrap_err();
    assert!(matches!(err, CatalogError::HttpStatus { status: 404, .. }));

    events.take();
    catalog
        .fetch_remote_in_background(Scheduling::Parallel)
        .unwrap()
        .join()
        .await;
    assert_eq!(events.take(), vec!["loading", "failed"]);
    assert!(catalog.remote_wallpapers().is_empty());
}

#[tokio::test]
async fn download_streams_file_with_monotonic_progress() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let (catalog, platform, events) = loaded_catalog(&fixture, dir.path()).await;

    let path = catalog
        .download(&by_title(&catalog, "Dawn"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(path, dir.path().join("Dawn.png"));
    assert_eq!(std::fs::read(&path).unwrap(), fixture.png.to_vec());
    assert_eq!(*platform.indexed.lock().unwrap(), vec![path.clone()]);

    let events = events.take();
    assert_eq!(events.first().map(String::as_str), Some("progress:0"));
    assert_eq!(events.last().map(String::as_str), Some("downloaded"));

    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| e.strip_prefix("progress:"))
        .map(|p| p.parse().unwrap())
        .collect();
    assert!(progress.len() > 2, "expected several chunks, got {progress:?}");
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last(), Some(&100));
}

#[tokio::test]
async fn download_without_declared_size_uses_content_length() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let (catalog, _platform, events) = loaded_catalog(&fixture, dir.path()).await;

    let path = catalog
        .download(&by_title(&catalog, "Night"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(path, dir.path().join("Night.png"));
    let events = events.take();
    assert!(events.iter().all(|e| !e.starts_with("bytes:")));
    assert!(events.contains(&"progress:100".to_string()));
}

#[tokio::test]
async fn background_download_failure_is_reported() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let (catalog, _platform, events) = loaded_catalog(&fixture, dir.path()).await;

    let mut settings = (*catalog.settings()).clone();
    settings.wallpaper_path = Some("/gone".into());
    settings.metadata_url = Some(format!("{}/w/wallpapers.json", fixture.base));
    catalog.set_settings(settings);
    catalog.fetch_remote().await.unwrap();
    events.take();

    let dawn = by_title(&catalog, "Dawn");
    assert!(dawn.full_url().contains("/gone/"));
    catalog
        .download_in_background(dawn, Scheduling::Serial)
        .join()
        .await;

    assert_eq!(events.take(), vec!["progress:0", "download-failed"]);
    assert!(!dir.path().join("Dawn.png").exists());
}

#[tokio::test]
async fn remote_apply_decodes_and_sets_bitmap() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let (catalog, platform, events) = loaded_catalog(&fixture, dir.path()).await;

    catalog.apply(&by_title(&catalog, "Dawn")).await.unwrap();

    assert_eq!(*platform.bitmaps.lock().unwrap(), vec![(64, 36)]);
    assert_eq!(events.take(), vec!["set:64x36"]);
}

#[tokio::test]
async fn undecodable_image_fails_apply() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let (catalog, platform, events) = loaded_catalog(&fixture, dir.path()).await;
    let broken = by_title(&catalog, "Broken");

    let err = catalog.apply(&broken).await.unwrap_err();
    assert!(matches!(err, CatalogError::Image(_)), "got {err:?}");

    catalog
        .apply_in_background(broken, Scheduling::Parallel)
        .join()
        .await;
    assert_eq!(events.take(), vec!["set-failed"]);
    assert!(platform.bitmaps.lock().unwrap().is_empty());
}

#[tokio::test]
async fn untitled_download_keeps_relative_path_under_save_location() {
    let fixture = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let (catalog, platform, events) = loaded_catalog(&fixture, dir.path()).await;

    let record = untitled(&format!("{}/w/", fixture.base), "full/dawn.png");
    let path = catalog.download(&record).await.unwrap().unwrap();

    assert_eq!(path, dir.path().join("full/dawn.png"));
    assert_eq!(std::fs::read(&path).unwrap(), fixture.png.to_vec());
    assert_eq!(*platform.indexed.lock().unwrap(), vec![path]);
    assert_eq!(events.take().last().map(String::as_str), Some("downloaded"));
}

#[tokio::test]
async fn untitled_download_cannot_escape_save_location() {
    let png = png_bytes(8, 8);
    let base = serve_router(Router::new().fallback({
        let png = png.clone();
        move || async move { png }
    }))
    .await;
    let root = tempfile::tempdir().unwrap();
    let save = root.path().join("save");
    let catalog = WallpaperCatalog::new(
        ManagerSettings::builder().save_location(&save).build(),
        Arc::new(RecordingPlatform::default()),
    )
    .unwrap();

    for (full_src, expected) in [("/abs.png", "abs.png"), ("../x.png", "x.png")] {
        let record = untitled(&format!("{base}/w/"), full_src);
        let path = catalog.download(&record).await.unwrap().unwrap();
        assert_eq!(path, save.join(expected));
        assert_eq!(std::fs::read(&path).unwrap(), png.to_vec());
    }
    assert!(!root.path().join("x.png").exists());
}

#[tokio::test]
async fn interrupted_download_removes_partial_file() {
    let base = serve_truncated().await;
    let dir = tempfile::tempdir().unwrap();
    let catalog = WallpaperCatalog::new(
        ManagerSettings::builder()
            .save_location(dir.path())
            .byte_buffer(128)
            .build(),
        Arc::new(RecordingPlatform::default()),
    )
    .unwrap();
    let events = Arc::new(Events::default());
    catalog.add_download_listener(events.clone());

    let record = untitled(&format!("{base}/"), "cut.png");
    let err = catalog.download(&record).await.unwrap_err();

    assert!(matches!(err, CatalogError::Transport(_)), "got {err:?}");
    assert!(!dir.path().join("cut.png").exists());
    let events = events.take();
    assert_eq!(events.first().map(String::as_str), Some("progress:0"));
    assert!(!events.contains(&"downloaded".to_string()));
}
