use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use wallshelf::{
    DownloadProgress, WallpaperCatalog, WallpaperDownloadListener, WallpaperRecord,
};

use super::HostOptions;

async fn open_catalog(host: &HostOptions, include_remote: bool) -> Result<WallpaperCatalog> {
    let settings = host.load_settings()?;
    let platform = Arc::new(host.platform());
    let catalog = WallpaperCatalog::new(settings, platform)?;

    catalog.fetch_local();
    if include_remote {
        if let Err(e) = catalog.fetch_remote().await {
            warn!(error = %e, "remote wallpapers unavailable");
        }
    }
    Ok(catalog)
}

/// Bundled wallpapers have no title; show their drawable name instead.
fn display_name(record: &WallpaperRecord) -> &str {
    if !record.title().is_empty() {
        return record.title();
    }
    record
        .full_uri()
        .rsplit('/')
        .next()
        .unwrap_or(record.full_uri())
}

/// Find a wallpaper by 1-based index, title, relative path or URI suffix.
fn select<'a>(wallpapers: &'a [WallpaperRecord], selector: &str) -> Option<&'a WallpaperRecord> {
    if let Ok(index) = selector.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| wallpapers.get(i));
    }

    wallpapers
        .iter()
        .find(|wp| display_name(wp).eq_ignore_ascii_case(selector))
        .or_else(|| {
            wallpapers.iter().find(|wp| {
                (!wp.relative_full_url().is_empty() && wp.relative_full_url() == selector)
                    || wp.full_uri().ends_with(selector)
            })
        })
}

fn require<'a>(wallpapers: &'a [WallpaperRecord], selector: &str) -> Result<&'a WallpaperRecord> {
    select(wallpapers, selector).with_context(|| {
        format!(
            "No wallpaper matches '{}' ({} available, see 'wallshelf list')",
            selector,
            wallpapers.len()
        )
    })
}

pub async fn cmd_list(host: &HostOptions, local_only: bool) -> Result<()> {
    let catalog = open_catalog(host, !local_only).await?;
    let wallpapers = catalog.wallpapers();

    if wallpapers.is_empty() {
        eprintln!("No wallpapers found.");
        eprintln!(
            "Bundled wallpapers are read from: {}",
            host.resources_dir().display()
        );
        return Ok(());
    }

    for (i, wp) in wallpapers.iter().enumerate() {
        let origin = if wp.is_local() { "local" } else { "remote" };
        let byline = if wp.byline().is_empty() {
            String::new()
        } else {
            format!(" by {}", wp.byline())
        };
        println!(
            "{:>3}  {:<6}  {}{}  {}",
            i + 1,
            origin,
            display_name(wp),
            byline,
            wp.full_uri()
        );
    }

    Ok(())
}

/// Prints a single updating progress line on stderr.
struct ProgressLine;

impl WallpaperDownloadListener for ProgressLine {
    fn on_wallpaper_downloading(&self, record: &WallpaperRecord, progress: DownloadProgress) {
        let status = match progress {
            DownloadProgress::Percent(percent) => format!("{percent:>3}%"),
            DownloadProgress::Unknown { bytes } => format!("{} KiB", bytes / 1024),
        };
        eprint!("\rDownloading {}: {}", display_name(record), status);
        let _ = std::io::stderr().flush();
    }

    fn on_wallpaper_downloaded(&self, _record: &WallpaperRecord, _path: &Path) {
        eprintln!();
    }
}

pub async fn cmd_download(host: &HostOptions, selector: &str) -> Result<()> {
    let catalog = open_catalog(host, true).await?;
    let wallpapers = catalog.wallpapers();
    let wp = require(&wallpapers, selector)?;

    catalog.add_download_listener(Arc::new(ProgressLine));
    match catalog.download(wp).await {
        Ok(Some(path)) => println!("{}", path.display()),
        Ok(None) => println!("{} is bundled, nothing to download", display_name(wp)),
        Err(e) => {
            eprintln!();
            return Err(e).with_context(|| format!("Failed to download {}", wp.full_url()));
        }
    }

    Ok(())
}

pub async fn cmd_apply(host: &HostOptions, selector: &str) -> Result<()> {
    let catalog = open_catalog(host, true).await?;
    let wallpapers = catalog.wallpapers();
    let wp = require(&wallpapers, selector)?;

    catalog
        .apply(wp)
        .await
        .with_context(|| format!("Failed to apply {}", display_name(wp)))?;
    println!("Applied {}", display_name(wp));

    Ok(())
}
