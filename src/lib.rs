//! Wallpaper catalog for theme applications.
//!
//! Collects wallpapers bundled with an application and those listed in a
//! remote JSON manifest, downloads remote ones with progress reporting, and
//! applies a chosen wallpaper through a [`Platform`] adapter.

pub mod catalog;
pub mod error;
pub mod events;
pub mod manifest;
pub mod platform;
pub mod record;
pub mod remote;
pub mod settings;
pub mod swww;
pub mod task;
mod thumbnail;
pub mod utils;

pub use catalog::WallpaperCatalog;
pub use error::{CatalogError, Result};
pub use events::{
    DownloadProgress, LocalWallpaperListener, RemoteWallpaperListener, WallpaperDownloadListener,
    WallpaperSetListener,
};
pub use platform::{DesktopPlatform, Platform, ResourceId};
pub use record::{Origin, WallpaperRecord};
pub use settings::{ManagerSettings, ManagerSettingsBuilder};
pub use task::{Scheduling, TaskHandle, TaskStatus};
