use crate::manifest::{self, DEFAULT_METADATA_FILE_NAME};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_APP_NAME: &str = "My Theme";
const DEFAULT_PACKAGE_ID: &str = "your_id";
const DEFAULT_PACKAGE_NAME: &str = "com.example.name";
const DEFAULT_SERVER_URL: &str = "http://www.the1template.com";
const DEFAULT_STORAGE_URL: &str = "http://storage.the1template.com";
const DEFAULT_THUMB_SUFFIX: &str = "_small";
const DEFAULT_BYTE_BUFFER: usize = 2048;

/// Catalog configuration snapshot.
///
/// The catalog only ever reads a whole snapshot; swap it with
/// `WallpaperCatalog::set_settings` rather than mutating it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    /// Drawable names of the bundled wallpapers, in display order
    pub local_wallpapers: Vec<String>,
    pub app_name: String,
    /// Overrides the `{storage}/{path}/wallpapers.json` manifest location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<String>,
    pub package_id: String,
    /// Package the local drawables are resolved in
    pub package_name: String,
    /// Directory downloads are written to
    pub save_location: PathBuf,
    pub server_url: String,
    pub storage_url: String,
    /// Appended to a local name to find its thumbnail drawable
    pub thumb_suffix: String,
    /// Remote path segment; `/wallpapers/{package_id}` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallpaper_path: Option<String>,
    /// Remote fetches are skipped entirely when false
    pub web_enabled: bool,
    /// Read chunk size for downloads, in bytes
    pub byte_buffer: usize,
}

fn default_save_location() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".theme_wallpapers")
}

fn default_wallpaper_path(package_id: &str) -> String {
    format!("/wallpapers/{package_id}")
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            local_wallpapers: Vec::new(),
            app_name: DEFAULT_APP_NAME.to_string(),
            metadata_url: None,
            package_id: DEFAULT_PACKAGE_ID.to_string(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            save_location: default_save_location(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            thumb_suffix: DEFAULT_THUMB_SUFFIX.to_string(),
            wallpaper_path: None,
            web_enabled: true,
            byte_buffer: DEFAULT_BYTE_BUFFER,
        }
    }
}

impl ManagerSettings {
    pub fn builder() -> ManagerSettingsBuilder {
        ManagerSettingsBuilder::default()
    }

    /// Manifest URL: the explicit override, or the default file under the wallpaper path.
    pub fn metadata_url(&self) -> String {
        match &self.metadata_url {
            Some(url) => url.clone(),
            None => format!("{}{}", self.path_prefix(), DEFAULT_METADATA_FILE_NAME),
        }
    }

    /// The configured wallpaper path, or the one derived from the package id.
    pub fn wallpaper_path(&self) -> String {
        match &self.wallpaper_path {
            Some(path) => path.clone(),
            None => default_wallpaper_path(&self.package_id),
        }
    }

    /// `{storage_url}/{wallpaper_path}/`, the base for relative manifest paths.
    pub fn path_prefix(&self) -> String {
        manifest::path_prefix(&self.storage_url, &self.wallpaper_path())
    }

    /// Download chunk size, never zero.
    pub fn read_chunk_size(&self) -> usize {
        self.byte_buffer.max(1)
    }

    /// Return the path to the settings file.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "wallshelf", "wallshelf")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("settings.toml")
    }

    /// Load settings from the default location, creating it if missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, writing defaults if missing or corrupt.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path)?;
            return Ok(settings);
        }

        let data = fs::read_to_string(path)?;
        match toml::from_str::<Self>(&data) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse settings, using defaults"
                );
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = toml::to_string_pretty(self)?;
        fs::write(path, data)?;

        Ok(())
    }
}

impl fmt::Display for ManagerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Local Wallpapers: [{}]", self.local_wallpapers.join(", "))?;
        writeln!(f, "App Name: {}", self.app_name)?;
        writeln!(
            f,
            "Metadata URL: {}",
            self.metadata_url.as_deref().unwrap_or("(default)")
        )?;
        writeln!(f, "Package ID: {}", self.package_id)?;
        writeln!(f, "Package Name: {}", self.package_name)?;
        writeln!(f, "Save Location: {}", self.save_location.display())?;
        writeln!(f, "Server URL: {}", self.server_url)?;
        writeln!(f, "Storage URL: {}", self.storage_url)?;
        writeln!(f, "Thumb Suffix: {}", self.thumb_suffix)?;
        writeln!(f, "Wallpaper Path: {}", self.wallpaper_path())?;
        writeln!(f, "Web Enabled: {}", self.web_enabled)?;
        writeln!(f, "Byte Buffer: {}", self.byte_buffer)
    }
}

/// Fluent builder for [`ManagerSettings`].
///
/// Unset fields fall back to the defaults; an unset wallpaper path stays unset
/// and follows the package id.
#[derive(Debug, Clone, Default)]
pub struct ManagerSettingsBuilder {
    local_wallpapers: Vec<String>,
    app_name: Option<String>,
    metadata_url: Option<String>,
    package_id: Option<String>,
    package_name: Option<String>,
    save_location: Option<PathBuf>,
    server_url: Option<String>,
    storage_url: Option<String>,
    thumb_suffix: Option<String>,
    wallpaper_path: Option<String>,
    web_enabled: Option<bool>,
    byte_buffer: Option<usize>,
}

impl ManagerSettingsBuilder {
    pub fn add_local_wallpaper(mut self, name: impl Into<String>) -> Self {
        self.local_wallpapers.push(name.into());
        self
    }

    pub fn add_local_wallpapers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_wallpapers
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = Some(url.into());
        self
    }

    pub fn package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }

    pub fn package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    pub fn save_location(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_location = Some(dir.into());
        self
    }

    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn storage_url(mut self, url: impl Into<String>) -> Self {
        self.storage_url = Some(url.into());
        self
    }

    pub fn thumb_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.thumb_suffix = Some(suffix.into());
        self
    }

    pub fn wallpaper_path(mut self, path: impl Into<String>) -> Self {
        self.wallpaper_path = Some(path.into());
        self
    }

    pub fn web_enabled(mut self, enabled: bool) -> Self {
        self.web_enabled = Some(enabled);
        self
    }

    pub fn byte_buffer(mut self, bytes: usize) -> Self {
        self.byte_buffer = Some(bytes);
        self
    }

    pub fn build(self) -> ManagerSettings {
        let defaults = ManagerSettings::default();

        ManagerSettings {
            local_wallpapers: self.local_wallpapers,
            app_name: self.app_name.unwrap_or(defaults.app_name),
            metadata_url: self.metadata_url,
            package_id: self.package_id.unwrap_or(defaults.package_id),
            package_name: self.package_name.unwrap_or(defaults.package_name),
            save_location: self.save_location.unwrap_or(defaults.save_location),
            server_url: self.server_url.unwrap_or(defaults.server_url),
            storage_url: self.storage_url.unwrap_or(defaults.storage_url),
            thumb_suffix: self.thumb_suffix.unwrap_or(defaults.thumb_suffix),
            wallpaper_path: self.wallpaper_path,
            web_enabled: self.web_enabled.unwrap_or(defaults.web_enabled),
            byte_buffer: self.byte_buffer.unwrap_or(defaults.byte_buffer),
        }
    }
}
