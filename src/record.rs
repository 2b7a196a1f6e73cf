use crate::manifest::ManifestEntry;
use crate::platform::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Scheme used to address bundled drawables by name
pub const RESOURCE_URI_BASE: &str = "android.resource://";

/// Where a wallpaper comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Bundled with the application as a drawable resource
    Local,
    /// Listed in the remote manifest
    Remote,
}

/// One wallpaper, local or remote.
///
/// Records are rebuilt from scratch on every fetch; nothing here is stable
/// across fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallpaperRecord {
    relative_full_url: String,
    relative_thumb_url: String,
    path_url: String,
    full_uri: String,
    thumb_uri: String,
    full_resource: Option<ResourceId>,
    thumb_resource: Option<ResourceId>,
    title: String,
    byline: String,
    /// Declared size in bytes, 0 when unknown
    file_size: u64,
    origin: Origin,
}

/// `android.resource://{package}/drawable/{name}`
pub fn resource_uri(package_name: &str, name: &str) -> String {
    format!("{RESOURCE_URI_BASE}{package_name}/drawable/{name}")
}

impl WallpaperRecord {
    /// Build a bundled wallpaper from its resolved resource handles.
    ///
    /// `thumb` is `None` when the thumbnail drawable does not exist.
    pub fn local(
        package_name: &str,
        name: &str,
        thumb_suffix: &str,
        full: ResourceId,
        thumb: Option<ResourceId>,
    ) -> Self {
        Self {
            relative_full_url: String::new(),
            relative_thumb_url: String::new(),
            path_url: String::new(),
            full_uri: resource_uri(package_name, name),
            thumb_uri: resource_uri(package_name, &format!("{name}{thumb_suffix}")),
            full_resource: Some(full),
            thumb_resource: thumb,
            title: String::new(),
            byline: String::new(),
            file_size: 0,
            origin: Origin::Local,
        }
    }

    /// Build a remote wallpaper from a manifest entry and the `{storage}/{path}/` prefix.
    pub fn remote(path_prefix: &str, entry: ManifestEntry) -> Self {
        let full_uri = format!("{path_prefix}{}", entry.full_src);
        let thumb_uri = format!("{path_prefix}{}", entry.thumb_src);
        Self {
            relative_full_url: entry.full_src,
            relative_thumb_url: entry.thumb_src,
            path_url: path_prefix.to_string(),
            full_uri,
            thumb_uri,
            full_resource: None,
            thumb_resource: None,
            title: entry.title,
            byline: entry.byline,
            file_size: entry.file_size,
            origin: Origin::Remote,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_local(&self) -> bool {
        self.origin == Origin::Local
    }

    /// Absolute URL of the full image (prefix + relative path)
    pub fn full_url(&self) -> String {
        format!("{}{}", self.path_url, self.relative_full_url)
    }

    /// Absolute URL of the thumbnail (prefix + relative path)
    pub fn thumb_url(&self) -> String {
        format!("{}{}", self.path_url, self.relative_thumb_url)
    }

    pub fn relative_full_url(&self) -> &str {
        &self.relative_full_url
    }

    pub fn relative_thumb_url(&self) -> &str {
        &self.relative_thumb_url
    }

    pub fn full_uri(&self) -> &str {
        &self.full_uri
    }

    pub fn thumb_uri(&self) -> &str {
        &self.thumb_uri
    }

    pub fn full_resource(&self) -> Option<ResourceId> {
        self.full_resource
    }

    pub fn thumb_resource(&self) -> Option<ResourceId> {
        self.thumb_resource
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn byline(&self) -> &str {
        &self.byline
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Name of the file a download is saved under, relative to the save location.
    ///
    /// Titled wallpapers keep the extension of their remote path; untitled ones
    /// reuse the relative path with root, `.` and `..` segments dropped.
    pub fn file_name(&self) -> String {
        if self.title.is_empty() {
            return Path::new(&self.relative_full_url)
                .components()
                .filter_map(|component| match component {
                    Component::Normal(part) => part.to_str(),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/");
        }

        let title: String = self
            .title
            .chars()
            .map(|ch| if ch == '/' || ch == '\\' { '_' } else { ch })
            .collect();
        let file_part = self
            .relative_full_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_full_url);

        match file_part.rfind('.') {
            Some(dot) => format!("{title}{}", &file_part[dot..]),
            None => title,
        }
    }

    /// Download destination under `save_location`, `None` when the record
    /// yields no usable file name.
    pub fn save_path(&self, save_location: &Path) -> Option<PathBuf> {
        let name = self.file_name();
        if name.is_empty() || name == "." || name == ".." {
            return None;
        }
        Some(save_location.join(name))
    }
}

impl fmt::Display for WallpaperRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = |id: Option<ResourceId>| {
            id.map(|id| id.to_string())
                .unwrap_or_else(|| "none".into())
        };
        writeln!(f, "Relative Full URL: {}", self.relative_full_url)?;
        writeln!(f, "Relative Thumb URL: {}", self.relative_thumb_url)?;
        writeln!(f, "Full Uri: {}", self.full_uri)?;
        writeln!(f, "Thumb Uri: {}", self.thumb_uri)?;
        writeln!(f, "Full Resource: {}", resource(self.full_resource))?;
        writeln!(f, "Thumb Resource: {}", resource(self.thumb_resource))?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "By Line: {}", self.byline)?;
        writeln!(f, "File Size: {}", self.file_size)?;
        writeln!(f, "Local: {}", self.is_local())
    }
}
