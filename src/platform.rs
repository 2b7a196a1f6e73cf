//! Host platform seam
//!
//! The catalog never touches the wallpaper service or the resource table
//! directly; everything goes through [`Platform`].

mod desktop;

pub use desktop::DesktopPlatform;

use anyhow::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Resource type bundled wallpapers are looked up under
pub const DRAWABLE: &str = "drawable";

/// Opaque handle to a bundled resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host capabilities the catalog relies on.
///
/// Calls may block; the catalog runs them off the async executor threads.
pub trait Platform: Send + Sync {
    /// Resolve `name` of resource `kind` within `package`, `None` when absent.
    fn resource_id(&self, name: &str, kind: &str, package: &str) -> Option<ResourceId>;

    /// Set the system wallpaper from a bundled resource.
    fn set_resource(&self, id: ResourceId) -> Result<()>;

    /// Set the system wallpaper from a decoded image.
    fn set_bitmap(&self, bitmap: &DynamicImage) -> Result<()>;

    /// Make a freshly written file known to the host's media index.
    fn index_media(&self, path: &Path) -> Result<()>;
}
