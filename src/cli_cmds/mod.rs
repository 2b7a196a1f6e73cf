mod catalog_cmds;
mod config_cmds;

pub use catalog_cmds::{cmd_apply, cmd_download, cmd_list};
pub use config_cmds::cmd_config;

use anyhow::Result;
use std::path::PathBuf;
use wallshelf::swww::{Transition, TransitionType};
use wallshelf::utils::expand_tilde;
use wallshelf::{DesktopPlatform, ManagerSettings};

/// Host-side options shared by every subcommand
pub struct HostOptions {
    pub resources: Option<PathBuf>,
    pub output: Option<String>,
    pub transition: String,
    pub config: Option<PathBuf>,
}

impl HostOptions {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(ManagerSettings::config_path)
    }

    pub fn load_settings(&self) -> Result<ManagerSettings> {
        ManagerSettings::load_from(&self.config_path())
    }

    /// Bundled wallpapers default to a `resources` directory next to the settings file.
    pub fn resources_dir(&self) -> PathBuf {
        match &self.resources {
            Some(dir) => expand_tilde(dir),
            None => self
                .config_path()
                .parent()
                .map(|dir| dir.join("resources"))
                .unwrap_or_else(|| PathBuf::from("resources")),
        }
    }

    pub fn platform(&self) -> DesktopPlatform {
        let transition = Transition {
            transition_type: TransitionType::parse(&self.transition),
            ..Transition::default()
        };
        DesktopPlatform::new(self.resources_dir())
            .with_output(self.output.clone())
            .with_transition(transition)
    }
}
