use anyhow::Result;
use wallshelf::ManagerSettings;

use super::HostOptions;
use crate::cli::ConfigAction;

pub fn cmd_config(host: &HostOptions, action: ConfigAction) -> Result<()> {
    let path = host.config_path();

    match action {
        ConfigAction::Show => {
            let settings = host.load_settings()?;
            print!("{settings}");
            println!("Manifest: {}", settings.metadata_url());
            println!("Resources: {}", host.resources_dir().display());
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                println!("Settings already exist at {}", path.display());
                println!("Use --force to overwrite them with defaults.");
                return Ok(());
            }
            ManagerSettings::default().save_to(&path)?;
            println!("Wrote default settings to {}", path.display());
        }
    }

    Ok(())
}
