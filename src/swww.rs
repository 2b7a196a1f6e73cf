use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone)]
pub struct Transition {
    pub transition_type: TransitionType,
    pub duration: f32,
    pub fps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionType {
    #[default]
    Fade,
    Wipe,
    Grow,
    Center,
    Outer,
    None,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            transition_type: TransitionType::Fade,
            duration: 1.0,
            fps: 60,
        }
    }
}

impl TransitionType {
    fn as_str(&self) -> &'static str {
        match self {
            TransitionType::Fade => "fade",
            TransitionType::Wipe => "wipe",
            TransitionType::Grow => "grow",
            TransitionType::Center => "center",
            TransitionType::Outer => "outer",
            TransitionType::None => "none",
        }
    }

    /// Parse a transition name, falling back to fade for unknown values.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "wipe" => TransitionType::Wipe,
            "grow" => TransitionType::Grow,
            "center" => TransitionType::Center,
            "outer" => TransitionType::Outer,
            "none" => TransitionType::None,
            _ => TransitionType::Fade,
        }
    }
}

/// Initialize swww daemon if not running
pub fn ensure_daemon() -> Result<()> {
    let status = Command::new("swww").arg("query").output();

    match status {
        Ok(output) if output.status.success() => Ok(()),
        _ => {
            Command::new("swww-daemon")
                .spawn()
                .context("Failed to start swww-daemon")?;

            // Give it a moment to initialize
            std::thread::sleep(std::time::Duration::from_millis(100));
            Ok(())
        }
    }
}

fn img_args(output: Option<&str>, path: &Path, transition: &Transition) -> Vec<String> {
    let mut args = vec!["img".to_string()];
    if let Some(output) = output {
        args.push("-o".into());
        args.push(output.into());
    }
    args.push(path.to_string_lossy().into_owned());
    args.extend([
        "--transition-type".into(),
        transition.transition_type.as_str().into(),
        "--transition-duration".into(),
        transition.duration.to_string(),
        "--transition-fps".into(),
        transition.fps.to_string(),
    ]);
    args
}

/// Set wallpaper from an image file, on one output or on all of them.
pub fn set_wallpaper(output: Option<&str>, path: &Path, transition: &Transition) -> Result<()> {
    ensure_daemon()?;

    let result = Command::new("swww")
        .args(img_args(output, path, transition))
        .output()
        .context("Failed to run swww")?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        anyhow::bail!("swww failed: {}", stderr);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn img_args_target_all_outputs_without_name() {
        let args = img_args(None, Path::new("/tmp/a.png"), &Transition::default());
        assert_eq!(args[0], "img");
        assert_eq!(args[1], "/tmp/a.png");
        assert!(!args.contains(&"-o".to_string()));
        assert!(args.windows(2).any(|w| w == ["--transition-type", "fade"]));
    }

    #[test]
    fn img_args_select_named_output() {
        let args = img_args(Some("DP-1"), Path::new("/tmp/a.png"), &Transition::default());
        assert_eq!(&args[..4], ["img", "-o", "DP-1", "/tmp/a.png"]);
    }

    #[test]
    fn transition_names_parse_case_insensitively() {
        assert_eq!(TransitionType::parse("Wipe"), TransitionType::Wipe);
        assert_eq!(TransitionType::parse("none"), TransitionType::None);
        assert_eq!(TransitionType::parse("sparkle"), TransitionType::Fade);
    }
}
