use anyhow::{Context, Result};
use directories::ProjectDirs;
use pomodoro_ipc::DEFAULT_SOCKET_PATH;
use ratatui::style::Color;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::journal;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Journal file, `~/.pomodoro.txt` when unset
    pub journal_path: Option<PathBuf>,
    pub socket_path: PathBuf,
    pub media: MediaConfig,
    pub notifications: NotificationConfig,
    pub theme: Theme,
    pub icons: Icons,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MediaConfig {
    pub enabled: bool,
    /// Program invoked as `<command> play` and `<command> pause`
    pub command: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Theme {
    #[serde(deserialize_with = "hex_to_color")]
    pub background: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub selection: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub black: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub task: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub pause: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub rest: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub gray: Color,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Icons {
    pub play: String,
    pub pause: String,
    pub select: String,
    pub separator: String,
    pub header_left: String,
    pub header_right: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            journal_path: None,
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            media: MediaConfig::default(),
            notifications: NotificationConfig::default(),
            theme: Theme::default(),
            icons: Icons::default(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "playerctl".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(9, 14, 19),
            foreground: Color::Rgb(197, 201, 199),
            selection: Color::Rgb(230, 195, 132),
            black: Color::Rgb(13, 12, 12),
            task: Color::Rgb(228, 104, 118),
            pause: Color::Rgb(196, 178, 138),
            rest: Color::Rgb(138, 154, 123),
            gray: Color::Rgb(164, 167, 164),
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            play: "▶".to_string(),
            pause: "⏸".to_string(),
            select: "▸".to_string(),
            separator: "│".to_string(),
            header_left: "⟪ ".to_string(),
            header_right: " ⟫".to_string(),
        }
    }
}

impl Config {
    pub fn journal_path(&self) -> Result<PathBuf> {
        match &self.journal_path {
            Some(path) => Ok(path.clone()),
            None => journal::default_path()
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory")),
        }
    }
}

fn hex_to_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    if !s.starts_with('#') || s.len() != 7 {
        return Err(serde::de::Error::custom("invalid hex color format"));
    }
    let r = u8::from_str_radix(&s[1..3], 16).map_err(serde::de::Error::custom)?;
    let g = u8::from_str_radix(&s[3..5], 16).map_err(serde::de::Error::custom)?;
    let b = u8::from_str_radix(&s[5..7], 16).map_err(serde::de::Error::custom)?;
    Ok(Color::Rgb(r, g, b))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pomodoro", "Pomodoro")
}

/// Directory for the diagnostics log.
pub fn data_dir() -> Result<PathBuf> {
    let proj_dirs =
        project_dirs().ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory at {:?}", data_dir))?;
    Ok(data_dir.to_path_buf())
}

/// Load the config from `path`, or from the platform config directory when
/// no path is given. A missing default file yields the defaults; a missing
/// explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return read_config(path);
    }
    match project_dirs() {
        Some(proj_dirs) => {
            let path = proj_dirs.config_dir().join("pomodoro.toml");
            if path.exists() {
                read_config(&path)
            } else {
                Ok(Config::default())
            }
        }
        None => Ok(Config::default()),
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {:?}", path))?;
    parse_config(&config_str).with_context(|| format!("Failed to parse config file at {:?}", path))
}

fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
        assert!(config.journal_path.is_none());
        assert!(!config.media.enabled);
        assert_eq!(config.media.command, "playerctl");
        assert!(config.notifications.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            r##"
journal_path = "/tmp/pom.txt"

[media]
enabled = true

[theme]
task = "#ff0000"
"##,
        )
        .unwrap();
        assert_eq!(config.journal_path().unwrap(), PathBuf::from("/tmp/pom.txt"));
        assert!(config.media.enabled);
        assert_eq!(config.media.command, "playerctl");
        assert_eq!(config.theme.task, Color::Rgb(255, 0, 0));
        assert_eq!(config.theme.rest, Theme::default().rest);
    }

    #[test]
    fn bad_color_is_rejected() {
        assert!(parse_config("[theme]\ntask = \"red\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomodoro.toml");
        fs::write(&path, "socket_path = \"/tmp/other.sock\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/other.sock"));
    }
}
