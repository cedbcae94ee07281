mod plugin;

use std::path::{Path, PathBuf};

use bevy::{asset::Asset, prelude::*, reflect::TypePath};
use bevy_pixel_filter::PixelFilter;
pub use plugin::ConfigPlugin;
use serde::Deserialize;

use crate::world::oscillation::Wave;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/game.config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    source: toml::de::Error,
  },
}

#[derive(Asset, TypePath, Deserialize, Debug, Clone)]
pub struct GameConfig {
  pub window: WindowConfig,
  pub camera: CameraConfig,
  #[serde(default)]
  pub pixel_filter: PixelFilter,
  pub player: PlayerConfig,
  #[serde(default)]
  pub oscillators: Vec<OscillatorConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WindowConfig {
  pub width: u32,
  pub height: u32,
  pub title: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CameraConfig {
  pub fov_degrees: f32,
  /// Distance behind the followed target.
  pub distance: f32,
  /// Height above the followed target.
  pub height: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PlayerConfig {
  pub spawn: [f32; 3],
  pub walk_speed: f32,
  pub run_speed: f32,
  pub jump_velocity: f32,
  pub gravity: f32,
  pub ground_distance_offset: f32,
  pub attack_cooldown: f32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OscillatorConfig {
  pub position: [f32; 3],
  pub speed: [f32; 3],
  pub distance: [f32; 3],
  #[serde(default)]
  pub wave: Wave,
}

/// Reads and parses a game config file.
pub fn load_config(path: &Path) -> Result<GameConfig, ConfigError> {
  let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_config(&text).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

pub fn parse_config(text: &str) -> Result<GameConfig, toml::de::Error> {
  toml::from_str(text)
}

/// Asset path of the config file for hot reload, when it lives under
/// `assets/`.
pub fn asset_path(path: &Path) -> Option<String> {
  let relative = path.strip_prefix("assets").ok()?;
  relative.to_str().map(|s| s.replace('\\', "/"))
}

#[derive(Resource)]
pub struct ConfigHandle(pub Handle<GameConfig>);

#[derive(Resource, Debug, Clone)]
pub struct ConfigLoaded {
  pub window: WindowConfig,
  pub camera: CameraConfig,
  pub pixel_filter: PixelFilter,
  pub player: PlayerConfig,
  pub oscillators: Vec<OscillatorConfig>,
}

impl From<GameConfig> for ConfigLoaded {
  fn from(config: GameConfig) -> Self {
    Self {
      window: config.window,
      camera: config.camera,
      pixel_filter: config.pixel_filter,
      player: config.player,
      oscillators: config.oscillators,
    }
  }
}
