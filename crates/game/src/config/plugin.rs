use bevy::{
  asset::{AssetEvent, AssetLoadFailedEvent},
  ecs::message::MessageReader,
  prelude::*,
  window::PrimaryWindow,
};
use bevy_common_assets::toml::TomlAssetPlugin;
use bevy_pixel_filter::PixelFilter;

use super::{ConfigHandle, ConfigLoaded, GameConfig};
use crate::core::camera::{FollowCamera, GameCamera};
use crate::player::components::{Player, PlayerController};

/// Inserts the startup config and, when `asset_path` is set, hot-reloads it
/// through the asset server.
pub struct ConfigPlugin {
  pub config: GameConfig,
  pub asset_path: Option<String>,
}

impl Plugin for ConfigPlugin {
  fn build(&self, app: &mut App) {
    app.insert_resource(ConfigLoaded::from(self.config.clone()));

    if let Some(path) = self.asset_path.clone() {
      app
        .add_plugins(TomlAssetPlugin::<GameConfig>::new(&["config.toml"]))
        .add_systems(
          PreStartup,
          move |mut commands: Commands, asset_server: Res<AssetServer>| {
            let handle: Handle<GameConfig> = asset_server.load(path.clone());
            commands.insert_resource(ConfigHandle(handle));
          },
        )
        .add_systems(
          Update,
          (watch_config_changes, report_config_failures).run_if(resource_exists::<ConfigHandle>),
        );
    } else {
      info!("Config is outside the assets directory, hot reload disabled");
    }

    app.add_systems(
      Update,
      (
        update_window_on_config_change,
        update_camera_on_config_change,
        update_pixel_filter_on_config_change,
        update_player_on_config_change,
      ),
    );
  }
}

fn watch_config_changes(
  mut commands: Commands,
  config_handle: Res<ConfigHandle>,
  mut messages: MessageReader<AssetEvent<GameConfig>>,
  configs: Res<Assets<GameConfig>>,
) {
  for event in messages.read() {
    if let AssetEvent::Modified { id } = event {
      if config_handle.0.id() == *id {
        if let Some(config) = configs.get(&config_handle.0) {
          info!("Config reloaded!");
          commands.insert_resource(ConfigLoaded::from(config.clone()));
        }
      }
    }
  }
}

/// A broken edit keeps the previous config running.
fn report_config_failures(
  config_handle: Res<ConfigHandle>,
  mut messages: MessageReader<AssetLoadFailedEvent<GameConfig>>,
) {
  for event in messages.read() {
    if event.id == config_handle.0.id() {
      warn!(
        "Config reload failed, keeping previous config: {}",
        event.error
      );
    }
  }
}

fn update_window_on_config_change(
  config: Res<ConfigLoaded>,
  mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
  if config.is_changed() {
    if let Ok(mut window) = windows.single_mut() {
      window
        .resolution
        .set(config.window.width as f32, config.window.height as f32);
      window.title.clone_from(&config.window.title);
    }
  }
}

fn update_camera_on_config_change(
  config: Res<ConfigLoaded>,
  mut cameras: Query<(&mut Projection, &mut FollowCamera), With<GameCamera>>,
) {
  if config.is_changed() {
    for (mut projection, mut follow) in &mut cameras {
      if let Projection::Perspective(ref mut perspective) = *projection {
        perspective.fov = config.camera.fov_degrees.to_radians();
      }
      follow.set_if_neq(FollowCamera::from(&config.camera));
    }
  }
}

/// Only writes when the settings differ so the filter doesn't recompute
/// for unrelated config edits.
fn update_pixel_filter_on_config_change(
  config: Res<ConfigLoaded>,
  mut filters: Query<&mut PixelFilter, With<GameCamera>>,
) {
  if config.is_changed() {
    for mut filter in &mut filters {
      filter.set_if_neq(config.pixel_filter.clone());
    }
  }
}

fn update_player_on_config_change(
  config: Res<ConfigLoaded>,
  mut players: Query<&mut PlayerController, With<Player>>,
) {
  if config.is_changed() {
    for mut controller in &mut players {
      controller.apply_config(&config.player);
    }
  }
}
