mod config;
mod core;
mod input;
mod player;
mod world;

use std::path::PathBuf;

use bevy::{
  prelude::*,
  window::{MonitorSelection, PresentMode, WindowMode, WindowResolution},
};
use clap::Parser;

use config::ConfigError;

/// 2.5D pixel-art demo for the pixel filter camera.
#[derive(Parser, Debug)]
#[command(name = "pixel_rpg")]
struct Args {
  /// Game config file (TOML). Hot-reloaded when it lives under assets/.
  #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
  config: PathBuf,
  /// Run in a window instead of borderless fullscreen.
  #[arg(long)]
  windowed: bool,
}

fn main() -> Result<(), ConfigError> {
  let args = Args::parse();
  let config = config::load_config(&args.config)?;
  let asset_path = config::asset_path(&args.config);

  let mode = if args.windowed {
    WindowMode::Windowed
  } else {
    WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
  };

  let mut app = App::new();

  app.insert_resource(Time::<Fixed>::from_hz(60.0));

  app
    .add_plugins(
      DefaultPlugins
        .set(ImagePlugin::default_nearest())
        .set(WindowPlugin {
          primary_window: Some(Window {
            resolution: WindowResolution::new(config.window.width, config.window.height),
            title: config.window.title.clone(),
            present_mode: PresentMode::AutoVsync,
            mode,
            ..default()
          }),
          ..default()
        }),
    )
    .add_plugins(config::ConfigPlugin { config, asset_path })
    .add_plugins(core::CorePlugin)
    .add_plugins(input::InputPlugin)
    .add_plugins(player::PlayerPlugin)
    .add_plugins(world::WorldPlugin);

  app.run();
  Ok(())
}
