//! Demo scene: a ground plane and a few oscillating, pixel-snapped props.

pub mod oscillation;

use bevy::prelude::*;
use bevy_pixel_filter::PixelSnapper;

use crate::config::ConfigLoaded;
use oscillation::Oscillator;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
  fn build(&self, app: &mut App) {
    app
      .add_systems(Startup, spawn_world)
      .add_systems(Update, oscillation::oscillate);
  }
}

fn spawn_world(
  mut commands: Commands,
  config: Res<ConfigLoaded>,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
) {
  commands.spawn((
    Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 40.0))),
    MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
  ));

  commands.spawn((
    DirectionalLight {
      shadows_enabled: true,
      ..default()
    },
    Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
  ));

  let cube = meshes.add(Cuboid::new(0.5, 0.5, 0.5));
  let material = materials.add(Color::srgb(0.8, 0.4, 0.2));
  for oscillator in &config.oscillators {
    commands.spawn((
      Mesh3d(cube.clone()),
      MeshMaterial3d(material.clone()),
      Transform::from_translation(Vec3::from_array(oscillator.position)),
      Oscillator::from(oscillator),
      PixelSnapper::default(),
    ));
  }

  info!("Spawned {} oscillating props", config.oscillators.len());
}
