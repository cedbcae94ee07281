use bevy::prelude::*;
use bevy_pixel_filter::PixelSnapper;

use super::components::{
  AttackState, CharacterVelocity, LocomotionState, PLAYER_HALF_HEIGHT, Player, PlayerController,
  PlayerIntent,
};
use crate::config::ConfigLoaded;
use crate::core::camera::CameraTarget;
use crate::input::{PlayerInput, player_input_actions};

pub fn spawn_player(
  mut commands: Commands,
  config: Res<ConfigLoaded>,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
) {
  let player = &config.player;
  let spawn_pos = Vec3::from_array(player.spawn);
  let radius = PLAYER_HALF_HEIGHT / 2.0;

  info!("Spawning player at {:?}", spawn_pos);
  commands.spawn((
    Player,
    CameraTarget,
    Mesh3d(meshes.add(Capsule3d::new(radius, PLAYER_HALF_HEIGHT))),
    MeshMaterial3d(materials.add(Color::srgb(0.2, 0.3, 0.9))),
    Transform::from_translation(spawn_pos),
    PixelSnapper::default(),
    PlayerController::from(player),
    PlayerIntent::default(),
    CharacterVelocity::default(),
    LocomotionState::Airborne,
    AttackState::default(),
    PlayerInput,
    player_input_actions(),
  ));
}
