pub mod components;
pub mod movement;
mod spawn;


use bevy::prelude::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
  fn build(&self, app: &mut App) {
    app.add_systems(Startup, spawn::spawn_player);
    add_player_systems(app);
    app.add_systems(
      Update,
      movement::read_player_input.before(movement::sync_ground),
    );
  }
}

/// Controller systems that don't depend on an input backend.
pub(crate) fn add_player_systems(app: &mut App) {
  app
    // Update: ground check, then actions that react to presses
    .add_systems(
      Update,
      (
        movement::sync_ground,
        movement::handle_attack,
        movement::handle_jump,
      )
        .chain(),
    )
    // FixedUpdate: per-step movement and gravity
    .add_systems(
      FixedUpdate,
      (movement::handle_movement, movement::apply_gravity).chain(),
    );
}
