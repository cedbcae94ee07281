use bevy::prelude::*;

use crate::config::PlayerConfig;

/// Distance from the player's origin to its feet.
pub const PLAYER_HALF_HEIGHT: f32 = 0.5;

#[derive(Component)]
pub struct Player;

/// Tunables and ability gates of a player character.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerController {
  pub walk_speed: f32,
  pub run_speed: f32,
  pub jump_velocity: f32,
  pub gravity: f32,
  /// Extra reach below the feet that still counts as standing.
  pub ground_distance_offset: f32,
  pub attack_cooldown: f32,
  pub can_move: bool,
  pub can_jump: bool,
  pub can_attack: bool,
}

impl From<&PlayerConfig> for PlayerController {
  fn from(config: &PlayerConfig) -> Self {
    Self {
      walk_speed: config.walk_speed,
      run_speed: config.run_speed,
      jump_velocity: config.jump_velocity,
      gravity: config.gravity,
      ground_distance_offset: config.ground_distance_offset,
      attack_cooldown: config.attack_cooldown,
      can_move: true,
      can_jump: true,
      can_attack: true,
    }
  }
}

impl PlayerController {
  /// Applies reloaded tunables, keeping the ability gates.
  pub fn apply_config(&mut self, config: &PlayerConfig) {
    *self = Self {
      can_move: self.can_move,
      can_jump: self.can_jump,
      can_attack: self.can_attack,
      ..Self::from(config)
    };
  }

  pub fn speed(&self, running: bool) -> f32 {
    if running { self.run_speed } else { self.walk_speed }
  }
}

/// What the player asked for this frame.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct PlayerIntent {
  /// x is right, y is forward.
  pub movement: Vec2,
  pub running: bool,
  pub jump_held: bool,
  pub attack_held: bool,
  /// Pressed this frame and not the previous one.
  pub jump_started: bool,
  pub attack_started: bool,
}

impl PlayerIntent {
  /// Updates held buttons and derives the press edges.
  pub fn press(&mut self, jump: bool, attack: bool) {
    self.jump_started = jump && !self.jump_held;
    self.attack_started = attack && !self.attack_held;
    self.jump_held = jump;
    self.attack_held = attack;
  }

  pub fn is_moving(&self) -> bool {
    self.movement != Vec2::ZERO
  }
}

/// Vertical velocity; horizontal movement is applied directly.
#[derive(Component, Default)]
pub struct CharacterVelocity(pub f32);

#[derive(Component, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionState {
  #[default]
  Grounded,
  Airborne,
}

/// Attack cooldown. An attack can only start once the timer has run out.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct AttackState {
  pub timer: f32,
  /// Set on the frame an attack starts.
  pub started: bool,
}

impl AttackState {
  pub fn is_attacking(&self) -> bool {
    self.timer > 0.0
  }

  /// Advances the cooldown by `dt`, starting an attack on `pressed` when it
  /// has run out. Returns whether an attack started.
  pub fn tick(&mut self, pressed: bool, cooldown: f32, dt: f32) -> bool {
    if self.timer <= 0.0 {
      self.started = pressed;
      if pressed {
        self.timer = cooldown;
      }
    } else {
      self.started = false;
      self.timer -= dt;
    }
    self.started
  }
}
