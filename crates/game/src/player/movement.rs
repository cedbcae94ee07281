use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

use super::components::{
  AttackState, CharacterVelocity, LocomotionState, PLAYER_HALF_HEIGHT, Player, PlayerController,
  PlayerIntent,
};
use crate::input::{Attack, Jump, Move, MoveDepth, PlayerInput, Run};

/// Largest turn toward the movement direction per fixed step.
pub const MAX_TURN_PER_STEP: f32 = 10f32.to_radians();

/// One fixed step of ground movement.
///
/// The character turns toward `movement` by at most [`MAX_TURN_PER_STEP`]
/// unless attacking, and moves by `movement * speed / 10` unless attacking
/// on the ground.
pub fn move_step(
  transform: &Transform,
  movement: Vec2,
  speed: f32,
  attacking: bool,
  grounded: bool,
) -> Transform {
  let mut next = *transform;
  let direction = Vec3::new(movement.x, 0.0, -movement.y);
  if direction == Vec3::ZERO {
    return next;
  }

  if !attacking {
    let facing = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
    next.rotation = rotate_towards(transform.rotation, facing, MAX_TURN_PER_STEP);
  }
  if !attacking || !grounded {
    next.translation += direction * (speed / 10.0);
  }
  next
}

fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
  let angle = from.angle_between(to);
  if angle <= max_angle {
    to
  } else {
    from.slerp(to, max_angle / angle)
  }
}

/// Integrates gravity for one step and stops at the ground plane.
/// Returns the new height and vertical velocity.
pub fn fall_step(y: f32, velocity: f32, gravity: f32, dt: f32) -> (f32, f32) {
  let velocity = velocity - gravity * dt;
  let y = y + velocity * dt;
  if y <= PLAYER_HALF_HEIGHT {
    (PLAYER_HALF_HEIGHT, velocity.max(0.0))
  } else {
    (y, velocity)
  }
}

/// Whether the feet are within `offset` of the ground plane.
pub fn is_grounded(y: f32, offset: f32) -> bool {
  y - PLAYER_HALF_HEIGHT <= offset
}

pub fn read_player_input(
  mut players: Query<(&Actions<PlayerInput>, &mut PlayerIntent), With<Player>>,
  move_actions: Query<&Action<Move>>,
  depth_actions: Query<&Action<MoveDepth>>,
  run_actions: Query<&Action<Run>>,
  jump_actions: Query<&Action<Jump>>,
  attack_actions: Query<&Action<Attack>>,
) {
  for (actions, mut intent) in &mut players {
    let mut movement = Vec2::ZERO;
    let mut running = false;
    let mut jump = false;
    let mut attack = false;
    for action_entity in actions.iter() {
      if let Ok(action) = move_actions.get(action_entity) {
        movement.x = **action;
      }
      if let Ok(action) = depth_actions.get(action_entity) {
        movement.y = **action;
      }
      if let Ok(action) = run_actions.get(action_entity) {
        running = **action;
      }
      if let Ok(action) = jump_actions.get(action_entity) {
        jump = **action;
      }
      if let Ok(action) = attack_actions.get(action_entity) {
        attack = **action;
      }
    }

    intent.movement = movement;
    intent.running = running;
    intent.press(jump, attack);
    if intent.is_moving() {
      trace!("Move: {:?}, running={}", movement, running);
    }
  }
}

pub fn sync_ground(
  mut players: Query<(&Transform, &PlayerController, &mut LocomotionState), With<Player>>,
) {
  for (transform, controller, mut state) in &mut players {
    let grounded = is_grounded(transform.translation.y, controller.ground_distance_offset);
    let next = if grounded {
      LocomotionState::Grounded
    } else {
      LocomotionState::Airborne
    };
    state.set_if_neq(next);
  }
}

pub fn handle_attack(
  mut players: Query<(&PlayerIntent, &PlayerController, &mut AttackState), With<Player>>,
  time: Res<Time>,
) {
  for (intent, controller, mut attack) in &mut players {
    if !controller.can_attack {
      continue;
    }
    if attack.tick(
      intent.attack_started,
      controller.attack_cooldown,
      time.delta_secs(),
    ) {
      debug!("Attack started, cooldown {}s", controller.attack_cooldown);
    }
  }
}

pub fn handle_jump(
  mut players: Query<
    (
      &PlayerIntent,
      &PlayerController,
      &mut LocomotionState,
      &mut CharacterVelocity,
    ),
    With<Player>,
  >,
) {
  for (intent, controller, mut state, mut velocity) in &mut players {
    if controller.can_jump && intent.jump_started && *state == LocomotionState::Grounded {
      velocity.0 = controller.jump_velocity;
      *state = LocomotionState::Airborne;
    }
  }
}

pub fn handle_movement(
  mut players: Query<
    (
      &PlayerIntent,
      &PlayerController,
      &AttackState,
      &LocomotionState,
      &mut Transform,
    ),
    With<Player>,
  >,
) {
  for (intent, controller, attack, state, mut transform) in &mut players {
    if !controller.can_move {
      continue;
    }
    *transform = move_step(
      &transform,
      intent.movement,
      controller.speed(intent.running),
      attack.is_attacking(),
      *state == LocomotionState::Grounded,
    );
  }
}

pub fn apply_gravity(
  mut players: Query<
    (&PlayerController, &mut CharacterVelocity, &mut Transform),
    With<Player>,
  >,
  time: Res<Time>,
) {
  for (controller, mut velocity, mut transform) in &mut players {
    let (y, vy) = fall_step(
      transform.translation.y,
      velocity.0,
      controller.gravity,
      time.delta_secs(),
    );
    transform.translation.y = y;
    velocity.0 = vy;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const EPS: f32 = 1e-5;

  #[test]
  fn walk_moves_speed_over_ten_per_step() {
    let start = Transform::from_xyz(1.0, 0.5, 0.0);
    let next = move_step(&start, Vec2::X, 2.0, false, true);
    assert!((next.translation - Vec3::new(1.2, 0.5, 0.0)).length() < EPS);
  }

  #[test]
  fn forward_input_moves_toward_negative_z() {
    let next = move_step(&Transform::IDENTITY, Vec2::Y, 1.0, false, true);
    assert!((next.translation - Vec3::new(0.0, 0.0, -0.1)).length() < EPS);
    // Already facing -Z, so no turn
    assert!(next.rotation.angle_between(Quat::IDENTITY) < EPS);
  }

  #[test]
  fn turn_is_limited_per_step() {
    // Facing -Z, asked to go +Z: a half turn takes many steps
    let next = move_step(&Transform::IDENTITY, -Vec2::Y, 1.0, false, true);
    let turned = next.rotation.angle_between(Quat::IDENTITY);
    assert!((turned - MAX_TURN_PER_STEP).abs() < 1e-4, "{turned}");
  }

  #[test]
  fn small_turn_snaps_to_facing() {
    let facing = Transform::IDENTITY.looking_to(Vec3::X, Vec3::Y).rotation;
    let start = Transform::from_rotation(Quat::from_rotation_y(-85f32.to_radians()));

    let next = move_step(&start, Vec2::X, 1.0, false, true);

    assert!(next.rotation.angle_between(facing) < 1e-4);
  }

  #[test]
  fn attacking_on_ground_blocks_movement_and_turning() {
    let start = Transform::from_xyz(0.0, 0.5, 0.0);
    let next = move_step(&start, Vec2::X, 1.0, true, true);
    assert_eq!(next, start);
  }

  #[test]
  fn attacking_in_air_still_moves() {
    let start = Transform::from_xyz(0.0, 2.0, 0.0);
    let next = move_step(&start, Vec2::X, 1.0, true, false);
    assert!((next.translation.x - 0.1).abs() < EPS);
    assert_eq!(next.rotation, start.rotation);
  }

  #[test]
  fn no_input_is_no_change() {
    let start = Transform::from_xyz(3.0, 0.5, -1.0).with_rotation(Quat::from_rotation_y(1.0));
    assert_eq!(move_step(&start, Vec2::ZERO, 5.0, false, true), start);
  }

  #[test]
  fn fall_step_stops_at_ground() {
    let (y, vy) = fall_step(0.51, -3.0, 10.0, 0.1);
    assert_eq!(y, PLAYER_HALF_HEIGHT);
    assert_eq!(vy, 0.0);

    let (y, vy) = fall_step(5.0, 0.0, 10.0, 0.1);
    assert!((vy + 1.0).abs() < EPS);
    assert!((y - 4.9).abs() < EPS);
  }

  #[test]
  fn grounded_within_offset() {
    assert!(is_grounded(PLAYER_HALF_HEIGHT, 0.05));
    assert!(is_grounded(PLAYER_HALF_HEIGHT + 0.04, 0.05));
    assert!(!is_grounded(PLAYER_HALF_HEIGHT + 0.06, 0.05));
  }

  #[test]
  fn attack_cooldown() {
    let mut attack = AttackState::default();
    assert!(attack.tick(true, 0.2, 0.1));
    assert!(attack.is_attacking());

    // Presses during the cooldown are ignored
    assert!(!attack.tick(true, 0.2, 0.1));
    assert!(!attack.tick(true, 0.2, 0.1));
    assert!(!attack.is_attacking());

    assert!(attack.tick(true, 0.2, 0.1));
  }

  #[test]
  fn intent_press_edges() {
    let mut intent = PlayerIntent::default();
    intent.press(true, false);
    assert!(intent.jump_started);
    intent.press(true, false);
    assert!(!intent.jump_started);
    intent.press(false, true);
    assert!(!intent.jump_started);
    assert!(intent.attack_started);
  }
}
