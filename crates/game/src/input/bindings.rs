use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

use super::actions::{Attack, Jump, Move, MoveDepth, PlayerInput, Run};

pub fn player_input_actions() -> impl Bundle {
  actions!(PlayerInput[
      (
          Action::<Move>::new(),
          Bindings::spawn((
              Bidirectional::ad_keys(),
              Bidirectional::left_right_arrow(),
          )),
      ),
      (
          Action::<MoveDepth>::new(),
          Bindings::spawn((
              Bidirectional::ws_keys(),
              Bidirectional::up_down_arrow(),
          )),
      ),
      (
          Action::<Run>::new(),
          bindings![KeyCode::ShiftLeft, KeyCode::ShiftRight],
      ),
      (
          Action::<Jump>::new(),
          bindings![KeyCode::Space],
      ),
      (
          Action::<Attack>::new(),
          bindings![KeyCode::KeyJ, MouseButton::Left],
      ),
  ])
}
