use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

#[derive(Component)]
pub struct PlayerInput;

/// Left/right axis.
#[derive(Debug, InputAction)]
#[action_output(f32)]
pub struct Move;

/// Forward/back axis, positive is forward.
#[derive(Debug, InputAction)]
#[action_output(f32)]
pub struct MoveDepth;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Run;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Jump;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Attack;
