use bevy::prelude::*;
use bevy_pixel_filter::PixelFilter;

use crate::config::{CameraConfig, ConfigLoaded};

/// Marker component for the game camera
#[derive(Component)]
pub struct GameCamera;

/// Marker component for entities the camera should follow
#[derive(Component)]
pub struct CameraTarget;

/// Keeps the camera behind and above its target, looking at it.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct FollowCamera {
  pub distance: f32,
  pub height: f32,
}

impl From<&CameraConfig> for FollowCamera {
  fn from(config: &CameraConfig) -> Self {
    Self {
      distance: config.distance,
      height: config.height,
    }
  }
}

impl FollowCamera {
  /// Camera transform for a target at `target`.
  ///
  /// The camera sits `height` above and `distance` behind the target along
  /// +Z, so it looks down -Z like an unrotated camera.
  pub fn goal(&self, target: Vec3) -> Transform {
    let position = target + Vec3::new(0.0, self.height, self.distance);
    Transform::from_translation(position).looking_at(target, Vec3::Y)
  }
}

pub fn setup_camera(mut commands: Commands, config: Res<ConfigLoaded>) {
  let follow = FollowCamera::from(&config.camera);
  commands.spawn((
    GameCamera,
    Camera3d::default(),
    Camera {
      order: 0,
      clear_color: ClearColorConfig::Custom(Color::srgb(0.35, 0.55, 0.8)),
      ..default()
    },
    Projection::Perspective(PerspectiveProjection {
      fov: config.camera.fov_degrees.to_radians(),
      ..default()
    }),
    follow.goal(Vec3::ZERO),
    follow,
    config.pixel_filter.clone(),
  ));
}

/// Moves follow cameras to their goal behind the camera target.
///
/// Reads the target's unsnapped translation, so it must run before the pixel
/// filter snaps anything.
pub fn camera_follow(
  targets: Query<&Transform, (With<CameraTarget>, Without<FollowCamera>)>,
  mut cameras: Query<(&FollowCamera, &mut Transform)>,
) {
  let Ok(target) = targets.single() else {
    return;
  };
  for (follow, mut transform) in &mut cameras {
    *transform = follow.goal(target.translation);
  }
}
