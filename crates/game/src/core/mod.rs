pub(crate) mod camera;

use bevy::prelude::*;
use bevy_pixel_filter::{PixelFilterPlugin, PixelFilterSet};

pub struct CorePlugin;

impl Plugin for CorePlugin {
  fn build(&self, app: &mut App) {
    app
      .add_plugins(PixelFilterPlugin)
      .add_systems(Startup, camera::setup_camera)
      .add_systems(
        PostUpdate,
        camera::camera_follow.before(PixelFilterSet::Recalculate),
      );
  }
}
