//! Snap subscribers: renderables aligned to the pixel grid while drawn.

use bevy::prelude::*;

use crate::context::PixelSnapContext;
use crate::pixel_filter::{PixelFilter, PixelFilterState};
use crate::snap::SnapState;

/// Aligns this entity's world position to the snap grid of a pixel filter
/// camera for the frame's render, then puts it back.
///
/// Children are snapped through their parent's transform, after any snapped
/// ancestor, filter cameras included.
#[derive(Component, Clone, Copy, Debug)]
#[require(SnapState)]
pub struct PixelSnapper {
  pub enabled: bool,
  /// Camera whose grid to use. `None` follows the camera the filter pass
  /// last focused.
  pub camera: Option<Entity>,
}

impl Default for PixelSnapper {
  fn default() -> Self {
    Self {
      enabled: true,
      camera: None,
    }
  }
}

impl PixelSnapper {
  pub fn for_camera(camera: Entity) -> Self {
    Self {
      enabled: true,
      camera: Some(camera),
    }
  }
}

/// System: Snaps filter cameras and enabled, visible snappers to their grids.
///
/// Cameras and snappers go through one pass ordered by hierarchy depth, so
/// every entity is snapped after all of its snapped ancestors and keeps its
/// world position on the grid whatever it is parented under.
///
/// Visibility is last frame's `ViewVisibility`; entities without one are
/// treated as visible.
pub fn snap_to_grid(
  mut context: ResMut<PixelSnapContext>,
  cameras: Query<(Entity, &PixelFilter, &PixelFilterState)>,
  snappers: Query<(Entity, &PixelSnapper, Option<&ViewVisibility>), Without<PixelFilter>>,
  mut states: Query<&mut SnapState>,
  mut transforms: Query<&mut Transform>,
  parents: Query<&ChildOf>,
) {
  let mut pending = Vec::new();

  for (entity, filter, state) in &cameras {
    if !filter.enabled || !filter.settings.use_snapping || !state.is_active() {
      continue;
    }
    pending.push((hierarchy_depth(entity, &parents), entity, state.snap_grid()));
  }

  let focused = context.0.focused();
  for (entity, snapper, visibility) in &snappers {
    if !snapper.enabled || visibility.is_some_and(|visibility| !visibility.get()) {
      continue;
    }
    let Some(camera) = snapper.camera.or(focused) else {
      continue;
    };
    pending.push((hierarchy_depth(entity, &parents), entity, context.0.snap_grid(camera)));
  }

  pending.retain(|(_, _, grid)| !grid.is_disabled());
  pending.sort_by_key(|(depth, ..)| *depth);
  for (_, entity, grid) in pending {
    let parent = parent_world(entity, &transforms, &parents);
    let (Ok(mut snap), Ok(mut transform)) = (states.get_mut(entity), transforms.get_mut(entity))
    else {
      continue;
    };
    snap.apply_in(&mut transform.translation, grid, parent.as_ref());
  }
}

/// Number of ancestors above `entity`.
fn hierarchy_depth(entity: Entity, parents: &Query<&ChildOf>) -> usize {
  let mut depth = 0;
  let mut current = entity;
  while let Ok(child_of) = parents.get(current) {
    depth += 1;
    current = child_of.parent();
  }
  depth
}

/// World transform of `entity`'s parent, built from the current local
/// transforms. `None` for root entities.
///
/// Snapping runs before propagation, so `GlobalTransform` still holds last
/// frame's values and cannot be used here.
fn parent_world(
  entity: Entity,
  transforms: &Query<&mut Transform>,
  parents: &Query<&ChildOf>,
) -> Option<GlobalTransform> {
  let mut current = parents.get(entity).ok()?.parent();
  let mut world = GlobalTransform::IDENTITY;
  loop {
    if let Ok(local) = transforms.get(current) {
      world = GlobalTransform::from(*local) * world;
    }
    match parents.get(current) {
      Ok(child_of) => current = child_of.parent(),
      Err(_) => return Some(world),
    }
  }
}
