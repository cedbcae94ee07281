//! Systems for recalculating, snapping and restoring.

use bevy::camera::RenderTarget;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::components::{PixelFilter, PixelFilterBlitQuad};
use super::state::PixelFilterState;
use crate::context::PixelSnapContext;
use crate::grid::{CameraParams, CameraProjection};
use crate::publisher::PixelFilterSettings;
use crate::snap::SnapState;
use crate::surface::ImageSurfaces;

/// System: Recomputes surface size and snap grid when the filter settings,
/// the projection or the real target size change.
///
/// A reallocated surface is wired into the camera target and the blit quad.
/// The resulting grid is published for the camera.
pub fn recalculate_filters(
  mut context: ResMut<PixelSnapContext>,
  mut images: ResMut<Assets<Image>>,
  windows: Query<&Window, With<PrimaryWindow>>,
  mut filters: Query<(
    Entity,
    Ref<PixelFilter>,
    &mut PixelFilterState,
    &mut Camera,
    Ref<Projection>,
  )>,
  mut blit_quads: Query<(&PixelFilterBlitQuad, &mut Sprite)>,
) {
  let window_size = windows
    .single()
    .ok()
    .map(|window| UVec2::new(window.physical_width(), window.physical_height()));

  for (entity, filter, mut state, mut camera, projection) in &mut filters {
    if !filter.enabled || !state.is_active() {
      continue;
    }

    // The real target is the viewport the camera had before the filter
    // took over, or the whole window
    let screen = state
      .original
      .as_ref()
      .and_then(|original| original.viewport.as_ref())
      .map(|viewport| viewport.physical_size)
      .or(window_size);
    let Some(screen) = screen.filter(|size| size.x > 0 && size.y > 0) else {
      continue;
    };

    let Some(camera_projection) = CameraProjection::from_projection(&projection) else {
      trace!("Pixel filter on {entity}: projection has no frustum size");
      continue;
    };

    let publisher = &mut state.publisher;
    let settings_changed = filter.is_changed() && filter.settings != *publisher.settings();
    let stale = projection.is_changed()
      || publisher.needs_recalculate(screen)
      || publisher.surface().is_none();

    if settings_changed && !stale && only_snap_plane_differs(&filter.settings, publisher.settings())
    {
      publisher.set_snap_plane(filter.settings.snap_plane);
    } else if settings_changed || stale {
      publisher.set_settings(filter.settings.clone());
      let params = CameraParams {
        projection: camera_projection,
        screen,
      };
      let reallocated = publisher.recalculate(params, &mut ImageSurfaces::new(&mut images));

      if reallocated {
        if let Some(surface) = publisher.surface().cloned() {
          camera.target = RenderTarget::Image(surface.clone().into());
          for (quad, mut sprite) in &mut blit_quads {
            if quad.source == entity {
              sprite.image = surface.clone();
            }
          }
        }
      }
    } else {
      continue;
    }

    context.0.publish(entity, state.snap_grid());
    if camera.is_active {
      context.0.focus(entity);
    }
  }
}

fn only_snap_plane_differs(wanted: &PixelFilterSettings, current: &PixelFilterSettings) -> bool {
  let mut candidate = wanted.clone();
  candidate.snap_plane = current.snap_plane;
  candidate == *current
}

/// System: Puts every snapped translation back.
///
/// Runs for all entities with a pending snap, whether or not their snapper
/// or filter is still enabled, visible or present.
///
/// Only translations that are actually written back are marked changed.
pub fn restore_snapped(mut snapped: Query<(&mut Transform, &mut SnapState)>) {
  for (mut transform, mut snap) in &mut snapped {
    if !snap.is_pending() {
      continue;
    }
    if snap.restore(&mut transform.bypass_change_detection().translation) {
      transform.set_changed();
    }
  }
}

#[cfg(test)]
mod tests {
  use bevy::ecs::system::RunSystemOnce;

  use super::*;
  use crate::snap::SnapGrid;

  fn spawn_snapped(world: &mut World, moved_to: Option<Vec3>) -> Entity {
    let mut translation = Vec3::new(1.3, 0.0, 0.0);
    let mut snap = SnapState::default();
    snap.apply(&mut translation, SnapGrid::new(0.25, 0.25, 0.0));
    let translation = moved_to.unwrap_or(translation);
    world.spawn((Transform::from_translation(translation), snap)).id()
  }

  #[test]
  fn restore_only_marks_written_transforms_changed() {
    let mut world = World::new();
    let restored = spawn_snapped(&mut world, None);
    let moved = spawn_snapped(&mut world, Some(Vec3::new(5.0, 5.0, 0.0)));
    let idle = world.spawn((Transform::default(), SnapState::default())).id();

    let last_changed = |world: &World, entity: Entity| {
      world
        .entity(entity)
        .get_ref::<Transform>()
        .unwrap()
        .last_changed()
    };
    let before = [restored, moved, idle].map(|entity| last_changed(&world, entity));

    world.run_system_once(restore_snapped).unwrap();

    assert_ne!(last_changed(&world, restored), before[0]);
    assert_eq!(last_changed(&world, moved), before[1]);
    assert_eq!(last_changed(&world, idle), before[2]);

    let translation = |entity: Entity| world.get::<Transform>(entity).unwrap().translation;
    assert_eq!(translation(restored), Vec3::new(1.3, 0.0, 0.0));
    assert_eq!(translation(moved), Vec3::new(5.0, 5.0, 0.0));
  }
}
