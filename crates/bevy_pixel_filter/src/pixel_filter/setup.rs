//! Activation and teardown of pixel filter cameras.

use bevy::camera::ScalingMode;
use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;

use super::components::{PixelFilter, PixelFilterBlitCamera, PixelFilterBlitQuad};
use super::state::{OriginalOutput, PixelFilterState};
use crate::context::PixelSnapContext;
use crate::surface::ImageSurfaces;

/// Layer reserved for the blit quad and blit camera.
pub const BLIT_LAYER: usize = 31;

/// System: Redirects newly enabled filter cameras.
///
/// Saves the camera's target and viewport, then spawns:
/// - a blit camera on the original target/viewport (layer `BLIT_LAYER`)
/// - a 2x2 blit quad showing the offscreen surface
///
/// The offscreen image itself is allocated by the recalculation pass.
pub fn activate_filters(
  mut commands: Commands,
  mut filters: Query<(Entity, &PixelFilter, &mut PixelFilterState, &mut Camera)>,
) {
  for (entity, filter, mut state, mut camera) in &mut filters {
    if !filter.enabled || state.is_active() {
      continue;
    }

    let original = OriginalOutput {
      target: camera.target.clone(),
      viewport: camera.viewport.clone(),
    };
    // The offscreen pass always covers the whole surface
    camera.viewport = None;

    // Projection must be set in the same spawn so Camera2d's required
    // components don't override it
    let blit_camera = commands
      .spawn((
        Name::new("PixelFilterBlitCamera"),
        PixelFilterBlitCamera { source: entity },
        Camera2d,
        Camera {
          order: camera.order + 1,
          target: original.target.clone(),
          viewport: original.viewport.clone(),
          ..default()
        },
        Projection::Orthographic(OrthographicProjection {
          near: -1.0,
          far: 1.0,
          scale: 1.0,
          viewport_origin: Vec2::new(0.5, 0.5),
          scaling_mode: ScalingMode::Fixed {
            width: 2.0,
            height: 2.0,
          },
          area: Rect::default(),
        }),
        RenderLayers::layer(BLIT_LAYER),
      ))
      .id();

    let blit_quad = commands
      .spawn((
        Name::new("PixelFilterBlitQuad"),
        PixelFilterBlitQuad { source: entity },
        Sprite {
          custom_size: Some(Vec2::splat(2.0)),
          ..default()
        },
        Transform::default(),
        Visibility::default(),
        RenderLayers::layer(BLIT_LAYER),
      ))
      .id();

    info!("Pixel filter enabled on {entity}");

    state.original = Some(original);
    state.blit_camera = Some(blit_camera);
    state.blit_quad = Some(blit_quad);
  }
}

/// System: Restores cameras whose filter was disabled or removed.
///
/// Puts the original target and viewport back, despawns the blit entities,
/// releases the surface and withdraws the camera's grid.
pub fn deactivate_filters(
  mut commands: Commands,
  mut context: ResMut<PixelSnapContext>,
  mut images: ResMut<Assets<Image>>,
  mut removed: RemovedComponents<PixelFilter>,
  mut states: Query<(Entity, Option<&PixelFilter>, &mut PixelFilterState, &mut Camera)>,
) {
  for entity in removed.read() {
    context.0.withdraw(entity);
  }

  for (entity, filter, mut state, mut camera) in &mut states {
    if filter.is_some_and(|filter| filter.enabled) || !state.is_active() {
      continue;
    }

    if let Some(original) = state.original.take() {
      camera.target = original.target;
      camera.viewport = original.viewport;
    }
    for blit in [state.blit_camera.take(), state.blit_quad.take()]
      .into_iter()
      .flatten()
    {
      commands.entity(blit).try_despawn();
    }
    state.publisher.release(&mut ImageSurfaces::new(&mut images));
    context.0.withdraw(entity);

    info!("Pixel filter disabled on {entity}");
  }
}

/// System: Despawns blit entities whose filter camera no longer exists.
pub fn despawn_orphaned_blits(
  mut commands: Commands,
  filters: Query<(), With<PixelFilterState>>,
  blit_cameras: Query<(Entity, &PixelFilterBlitCamera)>,
  blit_quads: Query<(Entity, &PixelFilterBlitQuad)>,
) {
  let orphaned_cameras = blit_cameras
    .iter()
    .filter(|(_, blit)| !filters.contains(blit.source))
    .map(|(entity, _)| entity);
  let orphaned_quads = blit_quads
    .iter()
    .filter(|(_, blit)| !filters.contains(blit.source))
    .map(|(entity, _)| entity);

  for entity in orphaned_cameras.chain(orphaned_quads) {
    commands.entity(entity).despawn();
  }
}
