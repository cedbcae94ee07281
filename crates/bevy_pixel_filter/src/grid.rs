//! Snap grid derivation from the camera frustum.

use bevy::prelude::*;

use crate::snap::SnapGrid;

/// Projection parameters that affect the size of the visible frustum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraProjection {
  /// Vertical field of view in radians.
  Perspective { fov: f32 },
  /// Half of the visible height in world units.
  Orthographic { half_height: f32 },
}

impl CameraProjection {
  /// Reads the frustum-relevant parameters from a Bevy projection.
  ///
  /// Custom projections carry no usable frustum size and return `None`.
  pub fn from_projection(projection: &Projection) -> Option<Self> {
    match projection {
      Projection::Perspective(perspective) => Some(Self::Perspective {
        fov: perspective.fov,
      }),
      Projection::Orthographic(ortho) => Some(Self::Orthographic {
        half_height: ortho.area.height() * 0.5,
      }),
      _ => None,
    }
  }
}

/// Everything the publisher needs to know about its camera for one
/// recompute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
  pub projection: CameraProjection,
  /// Real target resolution in physical pixels.
  pub screen: UVec2,
}

impl CameraParams {
  pub fn aspect(&self) -> f32 {
    self.screen.x.max(1) as f32 / self.screen.y.max(1) as f32
  }
}

/// World-space (width, height) of the frustum.
///
/// For perspective cameras this is measured at `snap_plane` units in front
/// of the camera.
pub fn frustum_size(projection: CameraProjection, aspect: f32, snap_plane: f32) -> Vec2 {
  let height = match projection {
    CameraProjection::Perspective { fov } => 2.0 * snap_plane * (fov * 0.5).tan(),
    CameraProjection::Orthographic { half_height } => half_height * 2.0,
  };
  Vec2::new(height * aspect, height)
}

/// Grid spacing for one offscreen pixel. The z spacing is always zero.
pub fn derive_snap_grid(
  projection: CameraProjection,
  aspect: f32,
  snap_plane: f32,
  resolution: UVec2,
) -> SnapGrid {
  let frustum = frustum_size(projection, aspect, snap_plane);
  SnapGrid::new(
    frustum.x / resolution.x.max(1) as f32,
    frustum.y / resolution.y.max(1) as f32,
    0.0,
  )
}
