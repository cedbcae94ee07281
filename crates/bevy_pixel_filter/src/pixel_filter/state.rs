//! Runtime state for a pixel filter camera.

use bevy::camera::{RenderTarget, Viewport};
use bevy::prelude::*;

use crate::publisher::GridPublisher;
use crate::snap::SnapGrid;

/// Where the camera rendered before the filter redirected it.
#[derive(Clone, Debug)]
pub(crate) struct OriginalOutput {
  pub target: RenderTarget,
  pub viewport: Option<Viewport>,
}

/// Runtime state of a [`PixelFilter`](super::PixelFilter).
#[derive(Component, Default)]
pub struct PixelFilterState {
  pub(crate) publisher: GridPublisher<Handle<Image>>,
  pub(crate) original: Option<OriginalOutput>,
  pub(crate) blit_camera: Option<Entity>,
  pub(crate) blit_quad: Option<Entity>,
}

impl PixelFilterState {
  /// True while the camera renders into the offscreen surface.
  pub fn is_active(&self) -> bool {
    self.original.is_some()
  }

  pub fn snap_grid(&self) -> SnapGrid {
    self.publisher.snap_grid()
  }

  /// Offscreen surface size in pixels.
  pub fn resolution(&self) -> UVec2 {
    self.publisher.resolution()
  }

  pub fn surface(&self) -> Option<&Handle<Image>> {
    self.publisher.surface()
  }

  pub fn blit_camera(&self) -> Option<Entity> {
    self.blit_camera
  }
}
