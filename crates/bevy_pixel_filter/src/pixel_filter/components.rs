//! Components for the pixel filter camera.

use bevy::prelude::*;
use serde::Deserialize;

use super::state::PixelFilterState;
use crate::publisher::PixelFilterSettings;
use crate::snap::SnapState;

/// Renders the camera through a low-resolution offscreen surface and
/// publishes its snap grid.
#[derive(Component, Clone, Debug, PartialEq, Deserialize)]
#[require(PixelFilterState, SnapState)]
#[serde(default)]
pub struct PixelFilter {
  /// Disabling releases the surface and puts the camera back on its
  /// original target.
  pub enabled: bool,
  #[serde(flatten)]
  pub settings: PixelFilterSettings,
}

impl Default for PixelFilter {
  fn default() -> Self {
    Self::new(PixelFilterSettings::default())
  }
}

impl PixelFilter {
  pub fn new(settings: PixelFilterSettings) -> Self {
    Self {
      enabled: true,
      settings,
    }
  }

  /// Sets the perspective snap plane distance. The grid is re-derived on
  /// the next recalculation pass.
  pub fn set_snap_plane(&mut self, snap_plane: f32) {
    self.settings.snap_plane = snap_plane;
  }
}

/// Camera that draws the offscreen surface of `source` to its real target.
#[derive(Component, Clone, Copy, Debug)]
pub struct PixelFilterBlitCamera {
  pub source: Entity,
}

/// Full-screen quad showing the offscreen surface of `source`.
#[derive(Component, Clone, Copy, Debug)]
pub struct PixelFilterBlitQuad {
  pub source: Entity,
}
