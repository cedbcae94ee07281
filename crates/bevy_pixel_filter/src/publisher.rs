//! Grid publisher: owns the offscreen surface and the snap grid of one
//! camera.

use bevy::prelude::*;
use serde::Deserialize;

use crate::grid::{CameraParams, derive_snap_grid};
use crate::resolution::{OffscreenResolution, SizeMethod, SurfaceFormat, choose_format};
use crate::snap::SnapGrid;
use crate::surface::{SurfaceBackend, SurfaceCache};

/// User-facing settings of a pixel filter.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PixelFilterSettings {
  /// How the offscreen pixel count is derived from the real target.
  pub size_method: SizeMethod,

  /// Render into a 16-bit color surface when the backend supports one.
  pub reduced_color: bool,

  /// Snap the camera and subscribers to the offscreen pixel grid.
  /// Reduces shimmering when things move by sub-pixel amounts.
  pub use_snapping: bool,

  /// Perspective cameras only: distance from the camera to the plane the
  /// grid is measured on. Should match the distance to the main content.
  pub snap_plane: f32,
}

impl Default for PixelFilterSettings {
  fn default() -> Self {
    Self {
      size_method: SizeMethod::default(),
      reduced_color: false,
      use_snapping: false,
      snap_plane: 5.0,
    }
  }
}

/// Derives and holds the offscreen resolution, surface and snap grid for a
/// camera.
pub struct GridPublisher<S> {
  settings: PixelFilterSettings,
  params: Option<CameraParams>,
  resolution: OffscreenResolution,
  grid: SnapGrid,
  surface: SurfaceCache<S>,
}

impl<S> Default for GridPublisher<S> {
  fn default() -> Self {
    Self::new(PixelFilterSettings::default())
  }
}

impl<S> GridPublisher<S> {
  pub fn new(settings: PixelFilterSettings) -> Self {
    Self {
      settings,
      params: None,
      resolution: OffscreenResolution::default(),
      grid: SnapGrid::ZERO,
      surface: SurfaceCache::default(),
    }
  }

  pub fn settings(&self) -> &PixelFilterSettings {
    &self.settings
  }

  /// Replaces the settings. Takes effect on the next
  /// [`recalculate`](Self::recalculate).
  pub fn set_settings(&mut self, settings: PixelFilterSettings) {
    self.settings = settings;
  }

  /// True when the real target size differs from the one used by the last
  /// recompute, or nothing has been computed yet.
  pub fn needs_recalculate(&self, screen: UVec2) -> bool {
    self.params.is_none_or(|params| params.screen != screen)
  }

  /// Recomputes format, resolution, surface and grid for `params`.
  ///
  /// Returns true if the surface was (re)allocated.
  pub fn recalculate<B>(&mut self, params: CameraParams, backend: &mut B) -> bool
  where
    B: SurfaceBackend<Surface = S>,
  {
    let format = choose_format(self.settings.reduced_color, |format| {
      backend.supports_format(format)
    });
    self.resolution = OffscreenResolution {
      size: self.settings.size_method.resolve(params.screen),
      format,
    };
    self.params = Some(params);

    let reallocated = self.surface.ensure(self.resolution, backend);
    self.grid = self.derive_grid();

    debug!(
      "Pixel filter recalculated: screen={} surface={} grid={:?}",
      params.screen, self.resolution.size, self.grid.0
    );
    reallocated
  }

  /// Changes the snap plane distance and re-derives the grid if the value
  /// actually changed. Returns whether it changed.
  pub fn set_snap_plane(&mut self, snap_plane: f32) -> bool {
    if self.settings.snap_plane == snap_plane {
      return false;
    }
    self.settings.snap_plane = snap_plane;
    self.grid = self.derive_grid();
    true
  }

  /// Releases the surface. The grid drops to zero until the next recompute.
  pub fn release<B>(&mut self, backend: &mut B)
  where
    B: SurfaceBackend<Surface = S>,
  {
    self.surface.release(backend);
    self.params = None;
    self.grid = SnapGrid::ZERO;
  }

  pub fn snap_grid(&self) -> SnapGrid {
    self.grid
  }

  pub fn resolution(&self) -> UVec2 {
    self.resolution.size
  }

  pub fn format(&self) -> SurfaceFormat {
    self.resolution.format
  }

  pub fn surface(&self) -> Option<&S> {
    self.surface.surface()
  }

  fn derive_grid(&self) -> SnapGrid {
    let Some(params) = self.params else {
      return SnapGrid::ZERO;
    };
    if !self.settings.use_snapping {
      return SnapGrid::ZERO;
    }
    derive_snap_grid(
      params.projection,
      params.aspect(),
      self.settings.snap_plane,
      self.resolution.size,
    )
  }
}
