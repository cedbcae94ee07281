//! Offscreen surface sizing.

use bevy::prelude::*;
use serde::Deserialize;

/// Smallest width or height the offscreen surface is allowed to have.
pub const MIN_SURFACE_EXTENT: u32 = 2;

/// How the low-resolution surface size is derived from the real target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeMethod {
  /// Each offscreen pixel covers N×N real pixels.
  PixelSize(u32),
  /// Fixed vertical pixel count, width follows the aspect ratio.
  VerticalPixels(u32),
  /// Fixed horizontal pixel count, height follows the aspect ratio.
  HorizontalPixels(u32),
}

impl Default for SizeMethod {
  fn default() -> Self {
    Self::VerticalPixels(240)
  }
}

impl SizeMethod {
  /// Low-resolution size for a real target of `screen` pixels.
  ///
  /// Both extents are clamped to [`MIN_SURFACE_EXTENT`].
  pub fn resolve(self, screen: UVec2) -> UVec2 {
    let (width, height) = match self {
      Self::PixelSize(n) => {
        let n = n.max(1);
        (screen.x / n, screen.y / n)
      }
      Self::VerticalPixels(n) => {
        let pixel_size = screen.y as f32 / n.max(1) as f32;
        (Self::floor_div(screen.x, pixel_size), n)
      }
      Self::HorizontalPixels(n) => {
        let pixel_size = screen.x as f32 / n.max(1) as f32;
        (n, Self::floor_div(screen.y, pixel_size))
      }
    };
    UVec2::new(width, height).max(UVec2::splat(MIN_SURFACE_EXTENT))
  }

  fn floor_div(extent: u32, pixel_size: f32) -> u32 {
    if pixel_size <= 0.0 {
      return 0;
    }
    (extent as f32 / pixel_size) as u32
  }
}

/// Color format of the offscreen surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SurfaceFormat {
  /// Full precision color.
  #[default]
  Default,
  /// 16-bit packed color, fewer distinct colors.
  Rgb565,
}

/// Picks the surface format, falling back to [`SurfaceFormat::Default`] when
/// the reduced format is unsupported.
pub fn choose_format(
  reduced_color: bool,
  supports: impl Fn(SurfaceFormat) -> bool,
) -> SurfaceFormat {
  if !reduced_color {
    return SurfaceFormat::Default;
  }
  if supports(SurfaceFormat::Rgb565) {
    SurfaceFormat::Rgb565
  } else {
    debug!("No support for surface format Rgb565, using default instead");
    SurfaceFormat::Default
  }
}

/// Size and format of the offscreen surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OffscreenResolution {
  pub size: UVec2,
  pub format: SurfaceFormat,
}
