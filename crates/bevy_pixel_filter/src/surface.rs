//! Offscreen surface allocation and caching.

use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{
  Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
};

use crate::resolution::{OffscreenResolution, SurfaceFormat};

/// Something that can create and destroy point-filtered render surfaces.
pub trait SurfaceBackend {
  type Surface;

  /// Capability query for a color format.
  fn supports_format(&self, format: SurfaceFormat) -> bool;

  /// Creates a surface of `size` pixels with nearest-neighbor sampling.
  fn allocate(&mut self, size: UVec2, format: SurfaceFormat) -> Self::Surface;

  fn release(&mut self, surface: Self::Surface);
}

struct HeldSurface<S> {
  resolution: OffscreenResolution,
  surface: S,
}

/// Holds at most one surface and only reallocates when its size or format
/// actually changes.
pub struct SurfaceCache<S> {
  held: Option<HeldSurface<S>>,
}

impl<S> Default for SurfaceCache<S> {
  fn default() -> Self {
    Self { held: None }
  }
}

impl<S> SurfaceCache<S> {
  /// Makes sure a surface matching `resolution` is held.
  ///
  /// Returns true if a new surface was allocated.
  pub fn ensure<B>(&mut self, resolution: OffscreenResolution, backend: &mut B) -> bool
  where
    B: SurfaceBackend<Surface = S>,
  {
    if self
      .held
      .as_ref()
      .is_some_and(|held| held.resolution == resolution)
    {
      return false;
    }

    self.release(backend);
    let surface = backend.allocate(resolution.size, resolution.format);
    self.held = Some(HeldSurface {
      resolution,
      surface,
    });
    true
  }

  /// Releases the held surface, if any.
  pub fn release<B>(&mut self, backend: &mut B)
  where
    B: SurfaceBackend<Surface = S>,
  {
    if let Some(held) = self.held.take() {
      backend.release(held.surface);
    }
  }

  pub fn surface(&self) -> Option<&S> {
    self.held.as_ref().map(|held| &held.surface)
  }

  pub fn resolution(&self) -> Option<OffscreenResolution> {
    self.held.as_ref().map(|held| held.resolution)
  }
}

/// Surfaces backed by Bevy `Image` assets.
pub struct ImageSurfaces<'a> {
  pub images: &'a mut Assets<Image>,
}

impl<'a> ImageSurfaces<'a> {
  pub fn new(images: &'a mut Assets<Image>) -> Self {
    Self { images }
  }

  /// wgpu has no packed 16-bit color target, so only the default format has
  /// a mapping.
  fn texture_format(format: SurfaceFormat) -> Option<TextureFormat> {
    match format {
      SurfaceFormat::Default => Some(TextureFormat::Rgba8UnormSrgb),
      SurfaceFormat::Rgb565 => None,
    }
  }
}

impl SurfaceBackend for ImageSurfaces<'_> {
  type Surface = Handle<Image>;

  fn supports_format(&self, format: SurfaceFormat) -> bool {
    Self::texture_format(format).is_some()
  }

  fn allocate(&mut self, size: UVec2, format: SurfaceFormat) -> Handle<Image> {
    let size = Extent3d {
      width: size.x,
      height: size.y,
      depth_or_array_layers: 1,
    };

    let mut image = Image {
      texture_descriptor: TextureDescriptor {
        label: Some("pixel_filter_surface"),
        size,
        dimension: TextureDimension::D2,
        format: Self::texture_format(format).unwrap_or(TextureFormat::Rgba8UnormSrgb),
        mip_level_count: 1,
        sample_count: 1,
        usage: TextureUsages::TEXTURE_BINDING
          | TextureUsages::COPY_DST
          | TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
      },
      // Point sampling is what makes the upscale blocky
      sampler: ImageSampler::nearest(),
      ..default()
    };
    image.resize(size);

    info!(
      "Pixel filter surface: {}x{} ({:?})",
      size.width, size.height, format
    );
    self.images.add(image)
  }

  fn release(&mut self, surface: Handle<Image>) {
    self.images.remove(surface.id());
  }
}
