//! Pixel Filter - retro pixel-art camera filter for Bevy.
//!
//! A camera renders into a low-resolution surface that is upscaled with
//! nearest-neighbor sampling. A per-camera snap grid, derived from the
//! camera frustum and the surface resolution, lets the camera and any
//! subscribed objects sit on whole offscreen pixels while they are drawn.
//!
//! The math and bookkeeping ([`snap`], [`grid`], [`resolution`],
//! [`surface`], [`context`], [`publisher`], [`intercept`]) are independent of
//! the ECS; [`pixel_filter`] and [`snapper`] drive them from Bevy's schedule.
//!
//! [`PixelFilterPlugin`] retargets Bevy cameras and needs nothing else. Hosts
//! that issue the render call themselves use [`render_pixelated`] with their
//! own [`RenderCamera`] and [`NearestBlit`] instead. It holds a [`PassGuard`]
//! across the pass, so the camera is put back however the pass exits.

pub mod context;
pub mod grid;
pub mod intercept;
pub mod pixel_filter;
pub mod publisher;
pub mod resolution;
pub mod snap;
pub mod snapper;
pub mod surface;

pub use context::{PixelSnapContext, SnapContext};
pub use grid::{CameraParams, CameraProjection, derive_snap_grid, frustum_size};
pub use intercept::{NearestBlit, PassGuard, RenderCamera, render_pixelated};
pub use pixel_filter::{
  BLIT_LAYER, PixelFilter, PixelFilterBlitCamera, PixelFilterBlitQuad, PixelFilterPlugin,
  PixelFilterSet, PixelFilterState,
};
pub use publisher::{GridPublisher, PixelFilterSettings};
pub use resolution::{OffscreenResolution, SizeMethod, SurfaceFormat};
pub use snap::{SnapGrid, SnapGuard, SnapState};
pub use snapper::PixelSnapper;
