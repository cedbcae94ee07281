//! Render-pass bracket for hosts that render a camera on demand.
//!
//! The ECS plugin keeps the offscreen target on the camera permanently and
//! blits with a second camera. Hosts that drive the render call themselves
//! use [`render_pixelated`] instead.

use std::ops::{Deref, DerefMut};

use bevy::prelude::*;

use crate::snap::SnapGrid;

/// The parts of a camera the pixel pass touches.
pub trait RenderCamera {
  type Target: Clone;

  fn position(&self) -> Vec3;
  fn set_position(&mut self, position: Vec3);

  fn target(&self) -> Self::Target;
  fn set_target(&mut self, target: Self::Target);

  /// Physical viewport rectangle, `None` for the whole target.
  fn viewport(&self) -> Option<URect>;
  fn set_viewport(&mut self, viewport: Option<URect>);
}

/// Camera redirected to an offscreen target for the duration of the guard.
///
/// Dropping the guard restores position, target and viewport.
pub struct PassGuard<'a, C: RenderCamera> {
  camera: &'a mut C,
  position: Vec3,
  target: C::Target,
  viewport: Option<URect>,
}

impl<'a, C: RenderCamera> PassGuard<'a, C> {
  pub fn begin(camera: &'a mut C, offscreen: C::Target, grid: SnapGrid) -> Self {
    let target = camera.target();
    camera.set_target(offscreen);

    let position = camera.position();
    camera.set_position(grid.snap(position));

    // The real viewport is applied by the blit, not by the offscreen pass
    let viewport = camera.viewport();
    camera.set_viewport(None);

    Self {
      camera,
      position,
      target,
      viewport,
    }
  }
}

impl<C: RenderCamera> Deref for PassGuard<'_, C> {
  type Target = C;

  fn deref(&self) -> &C {
    self.camera
  }
}

impl<C: RenderCamera> DerefMut for PassGuard<'_, C> {
  fn deref_mut(&mut self) -> &mut C {
    self.camera
  }
}

impl<C: RenderCamera> Drop for PassGuard<'_, C> {
  fn drop(&mut self) {
    self.camera.set_target(self.target.clone());
    self.camera.set_viewport(self.viewport);
    self.camera.set_position(self.position);
  }
}

/// Copies the offscreen surface onto the real target with point sampling.
pub trait NearestBlit<T> {
  fn blit_nearest(&mut self, source: &T, destination: &T, viewport: Option<URect>);
}

/// Renders `camera` into `offscreen` at the snapped position, restores the
/// camera and blits the result onto the camera's real target.
pub fn render_pixelated<C, B, R>(
  camera: &mut C,
  offscreen: C::Target,
  grid: SnapGrid,
  blitter: &mut B,
  render: R,
) where
  C: RenderCamera,
  B: NearestBlit<C::Target>,
  R: FnOnce(&mut C),
{
  {
    let mut pass = PassGuard::begin(camera, offscreen.clone(), grid);
    render(&mut *pass);
  }
  blitter.blit_nearest(&offscreen, &camera.target(), camera.viewport());
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Clone, Debug, PartialEq)]
  enum Target {
    Screen,
    Offscreen,
  }

  struct TestCamera {
    position: Vec3,
    target: Target,
    viewport: Option<URect>,
  }

  impl RenderCamera for TestCamera {
    type Target = Target;

    fn position(&self) -> Vec3 {
      self.position
    }
    fn set_position(&mut self, position: Vec3) {
      self.position = position;
    }
    fn target(&self) -> Target {
      self.target.clone()
    }
    fn set_target(&mut self, target: Target) {
      self.target = target;
    }
    fn viewport(&self) -> Option<URect> {
      self.viewport
    }
    fn set_viewport(&mut self, viewport: Option<URect>) {
      self.viewport = viewport;
    }
  }

  #[derive(Default)]
  struct RecordingBlit {
    calls: Vec<(Target, Target, Option<URect>)>,
  }

  impl NearestBlit<Target> for RecordingBlit {
    fn blit_nearest(&mut self, source: &Target, destination: &Target, viewport: Option<URect>) {
      self
        .calls
        .push((source.clone(), destination.clone(), viewport));
    }
  }

  fn camera() -> TestCamera {
    TestCamera {
      position: Vec3::new(1.3, 2.2, -4.0),
      target: Target::Screen,
      viewport: Some(URect::new(10, 10, 650, 490)),
    }
  }

  #[test]
  fn render_sees_snapped_offscreen_camera() {
    let mut camera = camera();
    let mut blit = RecordingBlit::default();
    let mut seen = None;

    render_pixelated(
      &mut camera,
      Target::Offscreen,
      SnapGrid::new(0.25, 0.5, 0.0),
      &mut blit,
      |cam| seen = Some((cam.position, cam.target.clone(), cam.viewport)),
    );

    let (position, target, viewport) = seen.unwrap();
    assert!((position - Vec3::new(1.375, 2.25, -4.0)).abs().max_element() < 1e-4);
    assert_eq!(target, Target::Offscreen);
    assert_eq!(viewport, None);
  }

  #[test]
  fn camera_restored_before_blit() {
    let mut camera = camera();
    let mut blit = RecordingBlit::default();

    render_pixelated(
      &mut camera,
      Target::Offscreen,
      SnapGrid::new(0.25, 0.5, 0.0),
      &mut blit,
      |_| {},
    );

    assert_eq!(camera.position, Vec3::new(1.3, 2.2, -4.0));
    assert_eq!(camera.target, Target::Screen);
    assert_eq!(camera.viewport, Some(URect::new(10, 10, 650, 490)));
    assert_eq!(
      blit.calls,
      vec![(
        Target::Offscreen,
        Target::Screen,
        Some(URect::new(10, 10, 650, 490))
      )]
    );
  }

  #[test]
  fn guard_restores_when_pass_unwinds() {
    let mut camera = camera();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
      let _pass = PassGuard::begin(&mut camera, Target::Offscreen, SnapGrid::new(1.0, 1.0, 0.0));
      panic!("render failed");
    }));
    assert!(result.is_err());
    assert_eq!(camera.position, Vec3::new(1.3, 2.2, -4.0));
    assert_eq!(camera.target, Target::Screen);
  }
}
