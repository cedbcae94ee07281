//! Pixel-grid snapping.
//!
//! Positions are snapped to the midpoint of the grid cell they fall in, not
//! to grid lines. The remainder follows Rust's float `%` (same sign as the
//! dividend), so negative coordinates snap towards zero first and then by
//! half a cell.

use std::ops::Deref;

use bevy::prelude::*;

/// World-space spacing of the pixel grid, one value per axis.
///
/// A zero component disables snapping on that axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SnapGrid(pub Vec3);

impl SnapGrid {
  /// Grid that leaves every axis untouched.
  pub const ZERO: Self = Self(Vec3::ZERO);

  pub fn new(x: f32, y: f32, z: f32) -> Self {
    Self(Vec3::new(x, y, z))
  }

  /// Returns true if no axis is snapped.
  pub fn is_disabled(&self) -> bool {
    self.0 == Vec3::ZERO
  }

  /// Snaps `position` to this grid.
  ///
  /// x and y land on cell midpoints. z uses the plain remainder; the grid
  /// derivation never produces a z spacing, so that branch is inert in
  /// practice.
  pub fn snap(&self, position: Vec3) -> Vec3 {
    let g = self.0;
    let mut offset = Vec3::ZERO;
    if g.x != 0.0 {
      offset.x = (position.x % g.x) - g.x / 2.0;
    }
    if g.y != 0.0 {
      offset.y = (position.y % g.y) - g.y / 2.0;
    }
    if g.z != 0.0 {
      offset.z = position.z % g.z;
    }
    position - offset
  }
}

impl From<Vec3> for SnapGrid {
  fn from(spacing: Vec3) -> Self {
    Self(spacing)
  }
}

/// Scoped snap of a position.
///
/// Holds the original value and writes it back on drop, so every exit path
/// out of the scope (early return, `?`, unwinding) restores the position.
pub struct SnapGuard<'a> {
  position: &'a mut Vec3,
  original: Vec3,
}

impl<'a> SnapGuard<'a> {
  pub fn acquire(position: &'a mut Vec3, grid: SnapGrid) -> Self {
    let original = *position;
    *position = grid.snap(original);
    Self { position, original }
  }

  /// Position before the snap was applied.
  pub fn original(&self) -> Vec3 {
    self.original
  }
}

impl Deref for SnapGuard<'_> {
  type Target = Vec3;

  fn deref(&self) -> &Vec3 {
    self.position
  }
}

impl Drop for SnapGuard<'_> {
  fn drop(&mut self) {
    *self.position = self.original;
  }
}

/// Pre-snap translation of an entity, held between the snap in `PostUpdate`
/// and the restore in `First` of the next frame.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct SnapState {
  original: Option<Vec3>,
  snapped: Vec3,
}

impl SnapState {
  /// Snaps `translation` and remembers the value it had.
  ///
  /// Does nothing if a snap is already pending, so a second snap in the same
  /// frame can never overwrite the true original.
  pub fn apply(&mut self, translation: &mut Vec3, grid: SnapGrid) {
    if self.original.is_some() || grid.is_disabled() {
      return;
    }
    let snapped = grid.snap(*translation);
    self.record(translation, snapped);
  }

  /// Snaps a local `translation` so that its world position lands on the
  /// grid. `parent` is the world transform of the entity's parent; `None`
  /// means the translation already is the world position.
  ///
  /// A parent that cannot be inverted (zero scale) leaves the translation
  /// untouched.
  pub fn apply_in(
    &mut self,
    translation: &mut Vec3,
    grid: SnapGrid,
    parent: Option<&GlobalTransform>,
  ) {
    let Some(parent) = parent else {
      self.apply(translation, grid);
      return;
    };
    if self.original.is_some() || grid.is_disabled() {
      return;
    }
    let inverse = parent.affine().inverse();
    if !inverse.is_finite() {
      return;
    }
    let world = grid.snap(parent.transform_point(*translation));
    self.record(translation, inverse.transform_point3(world));
  }

  fn record(&mut self, translation: &mut Vec3, snapped: Vec3) {
    self.original = Some(*translation);
    self.snapped = snapped;
    *translation = snapped;
  }

  /// Writes the remembered translation back. Returns true if it was written.
  ///
  /// If something moved the entity after the snap, that write wins: the
  /// pending original is dropped and `translation` is left as it is.
  pub fn restore(&mut self, translation: &mut Vec3) -> bool {
    match self.original.take() {
      Some(original) if *translation == self.snapped => {
        *translation = original;
        true
      }
      _ => false,
    }
  }

  pub fn is_pending(&self) -> bool {
    self.original.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const EPS: f32 = 1e-4;

  fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPS
  }

  #[test]
  fn snaps_to_cell_midpoint() {
    let grid = SnapGrid::new(0.25, 0.5, 0.0);
    let snapped = grid.snap(Vec3::new(1.3, 2.2, 7.0));
    // 1.3 % 0.25 = 0.05 -> 1.3 - (0.05 - 0.125)
    assert!(close(snapped, Vec3::new(1.375, 2.25, 7.0)), "{snapped:?}");
  }

  #[test]
  fn zero_axis_is_untouched() {
    let grid = SnapGrid::new(0.0, 0.25, 0.0);
    for p in [
      Vec3::new(0.123, 4.56, -7.89),
      Vec3::new(-3.3, -0.01, 0.5),
      Vec3::new(1e3, 2.0, 3.0),
    ] {
      let snapped = grid.snap(p);
      assert_eq!(snapped.x, p.x);
      assert_eq!(snapped.z, p.z);
    }
    assert_eq!(SnapGrid::ZERO.snap(Vec3::new(1.1, 2.2, 3.3)), Vec3::new(1.1, 2.2, 3.3));
  }

  #[test]
  fn snapping_is_idempotent() {
    let grid = SnapGrid::new(0.03208, 0.03208, 0.0);
    for i in 0..200 {
      let p = Vec3::new(i as f32 * 0.0137, i as f32 * 0.291 + 0.5, 1.0);
      let once = grid.snap(p);
      let twice = grid.snap(once);
      assert!(close(once, twice), "p={p:?} once={once:?} twice={twice:?}");
    }
  }

  #[test]
  fn negative_remainder_keeps_dividend_sign() {
    let grid = SnapGrid::new(1.0, 0.0, 0.0);
    // -0.25 % 1.0 = -0.25 -> -0.25 - (-0.25 - 0.5) = 0.5
    let snapped = grid.snap(Vec3::new(-0.25, 0.0, 0.0));
    assert!((snapped.x - 0.5).abs() < EPS);
    // -1.25 % 1.0 = -0.25 -> -1.25 - (-0.75) = -0.5
    let snapped = grid.snap(Vec3::new(-1.25, 0.0, 0.0));
    assert!((snapped.x + 0.5).abs() < EPS);
    // At or below -G every pass moves up a cell: -2.3 -> -1.5 -> -0.5 -> 0.5
    let mut x = -2.3;
    for expected in [-1.5, -0.5, 0.5, 0.5] {
      x = grid.snap(Vec3::new(x, 0.0, 0.0)).x;
      assert!((x - expected).abs() < EPS, "{x} != {expected}");
    }
  }

  #[test]
  fn z_axis_uses_plain_remainder() {
    let grid = SnapGrid::new(0.0, 0.0, 0.5);
    let snapped = grid.snap(Vec3::new(0.0, 0.0, 1.3));
    assert!((snapped.z - 1.0).abs() < EPS);
  }

  #[test]
  fn guard_restores_on_drop() {
    let mut position = Vec3::new(1.3, 2.2, 0.0);
    {
      let guard = SnapGuard::acquire(&mut position, SnapGrid::new(0.25, 0.5, 0.0));
      assert!(close(*guard, Vec3::new(1.375, 2.25, 0.0)));
      assert_eq!(guard.original(), Vec3::new(1.3, 2.2, 0.0));
    }
    assert_eq!(position, Vec3::new(1.3, 2.2, 0.0));
  }

  #[test]
  fn guard_restores_on_early_return() {
    fn draw(position: &mut Vec3, skip: bool) -> Option<Vec3> {
      let guard = SnapGuard::acquire(position, SnapGrid::new(1.0, 1.0, 0.0));
      if skip {
        return None;
      }
      Some(*guard)
    }

    let mut position = Vec3::new(3.2, 4.9, 0.0);
    assert!(draw(&mut position, true).is_none());
    assert_eq!(position, Vec3::new(3.2, 4.9, 0.0));
    let drawn = draw(&mut position, false).unwrap();
    assert!(close(drawn, Vec3::new(3.5, 4.5, 0.0)));
    assert_eq!(position, Vec3::new(3.2, 4.9, 0.0));
  }

  #[test]
  fn snap_state_never_overwrites_pending_original() {
    let mut state = SnapState::default();
    let mut translation = Vec3::new(1.3, 0.0, 0.0);
    let grid = SnapGrid::new(0.25, 0.0, 0.0);

    state.apply(&mut translation, grid);
    state.apply(&mut translation, grid);
    assert!(state.is_pending());

    assert!(state.restore(&mut translation));
    assert_eq!(translation, Vec3::new(1.3, 0.0, 0.0));
    assert!(!state.restore(&mut translation));
  }

  #[test]
  fn snap_state_keeps_writes_made_after_the_snap() {
    let mut state = SnapState::default();
    let mut translation = Vec3::new(1.3, 0.0, 0.0);
    state.apply(&mut translation, SnapGrid::new(0.25, 0.25, 0.0));

    translation = Vec3::new(5.0, 5.0, 0.0);
    assert!(!state.restore(&mut translation));
    assert_eq!(translation, Vec3::new(5.0, 5.0, 0.0));
    assert!(!state.is_pending());
  }

  #[test]
  fn snap_state_snaps_world_position_under_parent() {
    let grid = SnapGrid::new(0.25, 0.25, 0.0);
    let parent =
      GlobalTransform::from(Transform::from_xyz(0.3, 0.0, 0.0).with_scale(Vec3::splat(2.0)));
    let mut state = SnapState::default();
    let mut translation = Vec3::new(1.0, 0.1, 0.0);

    state.apply_in(&mut translation, grid, Some(&parent));
    // world (2.3, 0.2) -> (2.375, 0.125), back through x2 scale and +0.3
    assert!(close(translation, Vec3::new(1.0375, 0.0625, 0.0)), "{translation:?}");
    let world = parent.transform_point(translation);
    assert!(close(world, grid.snap(world)));

    assert!(state.restore(&mut translation));
    assert_eq!(translation, Vec3::new(1.0, 0.1, 0.0));
  }

  #[test]
  fn snap_state_skips_degenerate_parent() {
    let parent = GlobalTransform::from(Transform::from_scale(Vec3::ZERO));
    let mut state = SnapState::default();
    let mut translation = Vec3::new(1.3, 0.0, 0.0);
    let grid = SnapGrid::new(0.25, 0.25, 0.0);
    state.apply_in(&mut translation, grid, Some(&parent));
    assert!(!state.is_pending());
    assert_eq!(translation, Vec3::new(1.3, 0.0, 0.0));
  }

  #[test]
  fn snap_state_skips_disabled_grid() {
    let mut state = SnapState::default();
    let mut translation = Vec3::new(1.3, 0.0, 0.0);
    state.apply(&mut translation, SnapGrid::ZERO);
    assert!(!state.is_pending());
    assert_eq!(translation, Vec3::new(1.3, 0.0, 0.0));
  }
}
