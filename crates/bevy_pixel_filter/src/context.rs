//! Camera → snap grid lookup shared by publishers and snappers.

use std::collections::HashMap;
use std::hash::Hash;

use bevy::prelude::*;

use crate::snap::SnapGrid;

#[derive(Clone, Copy, Debug)]
struct Publication {
  grid: SnapGrid,
  enabled: bool,
  /// Stamp of the last publish-or-focus; refocus picks the newest.
  stamp: u64,
}

/// Explicit replacement for a global "current snap grid".
///
/// Publishers write their grid per camera. Readers ask for the grid of the
/// camera being processed; repeated queries for the same camera are answered
/// from a one-entry cache without touching the map.
#[derive(Debug)]
pub struct SnapContext<K> {
  publications: HashMap<K, Publication>,
  focus: Option<K>,
  cached_camera: Option<K>,
  cached_grid: SnapGrid,
  resolves: u64,
  stamps: u64,
}

impl<K> Default for SnapContext<K> {
  fn default() -> Self {
    Self {
      publications: HashMap::new(),
      focus: None,
      cached_camera: None,
      cached_grid: SnapGrid::ZERO,
      resolves: 0,
      stamps: 0,
    }
  }
}

impl<K: Copy + Eq + Hash> SnapContext<K> {
  /// Binds an enabled publication with `grid` to `camera`.
  pub fn publish(&mut self, camera: K, grid: SnapGrid) {
    let stamp = self.next_stamp();
    self.publications.insert(
      camera,
      Publication {
        grid,
        enabled: true,
        stamp,
      },
    );
    self.refresh(camera);
  }

  /// Toggles an existing publication. Unknown cameras are ignored.
  pub fn set_enabled(&mut self, camera: K, enabled: bool) {
    if let Some(publication) = self.publications.get_mut(&camera) {
      publication.enabled = enabled;
      if !enabled && self.focus == Some(camera) {
        self.refocus();
      }
      self.refresh(camera);
    }
  }

  /// Removes the publication for `camera`; lookups for it return zero.
  ///
  /// Withdrawing the focused camera moves focus to the enabled publication
  /// that was most recently published or focused, if there is one.
  pub fn withdraw(&mut self, camera: K) {
    self.publications.remove(&camera);
    if self.focus == Some(camera) {
      self.refocus();
    }
    self.refresh(camera);
  }

  /// Snap grid for `camera`, zero if it has no enabled publication.
  pub fn snap_grid(&mut self, camera: K) -> SnapGrid {
    if self.cached_camera == Some(camera) {
      return self.cached_grid;
    }
    self.cached_camera = Some(camera);
    self.cached_grid = self.resolve(camera);
    self.cached_grid
  }

  /// Marks `camera` as the one currently being processed.
  pub fn focus(&mut self, camera: K) {
    let stamp = self.next_stamp();
    if let Some(publication) = self.publications.get_mut(&camera) {
      publication.stamp = stamp;
    }
    self.focus = Some(camera);
  }

  pub fn focused(&self) -> Option<K> {
    self.focus
  }

  /// Grid of the focused camera, zero if nothing is focused.
  pub fn current_grid(&mut self) -> SnapGrid {
    match self.focus {
      Some(camera) => self.snap_grid(camera),
      None => SnapGrid::ZERO,
    }
  }

  /// Number of map lookups performed so far.
  pub fn resolve_count(&self) -> u64 {
    self.resolves
  }

  fn resolve(&mut self, camera: K) -> SnapGrid {
    self.resolves += 1;
    match self.publications.get(&camera) {
      Some(publication) if publication.enabled => publication.grid,
      _ => SnapGrid::ZERO,
    }
  }

  fn refocus(&mut self) {
    self.focus = self
      .publications
      .iter()
      .filter(|(_, publication)| publication.enabled)
      .max_by_key(|(_, publication)| publication.stamp)
      .map(|(camera, _)| *camera);
  }

  fn next_stamp(&mut self) -> u64 {
    self.stamps += 1;
    self.stamps
  }

  // Keeps the cache coherent when the cached camera's publication changes.
  fn refresh(&mut self, camera: K) {
    if self.cached_camera == Some(camera) {
      self.cached_grid = self.resolve(camera);
    }
  }
}

/// [`SnapContext`] keyed by camera entity.
#[derive(Resource, Default, Debug)]
pub struct PixelSnapContext(pub SnapContext<Entity>);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unbound_camera_yields_zero() {
    let mut context = SnapContext::<u32>::default();
    assert_eq!(context.snap_grid(1), SnapGrid::ZERO);
    assert_eq!(context.snap_grid(1), SnapGrid::ZERO);
    assert_eq!(context.resolve_count(), 1);
  }

  #[test]
  fn bind_after_cached_zero_is_visible() {
    let mut context = SnapContext::<u32>::default();
    assert_eq!(context.snap_grid(7), SnapGrid::ZERO);

    let grid = SnapGrid::new(0.5, 0.25, 0.0);
    context.publish(7, grid);
    assert_eq!(context.snap_grid(7), grid);
  }

  #[test]
  fn repeated_queries_hit_cache() {
    let mut context = SnapContext::<u32>::default();
    context.publish(1, SnapGrid::new(1.0, 1.0, 0.0));
    context.publish(2, SnapGrid::new(2.0, 2.0, 0.0));

    for _ in 0..100 {
      context.snap_grid(1);
    }
    assert_eq!(context.resolve_count(), 1);

    assert_eq!(context.snap_grid(2), SnapGrid::new(2.0, 2.0, 0.0));
    assert_eq!(context.snap_grid(1), SnapGrid::new(1.0, 1.0, 0.0));
    assert_eq!(context.resolve_count(), 3);
  }

  #[test]
  fn disabled_or_withdrawn_publisher_degrades_to_zero() {
    let mut context = SnapContext::<u32>::default();
    let grid = SnapGrid::new(0.5, 0.5, 0.0);
    context.publish(3, grid);
    assert_eq!(context.snap_grid(3), grid);

    context.set_enabled(3, false);
    assert_eq!(context.snap_grid(3), SnapGrid::ZERO);

    context.set_enabled(3, true);
    assert_eq!(context.snap_grid(3), grid);

    context.withdraw(3);
    assert_eq!(context.snap_grid(3), SnapGrid::ZERO);

    // Toggling a camera that was never bound is harmless
    context.set_enabled(99, true);
    assert_eq!(context.snap_grid(99), SnapGrid::ZERO);
  }

  #[test]
  fn republish_updates_cached_grid() {
    let mut context = SnapContext::<u32>::default();
    context.publish(1, SnapGrid::new(1.0, 1.0, 0.0));
    context.snap_grid(1);
    context.publish(1, SnapGrid::new(0.5, 0.5, 0.0));
    assert_eq!(context.snap_grid(1), SnapGrid::new(0.5, 0.5, 0.0));
  }

  #[test]
  fn focus_selects_current_grid() {
    let mut context = SnapContext::<u32>::default();
    assert_eq!(context.current_grid(), SnapGrid::ZERO);

    context.publish(4, SnapGrid::new(0.1, 0.2, 0.0));
    context.focus(4);
    assert_eq!(context.focused(), Some(4));
    assert_eq!(context.current_grid(), SnapGrid::new(0.1, 0.2, 0.0));

    context.withdraw(4);
    assert_eq!(context.focused(), None);
    assert_eq!(context.current_grid(), SnapGrid::ZERO);
  }

  #[test]
  fn withdrawing_focused_camera_moves_focus_to_remaining_one() {
    let mut context = SnapContext::<u32>::default();
    let grid = SnapGrid::new(0.3, 0.3, 0.0);
    context.publish(1, SnapGrid::new(0.1, 0.1, 0.0));
    context.publish(2, grid);
    context.focus(1);

    context.withdraw(1);
    assert_eq!(context.focused(), Some(2));
    assert_eq!(context.current_grid(), grid);

    context.withdraw(2);
    assert_eq!(context.focused(), None);
  }

  #[test]
  fn disabling_focused_camera_skips_disabled_publications() {
    let mut context = SnapContext::<u32>::default();
    context.publish(1, SnapGrid::new(0.1, 0.1, 0.0));
    context.publish(2, SnapGrid::new(0.2, 0.2, 0.0));
    context.publish(3, SnapGrid::new(0.3, 0.3, 0.0));
    context.set_enabled(2, false);
    context.focus(1);

    context.set_enabled(1, false);
    assert_eq!(context.focused(), Some(3));

    // Unfocused cameras leave focus alone
    context.withdraw(2);
    assert_eq!(context.focused(), Some(3));
  }

  #[test]
  fn refocus_prefers_most_recently_active_camera() {
    for order in [[1u32, 2, 3], [3, 2, 1], [2, 3, 1]] {
      let mut context = SnapContext::<u32>::default();
      for camera in order {
        context.publish(camera, SnapGrid::new(0.1 * camera as f32, 0.1, 0.0));
      }
      context.focus(2);
      context.focus(4);
      context.focus(1);

      context.withdraw(1);
      assert_eq!(context.focused(), Some(2), "order {order:?}");
      context.withdraw(2);
      assert_eq!(context.focused(), Some(3), "order {order:?}");
    }
  }
}
