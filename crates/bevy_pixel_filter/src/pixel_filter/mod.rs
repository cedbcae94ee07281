//! Pixel filter camera.
//!
//! Renders a camera into a low-resolution offscreen image and blits it to
//! the camera's real target with nearest-neighbor sampling, which gives the
//! blocky pixel-art look. Optionally snaps the camera and any
//! [`PixelSnapper`](crate::snapper::PixelSnapper) entities to the offscreen
//! pixel grid so moving objects don't shimmer.
//!
//! # Usage
//!
//! ```ignore
//! use bevy_pixel_filter::{PixelFilter, PixelFilterPlugin, PixelFilterSettings, PixelSnapper};
//!
//! app.add_plugins(PixelFilterPlugin);
//!
//! commands.spawn((
//!     Camera3d::default(),
//!     PixelFilter::new(PixelFilterSettings {
//!         use_snapping: true,
//!         ..default()
//!     }),
//! ));
//! commands.spawn((Sprite::default(), PixelSnapper::default()));
//! ```
//!
//! # Frame order
//!
//! 1. `PostUpdate`, [`PixelFilterSet::Recalculate`]: enable/disable filters,
//!    recompute surface and grid, publish to [`PixelSnapContext`].
//! 2. `PostUpdate`, [`PixelFilterSet::Snap`] (before transform propagation):
//!    snap filter cameras and snappers.
//! 3. Render. The blit camera draws the offscreen image on `BLIT_LAYER`.
//! 4. `First` of the next frame, [`PixelFilterSet::Restore`]: restore every
//!    snapped translation before game logic runs.
//!
//! Camera follow systems should run before [`PixelFilterSet::Recalculate`].

mod components;
mod setup;
mod state;
mod systems;

use bevy::prelude::*;
use bevy::transform::TransformSystems;
pub use components::{PixelFilter, PixelFilterBlitCamera, PixelFilterBlitQuad};
pub use setup::BLIT_LAYER;
pub use state::PixelFilterState;

use crate::context::PixelSnapContext;
use crate::snapper;

/// System sets of the pixel filter, in frame order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PixelFilterSet {
  Recalculate,
  Snap,
  Restore,
}

/// Plugin for pixel filter cameras and snappers.
pub struct PixelFilterPlugin;

impl Plugin for PixelFilterPlugin {
  fn build(&self, app: &mut App) {
    app.init_resource::<PixelSnapContext>();

    app.configure_sets(
      PostUpdate,
      (PixelFilterSet::Recalculate, PixelFilterSet::Snap)
        .chain()
        .before(TransformSystems::Propagate),
    );
    app.configure_sets(First, PixelFilterSet::Restore);

    app.add_systems(
      PostUpdate,
      (
        setup::deactivate_filters,
        setup::despawn_orphaned_blits,
        setup::activate_filters,
        systems::recalculate_filters,
      )
        .chain()
        .in_set(PixelFilterSet::Recalculate),
    );

    app.add_systems(
      PostUpdate,
      snapper::snap_to_grid.in_set(PixelFilterSet::Snap),
    );

    app.add_systems(
      First,
      systems::restore_snapped.in_set(PixelFilterSet::Restore),
    );
  }
}
