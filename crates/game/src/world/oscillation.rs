//! Back-and-forth motion around a start position.

use std::f32::consts::PI;

use bevy::prelude::*;
use serde::Deserialize;

use crate::config::OscillatorConfig;

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Wave {
  Sin,
  #[default]
  Cos,
}

impl Wave {
  pub fn sample(self, x: f32) -> f32 {
    match self {
      Wave::Sin => x.sin(),
      Wave::Cos => x.cos(),
    }
  }
}

/// Moves the entity along each axis as `start + wave(t * PI * speed) *
/// distance`. The start is the translation the entity had when first seen.
#[derive(Component, Clone, Copy, Debug)]
pub struct Oscillator {
  /// Half cycles per second, per axis.
  pub speed: Vec3,
  pub distance: Vec3,
  pub wave: Wave,
  start: Option<Vec3>,
}

impl Oscillator {
  pub fn new(speed: Vec3, distance: Vec3, wave: Wave) -> Self {
    Self {
      speed,
      distance,
      wave,
      start: None,
    }
  }

  /// Offset from the start at `elapsed` seconds.
  pub fn offset(&self, elapsed: f32) -> Vec3 {
    let phase = self.speed * (elapsed * PI);
    Vec3::new(
      self.wave.sample(phase.x),
      self.wave.sample(phase.y),
      self.wave.sample(phase.z),
    ) * self.distance
  }
}

impl From<&OscillatorConfig> for Oscillator {
  fn from(config: &OscillatorConfig) -> Self {
    Self::new(
      Vec3::from_array(config.speed),
      Vec3::from_array(config.distance),
      config.wave,
    )
  }
}

pub fn oscillate(time: Res<Time>, mut oscillators: Query<(&mut Oscillator, &mut Transform)>) {
  let elapsed = time.elapsed_secs();
  for (mut oscillator, mut transform) in &mut oscillators {
    let start = *oscillator.start.get_or_insert(transform.translation);
    transform.translation = start + oscillator.offset(elapsed);
  }
}
