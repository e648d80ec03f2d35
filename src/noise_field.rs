// Seeded scalar noise over the plane, used as a force generator for the
// particle flow. A 2D force is read from two samples at offset coordinates.

use crate::config::NoiseSettings;
use crate::error::{Result, SurferError};
use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex};

/// Offset of the second sample used to build the y component of a force.
pub const FORCE_OFFSET: [f64; 2] = [123.0, -543.0];

// Offset for the warp noise's y component
const WARP_OFFSET: [f64; 2] = [-271.0, 389.0];

#[derive(Clone)]
pub struct NoiseField {
    settings: NoiseSettings,
    seed: u32,
    base: Fbm<OpenSimplex>,
    warp: Fbm<OpenSimplex>,
}

impl NoiseField {
    pub fn new(settings: NoiseSettings, seed: u32) -> Result<NoiseField> {
        if !(settings.min <= settings.max) {
            return Err(SurferError::InvalidNoiseRange {
                min: settings.min,
                max: settings.max,
            });
        }
        let base = build_fbm(&settings, seed);
        let warp = build_fbm(&settings, seed.wrapping_add(1));
        Ok(NoiseField {
            settings,
            seed,
            base,
            warp,
        })
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Throws away the current generators. Values sampled before the call
    /// cannot be reproduced afterwards unless the old seed is restored.
    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed;
        self.base = build_fbm(&self.settings, seed);
        self.warp = build_fbm(&self.settings, seed.wrapping_add(1));
    }

    /// Scalar noise at `(x, y)`, always within `[settings.min, settings.max]`.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let (mut sx, mut sy) = (x, y);
        if self.settings.warp != 0.0 {
            sx += self.warp.get([x, y]) * self.settings.warp;
            sy += self.warp.get([x + WARP_OFFSET[0], y + WARP_OFFSET[1]]) * self.settings.warp;
        }
        let raw = self.base.get([sx, sy]);
        let unit = if raw.is_nan() { 0.0 } else { raw.max(-1.0).min(1.0) };
        let t = (unit + 1.0) * 0.5;
        self.settings.min + (self.settings.max - self.settings.min) * t
    }

    /// Two decorrelated samples of the same field packed into a vector.
    pub fn force(&self, x: f64, y: f64) -> [f64; 2] {
        [
            self.evaluate(x, y),
            self.evaluate(x + FORCE_OFFSET[0], y + FORCE_OFFSET[1]),
        ]
    }
}

fn build_fbm(settings: &NoiseSettings, seed: u32) -> Fbm<OpenSimplex> {
    Fbm::<OpenSimplex>::new(seed)
        .set_octaves(settings.octaves.max(1))
        .set_frequency(settings.scale)
        .set_lacunarity(settings.lacunarity)
        .set_persistence(settings.gain)
}
