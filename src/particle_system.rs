// Fixed-size particle pool driven by the noise field. Each frame it recycles
// dead particles, integrates the live ones, and rewrites the packed position
// and color buffers that the renderer uploads as a whole.

use crate::camera::{Bounds, Camera};
use crate::color::{ColorGrid, Rgb};
use crate::config::{RingContact, SystemConfig};
use crate::error::{Result, SurferError};
use crate::noise_field::NoiseField;
use crate::particle::{LifetimeRange, Particle, RingBounds};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vecmath::{vec2_add, vec2_len, vec2_scale, Vector2};

/// Scale from raw noise samples to per-frame acceleration.
pub const FORCE_SCALE: f64 = 20.0;

/// Floats per particle in each packed buffer.
pub const COMPONENTS: usize = 3;

/// Per-frame modifiers coming from the game layer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlowParams {
    pub speed_multiplier: f64,
    /// Reverses the noise force. The swirl term keeps its direction.
    pub invert: bool,
}

impl Default for FlowParams {
    fn default() -> Self {
        FlowParams {
            speed_multiplier: 1.0,
            invert: false,
        }
    }
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    positions: Vec<f32>,
    colors: Vec<f32>,
    noise: NoiseField,
    color_grid: ColorGrid,
    ring: Option<RingBounds>,
    ring_contact: RingContact,
    swirl: f64,
    max_speed: f64,
    lifetime: LifetimeRange,
    rng: StdRng,
    // configured seed, kept across reseeds
    base_seed: u32,
}

impl ParticleSystem {
    pub fn new(config: &SystemConfig) -> Result<ParticleSystem> {
        if config.count == 0 {
            return Err(SurferError::EmptyPool);
        }
        if !(config.max_speed >= 0.0 && config.max_speed.is_finite()) {
            return Err(SurferError::InvalidMaxSpeed(config.max_speed));
        }
        let lifetime = LifetimeRange::new(config.lifetime_min, config.lifetime_max)?;
        let ring = match config.ring {
            Some(ring) => Some(RingBounds::new(ring.inner, ring.outer)?),
            None => None,
        };
        let gradient = &config.gradient;
        let color_grid = ColorGrid::from_hex_stops(
            &gradient.x_stops,
            &gradient.y_stops,
            gradient.detail_x,
            gradient.detail_y,
        )?;
        let noise = NoiseField::new(config.noise.clone(), config.seed)?;

        let mut rng = StdRng::seed_from_u64(config.seed as u64);
        let particles: Vec<Particle> = (0..config.count)
            .map(|_| Particle::new(&lifetime, &mut rng))
            .collect();

        log::info!(
            "particle system: {} particles, seed {}, ring {:?}, swirl {}",
            config.count,
            config.seed,
            config.ring,
            config.swirl
        );

        Ok(ParticleSystem {
            particles,
            positions: vec![0.0; config.count * COMPONENTS],
            colors: vec![0.0; config.count * COMPONENTS],
            noise,
            color_grid,
            ring,
            ring_contact: config.ring_contact,
            swirl: config.swirl,
            max_speed: config.max_speed,
            lifetime,
            rng,
            base_seed: config.seed,
        })
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// x, y, 0 per particle, slot `i` belonging to particle `i`.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// r, g, b in [0, 1] per particle.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn color_grid(&self) -> &ColorGrid {
        &self.color_grid
    }

    pub fn ring(&self) -> Option<&RingBounds> {
        self.ring.as_ref()
    }

    pub fn base_seed(&self) -> u32 {
        self.base_seed
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn set_ring(&mut self, ring: Option<RingBounds>) {
        self.ring = ring;
    }

    pub fn reseed(&mut self, seed: u32) {
        log::info!("reseeding noise field {} -> {}", self.noise.seed(), seed);
        self.noise.reseed(seed);
    }

    /// Rebuilds the color grid at its current resolution. On error the old
    /// grid stays in place.
    pub fn set_gradients(&mut self, x_stops: &[String], y_stops: &[String]) -> Result<()> {
        let grid = ColorGrid::from_hex_stops(
            x_stops,
            y_stops,
            self.color_grid.detail_x(),
            self.color_grid.detail_y(),
        )?;
        log::debug!("color grid rebuilt from {:?} / {:?}", x_stops, y_stops);
        self.color_grid = grid;
        Ok(())
    }

    pub fn update(&mut self, dt: f64, camera: &Camera, speed_multiplier: f64, invert: bool) {
        let bounds = camera.visible_bounds();
        self.update_in_bounds(
            dt,
            &bounds,
            FlowParams {
                speed_multiplier,
                invert,
            },
        );
    }

    /// One simulation step against an already computed visible rectangle.
    pub fn update_in_bounds(&mut self, dt: f64, bounds: &Bounds, flow: FlowParams) {
        let ParticleSystem {
            particles,
            positions,
            colors,
            noise,
            color_grid,
            ring,
            ring_contact,
            swirl,
            max_speed,
            lifetime,
            rng,
            ..
        } = self;

        let bouncing = *ring_contact == RingContact::Bounce;
        let lethal_ring = if bouncing { None } else { ring.as_ref() };
        let mut color = Rgb::BLACK;

        for (i, p) in particles.iter_mut().enumerate() {
            if p.is_dead(bounds, lethal_ring) {
                p.reset(bounds, ring.as_ref(), lifetime, rng);
            }

            p.acc = flow_acceleration(noise, p.pos, *swirl, dt, flow);
            p.integrate(dt, *max_speed);

            if bouncing {
                if let Some(ring) = ring.as_ref() {
                    p.bounce(ring, rng);
                }
            }

            let slot = i * COMPONENTS;
            positions[slot] = p.pos[0] as f32;
            positions[slot + 1] = p.pos[1] as f32;
            positions[slot + 2] = 0.0;

            color_grid.lookup_into(p.normalized_vel[0], p.normalized_vel[1], &mut color);
            colors[slot] = color.r;
            colors[slot + 1] = color.g;
            colors[slot + 2] = color.b;
        }
    }
}

/// Noise force at `pos`, optionally reversed, plus the tangential swirl,
/// scaled to a per-frame acceleration.
pub fn flow_acceleration(
    noise: &NoiseField,
    pos: Vector2<f64>,
    swirl: f64,
    dt: f64,
    flow: FlowParams,
) -> Vector2<f64> {
    let mut force = noise.force(pos[0], pos[1]);
    if flow.invert {
        force = vec2_scale(force, -1.0);
    }
    if swirl != 0.0 {
        let radius = vec2_len(pos);
        if radius > 0.0 {
            let tangent = [-pos[1] / radius, pos[0] / radius];
            force = vec2_add(force, vec2_scale(tangent, swirl));
        }
    }
    vec2_scale(force, dt * FORCE_SCALE * flow.speed_multiplier)
}
