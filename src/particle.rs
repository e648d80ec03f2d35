// A single pooled particle: kinematic state plus the rules deciding when it
// dies and where it comes back.

use crate::camera::Bounds;
use crate::error::{Result, SurferError};
use rand::Rng;
use vecmath::{vec2_add, vec2_dot, vec2_len, vec2_scale, vec2_sub, Vector2};

/// Annulus around the origin, stored as squared radii.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RingBounds {
    pub inner_sq: f64,
    pub outer_sq: f64,
}

impl RingBounds {
    pub fn new(inner: f64, outer: f64) -> Result<RingBounds> {
        if !(inner >= 0.0 && inner < outer && outer.is_finite()) {
            return Err(SurferError::InvalidRing { inner, outer });
        }
        Ok(RingBounds {
            inner_sq: inner * inner,
            outer_sq: outer * outer,
        })
    }

    pub fn inner(&self) -> f64 {
        self.inner_sq.sqrt()
    }

    pub fn outer(&self) -> f64 {
        self.outer_sq.sqrt()
    }

    pub fn contains(&self, pos: Vector2<f64>) -> bool {
        let dist_sq = vec2_dot(pos, pos);
        dist_sq >= self.inner_sq && dist_sq <= self.outer_sq
    }
}

/// Uniform range new lifetimes are drawn from, in seconds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LifetimeRange {
    pub min: f64,
    pub max: f64,
}

impl LifetimeRange {
    pub fn new(min: f64, max: f64) -> Result<LifetimeRange> {
        if !(min >= 0.0 && min < max && max.is_finite()) {
            return Err(SurferError::InvalidLifetime { min, max });
        }
        Ok(LifetimeRange { min, max })
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.min + rng.gen::<f64>() * (self.max - self.min)
    }
}

impl Default for LifetimeRange {
    fn default() -> Self {
        LifetimeRange { min: 0.3, max: 2.1 }
    }
}

// Distance a bounced point is pushed back inside the ring
const RING_PUSH: f64 = 0.1;
const BOUNCE_JITTER: f64 = 0.01;
const BOUNCE_DAMPING: f64 = 0.7;
const RESET_ATTEMPTS: usize = 32;

/// Pushes a point that left the ring back inside it and mirrors its velocity
/// about the radial normal. Returns false if the point was already inside.
pub fn confine_to_ring(pos: &mut Vector2<f64>, vel: &mut Vector2<f64>, ring: &RingBounds) -> bool {
    let dist_sq = vec2_dot(*pos, *pos);
    let target = if dist_sq < ring.inner_sq {
        ring.inner() + RING_PUSH
    } else if dist_sq > ring.outer_sq {
        (ring.outer() - RING_PUSH).max(ring.inner())
    } else {
        return false;
    };

    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0 {
        vec2_scale(*pos, 1.0 / dist)
    } else {
        [1.0, 0.0]
    };
    *pos = vec2_scale(normal, target);
    let along_normal = vec2_dot(*vel, normal);
    *vel = vec2_sub(*vel, vec2_scale(normal, 2.0 * along_normal));
    true
}

#[derive(Copy, Clone, Debug)]
pub struct Particle {
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
    pub acc: Vector2<f64>,
    pub remaining_lifetime: f64,
    pub normalized_vel: Vector2<f64>,
    /// Number of times this slot has been recycled.
    pub respawns: u32,
}

impl Particle {
    /// Integration scale applied to velocity each frame.
    pub const MOTION_SCALE: f64 = 50.0;

    pub fn new<R: Rng>(lifetime: &LifetimeRange, rng: &mut R) -> Particle {
        Particle {
            pos: [0.0, 0.0],
            vel: [0.0, 0.0],
            acc: [0.0, 0.0],
            remaining_lifetime: lifetime.sample(rng),
            normalized_vel: [0.0, 0.0],
            respawns: 0,
        }
    }

    pub fn is_dead(&self, bounds: &Bounds, ring: Option<&RingBounds>) -> bool {
        if self.remaining_lifetime <= 0.0 {
            return true;
        }
        if !bounds.contains(self.pos[0], self.pos[1]) {
            return true;
        }
        match ring {
            Some(ring) => !ring.contains(self.pos),
            None => false,
        }
    }

    /// Respawns the particle somewhere inside `bounds`. With a ring, points
    /// outside the annulus are redrawn a bounded number of times; when the
    /// two regions barely overlap the last draw is kept and the next death
    /// check culls it.
    pub fn reset<R: Rng>(
        &mut self,
        bounds: &Bounds,
        ring: Option<&RingBounds>,
        lifetime: &LifetimeRange,
        rng: &mut R,
    ) {
        let mut pos = random_point(bounds, rng);
        if let Some(ring) = ring {
            for _ in 1..RESET_ATTEMPTS {
                if ring.contains(pos) {
                    break;
                }
                pos = random_point(bounds, rng);
            }
        }
        self.pos = pos;
        self.vel = [0.0, 0.0];
        self.acc = [0.0, 0.0];
        self.normalized_vel = [0.0, 0.0];
        self.remaining_lifetime = lifetime.sample(rng);
        self.respawns = self.respawns.wrapping_add(1);
    }

    pub fn integrate(&mut self, dt: f64, max_speed: f64) {
        self.vel = vec2_add(self.vel, self.acc);
        let speed = vec2_len(self.vel);
        if speed > max_speed {
            self.vel = if speed.is_finite() && speed > 0.0 {
                vec2_scale(self.vel, max_speed / speed)
            } else {
                [0.0, 0.0]
            };
        }
        self.pos = vec2_add(self.pos, vec2_scale(self.vel, dt * Particle::MOTION_SCALE));
        self.remaining_lifetime -= dt;

        self.normalized_vel = if max_speed > 0.0 {
            vec2_scale(self.vel, 1.0 / max_speed)
        } else {
            [0.0, 0.0]
        };
    }

    /// Keeps the particle inside the ring by reflecting it off whichever
    /// boundary it crossed, with a little random scatter and damping.
    pub fn bounce<R: Rng>(&mut self, ring: &RingBounds, rng: &mut R) -> bool {
        if !confine_to_ring(&mut self.pos, &mut self.vel, ring) {
            return false;
        }
        let jitter = [
            (rng.gen::<f64>() - 0.5) * BOUNCE_JITTER,
            (rng.gen::<f64>() - 0.5) * BOUNCE_JITTER,
        ];
        self.vel = vec2_scale(vec2_add(self.vel, jitter), BOUNCE_DAMPING);
        true
    }
}

fn random_point<R: Rng>(bounds: &Bounds, rng: &mut R) -> Vector2<f64> {
    // clamped so rounding can never land a point past the far edge
    [
        (bounds.min_x + rng.gen::<f64>() * bounds.width()).min(bounds.max_x),
        (bounds.min_y + rng.gen::<f64>() * bounds.height()).min(bounds.max_y),
    ]
}
