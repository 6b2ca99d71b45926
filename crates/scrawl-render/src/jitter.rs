//! Per-draw randomness for a hand-written look.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Source of per-draw vertical offsets and rotation angles.
pub trait JitterSource {
    /// Integer offset in `[-amplitude, amplitude]`. Zero when `amplitude <= 0`.
    fn offset(&mut self, amplitude: i32) -> i32;

    /// Angle in degrees in `[-max_deg, max_deg]`. Zero when `max_deg <= 0`.
    fn angle(&mut self, max_deg: f32) -> f32;
}

impl<T: JitterSource + ?Sized> JitterSource for &mut T {
    fn offset(&mut self, amplitude: i32) -> i32 {
        (**self).offset(amplitude)
    }

    fn angle(&mut self, max_deg: f32) -> f32 {
        (**self).angle(max_deg)
    }
}

/// Always zero. Layout output is fully deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn offset(&mut self, _amplitude: i32) -> i32 {
        0
    }

    fn angle(&mut self, _max_deg: f32) -> f32 {
        0.0
    }
}

fn draw_offset<R: Rng + ?Sized>(rng: &mut R, amplitude: i32) -> i32 {
    if amplitude <= 0 {
        return 0;
    }
    rng.random_range(-amplitude..=amplitude)
}

fn draw_angle<R: Rng + ?Sized>(rng: &mut R, max_deg: f32) -> f32 {
    if !max_deg.is_finite() || max_deg <= 0.0 {
        return 0.0;
    }
    rng.random_range(-max_deg..=max_deg)
}

/// Reproducible jitter from a fixed seed.
#[derive(Clone, Debug)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl JitterSource for SeededJitter {
    fn offset(&mut self, amplitude: i32) -> i32 {
        draw_offset(&mut self.rng, amplitude)
    }

    fn angle(&mut self, max_deg: f32) -> f32 {
        draw_angle(&mut self.rng, max_deg)
    }
}

/// Jitter from the thread-local OS-seeded generator.
#[derive(Clone, Debug)]
pub struct ThreadJitter {
    rng: ThreadRng,
}

impl Default for ThreadJitter {
    fn default() -> Self {
        Self { rng: rand::rng() }
    }
}

impl JitterSource for ThreadJitter {
    fn offset(&mut self, amplitude: i32) -> i32 {
        draw_offset(&mut self.rng, amplitude)
    }

    fn angle(&mut self, max_deg: f32) -> f32 {
        draw_angle(&mut self.rng, max_deg)
    }
}
