// particle.rs - Single particle state
//
// Positions live in normalized device coordinates ([-1, 1] per axis, though
// nothing stops a particle drifting outside before it is culled).

use super::rand;

/// On-screen radius shared by every particle, in shader point units. The
/// simulation rescales it against the canvas backing height when it needs a
/// radius in normalized coordinates.
pub const RADIUS: f64 = 30.0;

/// 2D point or vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Kinematic state of one particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Bounce damping on floor contact. Negative: it is multiplied straight
    /// into the vertical velocity, inverting and damping it in one go.
    pub restitution: f64,
    pub mass: f64,
}

impl Particle {
    /// Spawn at (x, y) with a slight random sideways drift and an
    /// upward-or-none vertical bias.
    pub fn spawn(x: f64, y: f64, rng: &mut u32) -> Self {
        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::new(rand(rng) - 0.5, -(rand(rng) * 0.8)),
            restitution: -0.8,
            mass: 30.0,
        }
    }
}
