// sim/ - Particle simulation
//
// Drag-and-gravity integration over an exclusively owned particle list,
// advanced once per animation tick. Pure Rust with no DOM or GL types, so
// everything here builds and tests natively.

mod particle;

pub use particle::{Particle, RADIUS, Vec2};

// Drag model constants. The coefficient is that of a sphere; the frontal
// area is the cross-section of a disc of RADIUS, scaled down to match the
// magnitudes of normalized device coordinates.
const DRAG_COEFFICIENT: f64 = 0.47;
const FLUID_DENSITY: f64 = 0.022;
const FRONTAL_AREA: f64 = std::f64::consts::PI * RADIUS * RADIUS / 10_000.0;

const GRAVITY: f64 = 2.81;
const FLOOR_RESISTANCE: f64 = 0.99;

/// Fixed integration step. Frames are assumed to arrive at 60 Hz; the model
/// does not compensate for actual elapsed wall-clock time.
const FRAME_DT: f64 = 1.0 / 60.0;

/// Owns the particle collection and the spawn randomness.
///
/// The tick logic is the only mutator apart from the spawn calls, which the
/// single-threaded host can only interleave between ticks.
pub struct Simulation {
    particles: Vec<Particle>,
    rng: u32,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            rng: 0xDEAD_BEEF,
        }
    }

    /// Append one particle at (x, y) in normalized device coordinates.
    pub fn spawn_at(&mut self, x: f64, y: f64) {
        let particle = Particle::spawn(x, y, &mut self.rng);
        self.particles.push(particle);
    }

    /// Drop a burst of particles at the origin.
    pub fn seed(&mut self, count: usize) {
        for _ in 0..count {
            self.spawn_at(0.0, 0.0);
        }
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

    /// Advance every particle by one fixed time step, resolve floor
    /// collisions, then cull particles that have left the screen sideways.
    ///
    /// `screen_height_px` is the canvas backing height; together with the
    /// device pixel ratio it fixes the particle radius in normalized units.
    pub fn step(&mut self, screen_height_px: f64, device_pixel_ratio: f64) {
        let screen_radius = screen_radius(screen_height_px, device_pixel_ratio);

        for particle in &mut self.particles {
            integrate(particle, screen_radius);
        }

        // One-diameter margin past the edge so particles never visibly pop
        // out of existence.
        let bound = 1.0 + screen_radius * 2.0;
        self.particles.retain(|p| p.position.x.abs() < bound);
    }

    /// Flatten the surviving positions into `[x0, y0, x1, y1, ...]` for the
    /// GPU upload. `None` when there is nothing to draw; the caller must then
    /// skip the buffer update and the draw call entirely.
    pub fn packed_positions(&self) -> Option<Vec<f32>> {
        if self.particles.is_empty() {
            return None;
        }

        let mut out = Vec::with_capacity(self.particles.len() * 2);
        for particle in &self.particles {
            out.push(particle.position.x as f32);
            out.push(particle.position.y as f32);
        }
        Some(out)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

fn integrate(particle: &mut Particle, screen_radius: f64) {
    let fx = drag_force(particle.velocity.x);
    let fy = drag_force(particle.velocity.y);

    // F = ma, with gravity acting on the vertical axis only.
    let ax = fx / particle.mass;
    let ay = GRAVITY + fy / particle.mass;

    // Semi-implicit Euler: velocity first, then position from the new
    // velocity. The vertical sign flips because positive velocity means
    // screen-down while -1 is the bottom of normalized space.
    particle.velocity.x += ax * FRAME_DT;
    particle.velocity.y += ay * FRAME_DT;
    particle.position.x += particle.velocity.x * FRAME_DT;
    particle.position.y -= particle.velocity.y * FRAME_DT;

    // Floor bounce. The clamp keeps a particle from sinking below the
    // boundary within the tick that hit it.
    let floor = -1.0 + screen_radius;
    if particle.position.y < floor {
        particle.velocity.y *= particle.restitution;
        particle.velocity.x *= FLOOR_RESISTANCE;
        particle.position.y = floor;
    }
}

/// Signed quadratic drag on one axis. The v³/|v| form is 0/0 for a particle
/// at rest, which stands for "no drag", so the NaN collapses to zero.
fn drag_force(velocity: f64) -> f64 {
    let force = -0.5 * DRAG_COEFFICIENT * FRONTAL_AREA * FLUID_DENSITY * velocity.powi(3)
        / velocity.abs();
    if force.is_nan() { 0.0 } else { force }
}

/// Particle radius in normalized coordinates, proportional to the canvas
/// backing height.
pub fn screen_radius(screen_height_px: f64, device_pixel_ratio: f64) -> f64 {
    RADIUS / screen_height_px * device_pixel_ratio
}

/// Convert CSS-pixel pointer coordinates over the canvas to normalized
/// device coordinates.
pub fn to_ndc(client_x: f64, client_y: f64, css_width: f64, css_height: f64) -> Vec2 {
    Vec2::new(
        (client_x / css_width - 0.5) * 2.0,
        -(client_y / css_height - 0.5) * 2.0,
    )
}

/// Backing-store resolution for a CSS size at the given device pixel ratio.
pub fn backing_size(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
    (
        (css_width * device_pixel_ratio) as u32,
        (css_height * device_pixel_ratio) as u32,
    )
}

// xorshift32, good enough for spawn jitter.
pub(crate) fn rand(rng: &mut u32) -> f64 {
    *rng ^= *rng << 13;
    *rng ^= *rng >> 17;
    *rng ^= *rng << 5;
    (*rng >> 8) as f64 * (1.0 / 16_777_216.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resting(x: f64, y: f64) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::default(),
            restitution: -0.8,
            mass: 30.0,
        }
    }

    #[test]
    fn static_particle_feels_no_drag() {
        assert_eq!(drag_force(0.0), 0.0);
    }

    #[test]
    fn drag_opposes_motion_symmetrically() {
        assert!(drag_force(2.0) < 0.0);
        assert!(drag_force(-2.0) > 0.0);
        assert_eq!(drag_force(2.0), -drag_force(-2.0));
    }

    #[test]
    fn rest_particle_accelerates_under_gravity_only() {
        let mut sim = Simulation::new();
        sim.particles.push(resting(0.0, 0.0));

        sim.step(321.0, 1.0);

        let p = &sim.particles[0];
        assert_eq!(p.velocity.x, 0.0);
        assert_eq!(p.velocity.y, GRAVITY * FRAME_DT);
        assert_eq!(p.position.x, 0.0);
        assert_eq!(p.position.y, -(GRAVITY * FRAME_DT) * FRAME_DT);
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn floor_bounce_clamps_and_damps() {
        let mut sim = Simulation::new();
        let mut p = resting(0.0, -1.0);
        p.velocity = Vec2::new(0.5, 3.0);
        sim.particles.push(p);

        sim.step(600.0, 1.0);

        let vx_integrated = 0.5 + (drag_force(0.5) / 30.0) * FRAME_DT;
        let vy_integrated = 3.0 + (GRAVITY + drag_force(3.0) / 30.0) * FRAME_DT;

        let p = &sim.particles[0];
        assert_eq!(p.position.y, -1.0 + screen_radius(600.0, 1.0));
        assert_eq!(p.velocity.y, vy_integrated * -0.8);
        assert_eq!(p.velocity.x, vx_integrated * FLOOR_RESISTANCE);
    }

    #[test]
    fn cull_boundary_is_exclusive() {
        let bound = 1.0 + screen_radius(321.0, 1.0) * 2.0;

        let mut sim = Simulation::new();
        sim.particles.push(resting(bound - 1e-6, 0.5));
        sim.particles.push(resting(-(bound + 1e-6), 0.5));
        sim.particles.push(resting(bound, 0.5));

        sim.step(321.0, 1.0);

        assert_eq!(sim.len(), 1);
        assert!(sim.particles[0].position.x < bound);
    }

    #[test]
    fn offscreen_click_is_culled_next_step() {
        // Mirrors clicking once on screen and once far outside a 100x100 CSS
        // canvas with a 200px backing store at pixel ratio 2.
        let mut sim = Simulation::new();
        let on = to_ndc(10.0, 10.0, 100.0, 100.0);
        let off = to_ndc(10_000.0, 10.0, 100.0, 100.0);
        sim.spawn_at(on.x, on.y);
        sim.spawn_at(off.x, off.y);

        sim.step(200.0, 2.0);

        assert_eq!(sim.len(), 1);
        assert!((sim.particles[0].position.x - on.x).abs() < 0.01);
    }

    #[test]
    fn step_on_empty_collection_is_a_noop() {
        let mut sim = Simulation::new();
        sim.step(321.0, 1.0);
        assert!(sim.is_empty());
    }

    #[test]
    fn empty_collection_packs_to_nothing() {
        assert_eq!(Simulation::new().packed_positions(), None);
    }

    #[test]
    fn positions_pack_in_iteration_order() {
        let mut sim = Simulation::new();
        sim.particles.push(resting(0.25, -0.5));
        sim.particles.push(resting(-0.75, 1.0));

        assert_eq!(sim.packed_positions().unwrap(), vec![0.25, -0.5, -0.75, 1.0]);
    }

    #[test]
    fn identical_particles_stay_identical() {
        // Particles only interact with the fixed environment, never with
        // each other, so twins must track exactly through many bounces.
        let mut sim = Simulation::new();
        sim.particles.push(resting(0.1, 0.2));
        sim.particles.push(resting(0.1, 0.2));

        for _ in 0..240 {
            sim.step(321.0, 1.0);
        }

        assert_eq!(sim.len(), 2);
        assert_eq!(sim.particles[0], sim.particles[1]);
    }

    #[test]
    fn pointer_to_ndc_matches_css_dimensions() {
        let p = to_ndc(234.0, 456.0, 123.0, 321.0);
        assert_eq!(p.x, 2.8048780487804876);
        assert_eq!(p.y, -1.8411214953271027);
    }

    #[test]
    fn resize_scales_by_device_pixel_ratio() {
        assert_eq!(backing_size(123.0, 321.0, 2.0), (246, 642));
    }

    #[test]
    fn seed_places_particles_at_origin() {
        let mut sim = Simulation::new();
        sim.seed(3);

        assert_eq!(sim.len(), 3);
        for p in sim.particles() {
            assert_eq!(p.position, Vec2::default());
        }
    }
}
