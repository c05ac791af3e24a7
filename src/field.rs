//! The particle field: spring-damper formation toward glyph targets.
//!
//! Every particle `i` below the target count is *bound* to target `i` and is
//! pulled toward it (plus a small periodic jitter) by a damped spring. Any
//! particles beyond the target count are *unbound* and drift along a gentle
//! per-index orbit instead. The split is decided once, when the field is
//! built, and never changes.
//!
//! ```ignore
//! let targets = glyph::sample("HI", &LayoutConfig::default());
//! let mut field = ParticleField::new(FieldConfig::default().with_seed(7), targets);
//!
//! loop {
//!     field.step(0.01);
//!     renderer.upload_positions(field.positions());
//! }
//! ```

use crate::spawn::SpawnContext;
use crate::visuals::Palette;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Damped spring pulling a bound particle toward its target.
///
/// Stable for `0 < stiffness < 1` and `0 < damping < 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    pub stiffness: f32,
    pub damping: f32,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 0.12,
            damping: 0.82,
        }
    }
}

/// Periodic offset added to each bound particle's target in x and y.
///
/// Per-index phase offsets keep neighbours from moving in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterParams {
    pub amplitude: f32,
    /// Angular frequency of the x (sin) and y (cos) terms.
    pub frequency: Vec2,
    /// Phase advance per particle index for x and y.
    pub phase: Vec2,
}

impl Default for JitterParams {
    fn default() -> Self {
        Self {
            amplitude: 0.02,
            frequency: Vec2::new(1.2, 1.1),
            phase: Vec2::new(0.07, 0.09),
        }
    }
}

impl JitterParams {
    /// Offset of bound particle `index` at clock `t`.
    ///
    /// Phases are formed in `f64`; only the final unit-range terms are
    /// narrowed.
    #[inline]
    fn offset(&self, t: f64, index: usize) -> Vec3 {
        let i = index as f64;
        let fx = t * self.frequency.x as f64 + i * self.phase.x as f64;
        let fy = t * self.frequency.y as f64 + i * self.phase.y as f64;
        Vec3::new(fx.sin() as f32, fy.cos() as f32, 0.0) * self.amplitude
    }
}

/// Idle drift for unbound particles.
///
/// Each frame a particle moves by
/// `(sin(t + i*phase.x), cos(t + i*phase.y), sin(t + i*phase.z)) * r * gain`
/// with `r = base_radius + (i mod radius_levels) * radius_step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleOrbit {
    pub base_radius: f32,
    pub radius_step: f32,
    pub radius_levels: u32,
    pub gain: f32,
    pub phase: Vec3,
}

impl Default for IdleOrbit {
    fn default() -> Self {
        Self {
            base_radius: 0.2,
            radius_step: 0.002,
            radius_levels: 50,
            gain: 0.01,
            phase: Vec3::new(0.05, 0.04, 0.03),
        }
    }
}

impl IdleOrbit {
    /// Displacement of unbound particle `index` for one frame at clock `t`.
    #[inline]
    pub fn displacement(&self, t: f64, index: usize) -> Vec3 {
        let level = index % self.radius_levels.max(1) as usize;
        let r = self.base_radius + level as f32 * self.radius_step;
        let i = index as f64;
        Vec3::new(
            (t + i * self.phase.x as f64).sin() as f32,
            (t + i * self.phase.y as f64).cos() as f32,
            (t + i * self.phase.z as f64).sin() as f32,
        ) * (r * self.gain)
    }
}

/// Configuration for a [`ParticleField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: usize,
    /// Half-size of the cube initial positions are scattered in.
    pub spawn_half_extent: f32,
    pub spring: SpringParams,
    pub jitter: JitterParams,
    pub idle: IdleOrbit,
    pub palette: Palette,
    /// Seed for scatter and colors. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 14_000,
            spawn_half_extent: 10.0,
            spring: SpringParams::default(),
            jitter: JitterParams::default(),
            idle: IdleOrbit::default(),
            palette: Palette::default(),
            seed: None,
        }
    }
}

impl FieldConfig {
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_spawn_half_extent(mut self, half_extent: f32) -> Self {
        self.spawn_half_extent = half_extent;
        self
    }

    pub fn with_spring(mut self, stiffness: f32, damping: f32) -> Self {
        self.spring = SpringParams { stiffness, damping };
        self
    }

    pub fn with_jitter_amplitude(mut self, amplitude: f32) -> Self {
        self.jitter.amplitude = amplitude;
        self
    }

    pub fn with_idle_orbit(mut self, idle: IdleOrbit) -> Self {
        self.idle = idle;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// How a particle moves for the lifetime of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleMode {
    /// Springs toward the target with the same index.
    Bound,
    /// No target; follows the idle orbit.
    Unbound,
}

/// One semi-implicit Euler step of the damped spring.
#[inline]
fn spring_step(position: &mut Vec3, velocity: &mut Vec3, target: Vec3, spring: SpringParams) {
    *velocity += (target - *position) * spring.stiffness;
    *velocity *= spring.damping;
    *position += *velocity;
}

/// Fixed-size particle state driven toward glyph targets.
///
/// Positions, velocities and colors are parallel buffers indexed by particle
/// id; they are never reordered.
pub struct ParticleField {
    config: FieldConfig,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    colors: Vec<Vec3>,
    targets: Vec<Vec3>,
    bound: usize,
    time: f64,
    spawn: SpawnContext,
}

impl ParticleField {
    /// Scatter `config.particle_count` particles and bind them to `targets`.
    ///
    /// Targets beyond the particle count are kept but never used.
    pub fn new(config: FieldConfig, targets: Vec<Vec3>) -> Self {
        let count = config.particle_count;
        let mut ctx = SpawnContext::new(config.seed, config.spawn_half_extent);

        let positions: Vec<Vec3> = (0..count).map(|_| ctx.random_in_bounds()).collect();
        let colors: Vec<Vec3> = (0..count).map(|_| ctx.pick_color(&config.palette)).collect();
        let bound = targets.len().min(count);

        log::debug!(
            "particle field: {} particles, {} targets, {} bound, {} idle",
            count,
            targets.len(),
            bound,
            count - bound
        );
        if targets.len() > count {
            log::debug!("{} targets left without a particle", targets.len() - count);
        }

        Self {
            positions,
            velocities: vec![Vec3::ZERO; count],
            colors,
            targets,
            bound,
            time: 0.0,
            spawn: ctx,
            config,
        }
    }

    /// Advance the animation clock by `dt` and move every particle one frame.
    pub fn step(&mut self, dt: f64) {
        self.time += dt;
        let t = self.time;
        let spring = self.config.spring;
        let jitter = self.config.jitter;
        let idle = self.config.idle;
        let bound = self.bound;

        let (bound_pos, idle_pos) = self.positions.split_at_mut(bound);
        let bound_vel = &mut self.velocities[..bound];
        let targets = &self.targets[..bound];

        #[cfg(feature = "parallel")]
        {
            bound_pos
                .par_iter_mut()
                .zip(bound_vel.par_iter_mut())
                .zip(targets.par_iter())
                .enumerate()
                .for_each(|(i, ((p, v), target))| {
                    spring_step(p, v, *target + jitter.offset(t, i), spring);
                });
            idle_pos.par_iter_mut().enumerate().for_each(|(k, p)| {
                *p += idle.displacement(t, bound + k);
            });
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (i, ((p, v), target)) in bound_pos
                .iter_mut()
                .zip(bound_vel.iter_mut())
                .zip(targets)
                .enumerate()
            {
                spring_step(p, v, *target + jitter.offset(t, i), spring);
            }
            for (k, p) in idle_pos.iter_mut().enumerate() {
                *p += idle.displacement(t, bound + k);
            }
        }
    }

    /// Current positions, one per particle.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Per-particle colors, fixed at creation.
    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// All targets the field was built with, including unused ones.
    #[inline]
    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of bound particles, `min(targets, particles)`.
    #[inline]
    pub fn bound_count(&self) -> usize {
        self.bound
    }

    /// Mode of particle `index`, or `None` past the end.
    pub fn mode(&self, index: usize) -> Option<ParticleMode> {
        if index >= self.len() {
            None
        } else if index < self.bound {
            Some(ParticleMode::Bound)
        } else {
            Some(ParticleMode::Unbound)
        }
    }

    /// Animation clock.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Change the target jitter amplitude; 0 lets particles settle exactly.
    pub fn set_jitter_amplitude(&mut self, amplitude: f32) {
        self.config.jitter.amplitude = amplitude;
    }

    /// Scatter particles again and rewind the clock.
    ///
    /// Velocities are zeroed; colors, targets and modes are kept.
    pub fn reset(&mut self) {
        for p in &mut self.positions {
            *p = self.spawn.random_in_bounds();
        }
        self.velocities.fill(Vec3::ZERO);
        self.time = 0.0;
    }

    /// Mean distance from bound particles to their static targets.
    ///
    /// Zero when nothing is bound.
    pub fn residual(&self) -> f32 {
        if self.bound == 0 {
            return 0.0;
        }
        let total: f32 = self.positions[..self.bound]
            .iter()
            .zip(&self.targets[..self.bound])
            .map(|(p, t)| p.distance(*t))
            .sum();
        total / self.bound as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(n: usize) -> Vec<Vec3> {
        (0..n)
            .map(|i| Vec3::new(i as f32 * 0.1 - 0.2, (i % 3) as f32 * 0.1, 0.005))
            .collect()
    }

    fn config(count: usize) -> FieldConfig {
        FieldConfig::default().with_particle_count(count).with_seed(42)
    }

    #[test]
    fn test_initial_state() {
        let field = ParticleField::new(config(100), targets(10));
        assert_eq!(field.len(), 100);
        assert!(field.velocities().iter().all(|v| *v == Vec3::ZERO));
        assert!(field.positions().iter().all(|p| p.abs().max_element() < 10.0));
        let palette = Palette::Birthday;
        assert!(field.colors().iter().all(|c| palette.colors().contains(c)));
        assert_eq!(field.time(), 0.0);
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = ParticleField::new(config(50), targets(5));
        let b = ParticleField::new(config(50), targets(5));
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.colors(), b.colors());
    }

    #[test]
    fn test_mode_assignment_fewer_targets() {
        let field = ParticleField::new(config(10), targets(4));
        assert_eq!(field.bound_count(), 4);
        for i in 0..4 {
            assert_eq!(field.mode(i), Some(ParticleMode::Bound));
        }
        for i in 4..10 {
            assert_eq!(field.mode(i), Some(ParticleMode::Unbound));
        }
        assert_eq!(field.mode(10), None);
    }

    #[test]
    fn test_mode_assignment_more_targets() {
        let field = ParticleField::new(config(10), targets(25));
        assert_eq!(field.bound_count(), 10);
        assert_eq!(field.targets().len(), 25);
        assert!((0..10).all(|i| field.mode(i) == Some(ParticleMode::Bound)));
    }

    #[test]
    fn test_one_step_bound_vs_unbound() {
        let mut field = ParticleField::new(config(10), targets(4));
        let before = field.positions().to_vec();
        field.step(0.01);

        let spring = field.config().spring;
        let jitter = field.config().jitter;
        for i in 0..4 {
            let target = field.targets()[i] + jitter.offset(0.01, i);
            let expected_v = (target - before[i]) * spring.stiffness * spring.damping;
            assert!(field.velocities()[i].abs_diff_eq(expected_v, 1e-5));
            assert!(field.velocities()[i].length() > 0.0);
        }

        let idle = field.config().idle;
        for i in 4..10 {
            assert_eq!(field.velocities()[i], Vec3::ZERO);
            let expected = before[i] + idle.displacement(0.01, i);
            assert!(field.positions()[i].abs_diff_eq(expected, 1e-6));
        }
    }

    #[test]
    fn test_unbound_particles_ignore_targets() {
        // Same scatter, different target values: idle particles must match.
        let mut a = ParticleField::new(config(10), targets(4));
        let far: Vec<Vec3> = targets(4).iter().map(|t| *t + Vec3::splat(100.0)).collect();
        let mut b = ParticleField::new(config(10), far);
        for _ in 0..20 {
            a.step(0.01);
            b.step(0.01);
        }
        assert_eq!(&a.positions()[4..], &b.positions()[4..]);
        assert_ne!(&a.positions()[..4], &b.positions()[..4]);
    }

    #[test]
    fn test_converges_without_jitter() {
        let mut field = ParticleField::new(config(200), targets(200));
        field.set_jitter_amplitude(0.0);
        for _ in 0..500 {
            field.step(0.01);
        }
        for (p, t) in field.positions().iter().zip(field.targets()) {
            assert!(p.distance(*t) < 1e-3, "{:?} vs {:?}", p, t);
        }
        assert!(field.residual() < 1e-3);
    }

    #[test]
    fn test_jitter_keeps_particles_near_target() {
        let mut field = ParticleField::new(config(50), targets(50));
        for _ in 0..2000 {
            field.step(0.01);
        }
        // jitter moves the target by at most amplitude * sqrt(2)
        let limit = field.config().jitter.amplitude * 2.0;
        for (p, t) in field.positions().iter().zip(field.targets()) {
            assert!(p.distance(*t) < limit);
        }
    }

    #[test]
    fn test_no_explosion_over_long_runs() {
        for &(stiffness, damping) in &[(0.12, 0.82), (0.9, 0.99), (0.01, 0.1), (0.99, 0.5)] {
            let cfg = config(64).with_spring(stiffness, damping);
            let mut field = ParticleField::new(cfg, targets(32));
            for _ in 0..20_000 {
                field.step(0.01);
            }
            for (p, v) in field.positions().iter().zip(field.velocities()) {
                assert!(p.is_finite() && v.is_finite());
                assert!(v.length() < 50.0, "velocity {:?} with k={} d={}", v, stiffness, damping);
            }
            // idle drift is periodic in the clock, so it stays within a bounded shell
            assert!(field.positions().iter().all(|p| p.length() < 100.0));
        }
    }

    #[test]
    fn test_no_targets_means_all_idle() {
        let mut field = ParticleField::new(config(20), Vec::new());
        assert_eq!(field.bound_count(), 0);
        assert_eq!(field.residual(), 0.0);
        field.step(0.01);
        assert!(field.velocities().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn test_empty_field_steps() {
        let mut field = ParticleField::new(config(0), targets(3));
        assert!(field.is_empty());
        field.step(0.01);
        assert_eq!(field.bound_count(), 0);
    }

    #[test]
    fn test_reset_rescatters_and_rewinds() {
        let mut field = ParticleField::new(config(30), targets(30));
        let colors = field.colors().to_vec();
        for _ in 0..10 {
            field.step(0.01);
        }
        let settled = field.positions().to_vec();
        field.reset();
        assert_eq!(field.time(), 0.0);
        assert!(field.velocities().iter().all(|v| *v == Vec3::ZERO));
        assert_ne!(field.positions(), settled.as_slice());
        assert_eq!(field.colors(), colors.as_slice());
        assert!(field.positions().iter().all(|p| p.abs().max_element() < 10.0));
    }

    #[test]
    fn test_idle_radius_cycles_by_index() {
        let idle = IdleOrbit::default();
        let a = idle.displacement(0.0, 0);
        let b = idle.displacement(0.0, 50);
        // same radius level, different phase
        assert!((a.y - 0.2 * 0.01).abs() < 1e-7);
        assert!(b.length() <= (0.2 * 0.01) * 3f32.sqrt() + 1e-6);
    }

    #[test]
    fn test_clock_keeps_advancing_after_long_uptime() {
        // 2^18 is where an f32 clock stops resolving a 0.01 step
        let mut field = ParticleField::new(config(8), targets(4));
        field.step(262_144.0);
        let start_time = field.time();
        let start = field.positions().to_vec();

        for _ in 0..100_000 {
            field.step(0.01);
        }
        assert!((field.time() - start_time - 1_000.0).abs() < 1e-4);

        // idle drift sums a sinusoid over an advancing phase, so it stays bounded
        for i in field.bound_count()..field.len() {
            let drift = field.positions()[i].distance(start[i]);
            assert!(drift < 1.0, "particle {} drifted {}", i, drift);
        }
    }

    #[test]
    fn test_phase_resolves_small_steps_at_large_clock() {
        let idle = IdleOrbit::default();
        let a = idle.displacement(262_144.0, 7);
        let b = idle.displacement(262_144.01, 7);
        assert_ne!(a, b);

        let jitter = JitterParams::default();
        assert_ne!(jitter.offset(1.0e6, 3), jitter.offset(1.0e6 + 0.01, 3));
    }
}
