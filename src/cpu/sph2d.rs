// smoothed particle hydrodynamics in 2D (CPU, rayon)
use bevy::prelude::Resource;
use glam::Vec2;
use rayon::prelude::*;

use crate::config::FluidConfig;
use crate::cpu::kernels::{smoothing_kernel, smoothing_kernel_derivative};
use crate::cpu::spatial::SpatialLookup;
use crate::error::{FluidError, Result};
use crate::tie_break::{FixedDirection, RandomDirection, TieBreak};

/// Look-ahead used for predicted positions, independent of the frame `dt`.
pub const PREDICTION_STEP: f32 = 1.0 / 120.0;

/// Struct-of-arrays particle storage; index `i` is the same particle in every array.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleArrays {
    pub position: Vec<Vec2>,
    pub predicted: Vec<Vec2>,
    pub velocity: Vec<Vec2>,
    pub density: Vec<f32>,
}

impl ParticleArrays {
    /// `n` particles at rest in a block centred on the origin, filled row by
    /// row with `ceil(sqrt(n))` columns.
    pub fn grid_layout(n: usize, spacing: f32) -> Self {
        let mut cols = (n as f64).sqrt() as usize;
        while cols * cols < n {
            cols += 1;
        }
        let cols = cols.max(1);
        let rows = n.div_ceil(cols);

        let position: Vec<Vec2> = (0..n)
            .map(|i| {
                let x = ((i % cols) as f32 - cols as f32 / 2.0 + 0.5) * spacing;
                let y = ((i / cols) as f32 - rows as f32 / 2.0 + 0.5) * spacing;
                Vec2::new(x, y)
            })
            .collect();

        Self {
            predicted: position.clone(),
            velocity: vec![Vec2::ZERO; n],
            density: vec![0.0; n],
            position,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// Kernel-weighted count of predicted positions around `point`.
pub fn compute_density(
    point: Vec2,
    predicted: &[Vec2],
    lookup: &SpatialLookup,
    radius: f32,
) -> f32 {
    lookup
        .neighbors_of_point(point, radius)
        .map(|j| smoothing_kernel(point.distance(predicted[j]), radius))
        .sum()
}

/// Density-to-pressure relation. Pressure is clamped to be non-positive: zero
/// at or below the target density, negative and linear above it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureModel {
    pub target_density: f32,
    pub pressure_multiplier: f32,
}

impl PressureModel {
    pub fn from_config(config: &FluidConfig) -> Self {
        Self {
            target_density: config.target_density,
            pressure_multiplier: config.pressure_multiplier,
        }
    }

    #[inline]
    pub fn density_to_pressure(&self, density: f32) -> f32 {
        (self.target_density - density).min(0.0) * self.pressure_multiplier
    }

    /// Mean pressure of a pair, symmetric in its arguments.
    #[inline]
    pub fn shared_pressure(&self, density_a: f32, density_b: f32) -> f32 {
        (self.density_to_pressure(density_a) + self.density_to_pressure(density_b)) / 2.0
    }
}

/// Pressure force on particle `i` from every other particle in its 3x3 block.
///
/// Coincident pairs use `tie_break` as their direction. Neighbours with zero
/// density contribute nothing.
pub fn compute_pressure_force(
    i: usize,
    predicted: &[Vec2],
    density: &[f32],
    lookup: &SpatialLookup,
    radius: f32,
    model: &PressureModel,
    tie_break: Vec2,
) -> Vec2 {
    let pos_i = predicted[i];
    let rho_i = density[i];
    let mut force = Vec2::ZERO;

    for j in lookup.neighbors_of_point(pos_i, radius) {
        if j == i {
            continue;
        }
        let rho_j = density[j];
        if rho_j == 0.0 {
            continue;
        }
        let offset = pos_i - predicted[j];
        let dist = offset.length();
        let dir = if dist == 0.0 { tie_break } else { offset / dist };
        let slope = smoothing_kernel_derivative(dist, radius);
        let shared = model.shared_pressure(rho_j, rho_i);
        force += shared * slope * dir / rho_j;
    }
    force
}

/// Acceleration from a pressure force, or `None` when the particle has no
/// density to divide by or the result is not finite.
#[inline]
pub fn pressure_acceleration(force: Vec2, density: f32) -> Option<Vec2> {
    if density == 0.0 {
        return None;
    }
    let acc = force / density;
    acc.is_finite().then_some(acc)
}

/// Clamp a particle into `[-half_bounds, half_bounds]`, reflecting and damping
/// the velocity on each axis that crossed a wall.
#[inline]
pub fn resolve_collisions(pos: &mut Vec2, vel: &mut Vec2, half_bounds: Vec2, damping: f32) {
    if pos.x.abs() > half_bounds.x {
        pos.x = half_bounds.x * pos.x.signum();
        vel.x *= -damping;
    }
    if pos.y.abs() > half_bounds.y {
        pos.y = half_bounds.y * pos.y.signum();
        vel.y *= -damping;
    }
}

/// Owns all simulation state and advances it one tick at a time.
#[derive(Resource)]
pub struct FluidSimulation {
    config: FluidConfig,
    pressure: PressureModel,
    particles: ParticleArrays,
    lookup: SpatialLookup,
    tie_break: Box<dyn TieBreak>,
    ticks: u64,
}

impl FluidSimulation {
    /// Validate `config` and lay out the particles. Coincident pairs are
    /// separated along a fixed direction.
    pub fn new(config: FluidConfig) -> Result<Self> {
        Self::with_tie_break(config, FixedDirection::default())
    }

    pub fn with_tie_break(config: FluidConfig, tie_break: impl TieBreak + 'static) -> Result<Self> {
        config.validate()?;
        let n = config.num_particles;
        let particles = ParticleArrays::grid_layout(n, config.spacing());

        tracing::info!(
            particles = n,
            smoothing_radius = config.smoothing_radius,
            bounds = ?config.bounds_size,
            "fluid simulation created"
        );

        Ok(Self {
            pressure: PressureModel::from_config(&config),
            particles,
            lookup: SpatialLookup::new(n),
            tie_break: Box::new(tie_break),
            ticks: 0,
            config,
        })
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    pub fn particles(&self) -> &ParticleArrays {
        &self.particles
    }

    /// Positions after the last tick.
    pub fn positions(&self) -> &[Vec2] {
        &self.particles.position
    }

    pub fn lookup(&self) -> &SpatialLookup {
        &self.lookup
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Back to the initial layout, at rest.
    pub fn reset(&mut self) {
        let n = self.config.num_particles;
        self.particles = ParticleArrays::grid_layout(n, self.config.spacing());
        self.lookup = SpatialLookup::new(n);
        self.ticks = 0;
    }

    /// Advance by `dt` seconds and return the new positions.
    ///
    /// Each stage finishes for every particle before the next one starts.
    pub fn step(&mut self, dt: f32) -> Result<&[Vec2]> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(FluidError::InvalidTimeStep(dt));
        }
        let tie_break = self.tie_break.direction();

        self.predict(dt);
        self.lookup
            .build(&self.particles.predicted, self.config.smoothing_radius);
        self.update_densities();
        let guarded = self.apply_pressure(dt, tie_break);
        if guarded > 0 {
            tracing::warn!(
                tick = self.ticks,
                particles = guarded,
                "zero density or non-finite pressure acceleration, term skipped"
            );
        }
        self.integrate(dt);

        self.ticks += 1;
        tracing::trace!(tick = self.ticks, dt, "step complete");
        Ok(&self.particles.position)
    }

    // gravity, then look ahead
    fn predict(&mut self, dt: f32) {
        let gravity = Vec2::NEG_Y * self.config.gravity * dt;
        let ParticleArrays {
            position,
            predicted,
            velocity,
            ..
        } = &mut self.particles;

        velocity
            .par_iter_mut()
            .zip(predicted.par_iter_mut())
            .zip(position.par_iter())
            .for_each(|((vel, pred), &pos)| {
                *vel += gravity;
                *pred = pos + *vel * PREDICTION_STEP;
            });
    }

    fn update_densities(&mut self) {
        let radius = self.config.smoothing_radius;
        let lookup = &self.lookup;
        let ParticleArrays {
            predicted, density, ..
        } = &mut self.particles;
        let predicted = &*predicted;

        density
            .par_iter_mut()
            .zip(predicted.par_iter())
            .for_each(|(rho, &p)| *rho = compute_density(p, predicted, lookup, radius));
    }

    // returns how many particles had their pressure term dropped
    fn apply_pressure(&mut self, dt: f32, tie_break: Vec2) -> usize {
        let radius = self.config.smoothing_radius;
        let model = self.pressure;
        let lookup = &self.lookup;
        let ParticleArrays {
            predicted,
            velocity,
            density,
            ..
        } = &mut self.particles;
        let (predicted, density) = (&*predicted, &*density);

        velocity
            .par_iter_mut()
            .enumerate()
            .map(|(i, vel)| {
                let force =
                    compute_pressure_force(i, predicted, density, lookup, radius, &model, tie_break);
                match pressure_acceleration(force, density[i]) {
                    Some(acc) => {
                        *vel += acc * dt;
                        0_usize
                    }
                    None => 1_usize,
                }
            })
            .sum()
    }

    fn integrate(&mut self, dt: f32) {
        let half_bounds = self.config.half_bounds();
        let damping = self.config.collision_damping;
        let ParticleArrays {
            position, velocity, ..
        } = &mut self.particles;

        position
            .par_iter_mut()
            .zip(velocity.par_iter_mut())
            .for_each(|(pos, vel)| {
                *pos += *vel * dt;
                resolve_collisions(pos, vel, half_bounds, damping);
            });
    }

    // demo function ----------------------------------------------
    pub fn demo_block_5k() -> Result<Self> {
        Self::with_tie_break(FluidConfig::demo_block_5k(), RandomDirection::seeded(0))
    }
    // ------------------------------------------------------------
}
