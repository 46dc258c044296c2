//! Simulation parameters, supplied once when a [`FluidSimulation`] is built.
//!
//! [`FluidSimulation`]: crate::cpu::sph2d::FluidSimulation

use glam::Vec2;

use crate::error::{FluidError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct FluidConfig {
    pub num_particles: usize,
    /// Downward acceleration magnitude.
    pub gravity: f32,
    /// Particle radius, used for layout spacing and wall clearance.
    pub particle_size: f32,
    /// Fraction of normal velocity kept after a wall bounce.
    pub collision_damping: f32,
    /// Gap between neighbouring particles in the initial layout.
    pub particle_spacing: f32,
    /// Full extent of the box, centred at the origin.
    pub bounds_size: Vec2,
    pub target_density: f32,
    pub pressure_multiplier: f32,
    pub smoothing_radius: f32,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            num_particles: 4,
            gravity: 0.0,
            particle_size: 0.1,
            collision_damping: 0.8,
            particle_spacing: 0.3,
            bounds_size: Vec2::new(20.0, 10.0),
            target_density: 1.0,
            pressure_multiplier: 1.0,
            smoothing_radius: 1.0,
        }
    }
}

impl FluidConfig {
    pub fn with_particles(mut self, num_particles: usize) -> Self {
        self.num_particles = num_particles;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_bounds(mut self, bounds_size: Vec2) -> Self {
        self.bounds_size = bounds_size;
        self
    }

    pub fn with_smoothing_radius(mut self, smoothing_radius: f32) -> Self {
        self.smoothing_radius = smoothing_radius;
        self
    }

    pub fn with_pressure(mut self, target_density: f32, pressure_multiplier: f32) -> Self {
        self.target_density = target_density;
        self.pressure_multiplier = pressure_multiplier;
        self
    }

    /// A 70 x 70 block falling under gravity in a 16 x 9 box.
    pub fn demo_block_5k() -> Self {
        Self {
            num_particles: 4900,
            gravity: 9.81,
            particle_size: 0.04,
            collision_damping: 0.6,
            particle_spacing: 0.04,
            bounds_size: Vec2::new(16.0, 9.0),
            target_density: 60.0,
            pressure_multiplier: 8.0,
            smoothing_radius: 0.35,
        }
    }

    /// Reject any configuration the simulation cannot start from.
    pub fn validate(&self) -> Result<()> {
        if self.num_particles == 0 || u32::try_from(self.num_particles).is_err() {
            return Err(FluidError::InvalidParticleCount(self.num_particles));
        }
        if !self.smoothing_radius.is_finite() || self.smoothing_radius <= 0.0 {
            return Err(FluidError::InvalidSmoothingRadius(self.smoothing_radius));
        }
        if !self.particle_size.is_finite() || self.particle_size <= 0.0 {
            return Err(FluidError::InvalidParticleSize(self.particle_size));
        }

        let scalars = [
            ("gravity", self.gravity),
            ("collision_damping", self.collision_damping),
            ("particle_spacing", self.particle_spacing),
            ("target_density", self.target_density),
            ("pressure_multiplier", self.pressure_multiplier),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(FluidError::NonFiniteParameter { name, value });
            }
        }

        let min_extent = 2.0 * self.particle_size;
        if !self.bounds_size.is_finite()
            || self.bounds_size.x <= min_extent
            || self.bounds_size.y <= min_extent
        {
            return Err(FluidError::InvalidBounds {
                width: self.bounds_size.x,
                height: self.bounds_size.y,
                particle_size: self.particle_size,
            });
        }
        Ok(())
    }

    /// Largest absolute coordinate a particle centre may reach on each axis.
    #[inline]
    pub fn half_bounds(&self) -> Vec2 {
        self.bounds_size * 0.5 - Vec2::splat(self.particle_size)
    }

    /// Centre-to-centre distance in the initial layout.
    #[inline]
    pub fn spacing(&self) -> f32 {
        self.particle_size * 2.0 + self.particle_spacing
    }
}
