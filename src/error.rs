use thiserror::Error;

pub type Result<T> = std::result::Result<T, FluidError>;

/// Errors raised while configuring or stepping a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    #[error("particle count must be in 1..=u32::MAX, got {0}")]
    InvalidParticleCount(usize),

    #[error("smoothing radius must be finite and positive, got {0}")]
    InvalidSmoothingRadius(f32),

    #[error("particle size must be finite and positive, got {0}")]
    InvalidParticleSize(f32),

    #[error("bounds {width}x{height} cannot hold particles of size {particle_size}")]
    InvalidBounds {
        width: f32,
        height: f32,
        particle_size: f32,
    },

    #[error("parameter `{name}` must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f32 },

    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f32),
}
