//! Real-time 2D SPH fluid on the CPU.
//!
//! A fixed set of particles is advanced each tick under gravity, pressure
//! forces from a kernel density field, and box collisions. Neighbour search
//! goes through a hashed uniform grid rebuilt every tick, and every
//! per-particle stage runs on the rayon pool.

pub mod config;
pub mod error;
pub mod plugin;
pub mod tie_break;

pub mod cpu {
    pub mod kernels;
    pub mod spatial;
    pub mod sph2d;
}

pub use config::FluidConfig;
pub use cpu::sph2d::{FluidSimulation, ParticleArrays};
pub use error::{FluidError, Result};
pub use plugin::{FluidPlugin, FluidView};
pub use tie_break::{FixedDirection, RandomDirection, TieBreak};
