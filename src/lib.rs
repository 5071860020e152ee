//! Grid-based, cell-averaged, multi-material physics core.
//!
//! A fixed-size lattice of cells, each holding one material at a fractional
//! fill and a sub-cell center of mass, advanced one tick at a time by
//! [`scheduler::Scheduler`]. See `SPEC_FULL.md` for the full design.

pub mod air_resistance;
pub mod cell;
pub mod cohesion;
pub mod collision;
pub mod error;
pub mod executor;
pub mod grid;
pub mod material;
pub mod pressure;
pub mod scheduler;
pub mod support;
pub mod transfer;
pub mod vector;

#[cfg(feature = "serde")]
pub mod snapshot;

pub use cell::Cell;
pub use error::PhysicsError;
pub use grid::Grid;
pub use material::Material;
pub use scheduler::{GrowthCommand, Scheduler, Stats, TunableValue, Tunables};
pub use vector::{IVec2, IVec2Ext, Vec2, Vec2Ext};
