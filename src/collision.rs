//! Collision classification: a closed tagged enum mapping
//! `(source material, target state, kinetic energy)` onto one of six
//! outcomes. Pure and read-only — applying the outcome is the executor's
//! job.
//!
//! Grounded on `WorldBCollisionCalculator.cpp`.

use crate::grid::Grid;
use crate::material::Material;
use crate::transfer::MoveCandidate;
use crate::vector::{IVec2, Vec2Ext};

/// Energy above which a collision against a brittle material fragments it.
pub const FRAGMENTATION_THRESHOLD: f64 = 15.0;
/// Below this kinetic energy, a rigid-on-rigid collision is treated as
/// inelastic rather than elastic (resolves spec.md's "low-energy
/// rigid-on-rigid" qualifier — see DESIGN.md).
pub const LOW_ENERGY_RIGID_THRESHOLD: f64 = 1.0;
/// Fraction of relative velocity retained after an inelastic collision.
pub const INELASTIC_RESTITUTION_FACTOR: f64 = 0.5;
/// Default combined elasticity factor (`global * per_material`, see
/// Design Notes); individual materials scale this via `Material::elasticity`.
pub const DEFAULT_ELASTICITY_FACTOR: f64 = 0.8;

/// What a move target resolves to, read at classification time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetState {
    OutOfBounds,
    Wall,
    Empty,
    Occupied(Material),
}

/// The outcome of a single candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    EmptyTransfer,
    Elastic,
    Inelastic,
    Absorption,
    Fragmentation,
    BoundaryReflection,
}

/// A move candidate together with its classified outcome and the kinetic
/// energy the classification was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveDescriptor {
    pub candidate: MoveCandidate,
    pub kind: CollisionKind,
    pub energy: f64,
}

fn is_brittle(material: Material) -> bool {
    matches!(material, Material::Leaf | Material::Sand | Material::Dirt)
}

/// Water absorbed by porous ground materials is the only closed absorbent
/// pairing defined by `original_source` (see SPEC_FULL.md §9).
fn is_absorbent_pair(source: Material, target: Material) -> bool {
    matches!(
        (source, target),
        (Material::Water, Material::Dirt) | (Material::Water, Material::Sand)
    )
}

/// Resolves a move target's grid state into a `TargetState`.
pub fn target_state(grid: &Grid, target: IVec2) -> TargetState {
    match grid.try_at(target) {
        None => TargetState::OutOfBounds,
        Some(cell) => {
            if cell.is_wall() {
                TargetState::Wall
            } else if cell.is_empty() {
                TargetState::Empty
            } else {
                TargetState::Occupied(cell.material)
            }
        }
    }
}

/// Classifies a single collision. Pure function of materials, energy, and
/// the caller's fragmentation-energy threshold (`Tunables::fragmentation_threshold`,
/// §6 "Inputs" — defaults to `FRAGMENTATION_THRESHOLD` but is user-settable).
pub fn classify(
    source: Material,
    target: TargetState,
    energy: f64,
    fragmentation_threshold: f64,
) -> CollisionKind {
    match target {
        TargetState::OutOfBounds | TargetState::Wall => CollisionKind::BoundaryReflection,
        TargetState::Empty => CollisionKind::EmptyTransfer,
        TargetState::Occupied(target_material) => {
            let brittle = is_brittle(source) || is_brittle(target_material);
            if energy > fragmentation_threshold && brittle {
                CollisionKind::Fragmentation
            } else if is_absorbent_pair(source, target_material) {
                CollisionKind::Absorption
            } else if source.is_rigid() && target_material.is_rigid() {
                if energy < LOW_ENERGY_RIGID_THRESHOLD {
                    CollisionKind::Inelastic
                } else {
                    CollisionKind::Elastic
                }
            } else {
                CollisionKind::Inelastic
            }
        }
    }
}

fn kinetic_energy(material: Material, fill: f64, velocity: crate::vector::Vec2) -> f64 {
    let mass = material.density() * fill;
    0.5 * mass * velocity.magnitude_squared()
}

/// Classifies a batch of candidates produced by `transfer::detect_transfers`,
/// using the same pre-move grid snapshot they were generated from.
pub fn classify_candidates(
    grid: &Grid,
    candidates: Vec<MoveCandidate>,
    fragmentation_threshold: f64,
) -> Vec<MoveDescriptor> {
    candidates
        .into_iter()
        .map(|candidate| {
            let energy = kinetic_energy(candidate.material, candidate.amount, candidate.source_velocity);
            let state = target_state(grid, candidate.target);
            let kind = classify(candidate.material, state, energy, fragmentation_threshold);
            MoveDescriptor { candidate, kind, energy }
        })
        .collect()
}
