//! Move execution: the only phase that mutates the grid via transfers.
//! Consumes a classified, shuffled move queue and re-reads live cell state
//! per move, since earlier moves in the same tick can change what a later
//! move actually sees.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cell::FILL_EPSILON;
use crate::collision::{CollisionKind, MoveDescriptor, INELASTIC_RESTITUTION_FACTOR};
use crate::grid::Grid;
use crate::material::Material;
use crate::pressure::BlockedTransfer;
use crate::vector::{Vec2, Vec2Ext};

/// Combined elasticity applied to a boundary-reflection bounce:
/// `global_elasticity_factor * material.elasticity()`.
fn effective_elasticity(global_factor: f64, material: Material) -> f64 {
    global_factor * material.elasticity()
}

/// Shuffles the move queue in place so that execution order within a tick
/// carries no positional bias (spec.md §4.12).
pub fn shuffle_queue<R: Rng + ?Sized>(queue: &mut [MoveDescriptor], rng: &mut R) {
    queue.shuffle(rng);
}

/// Executes one classified move against the live grid, mutating cells and
/// appending a `BlockedTransfer` record when a move is fully or partially
/// blocked. Returns the mass actually transferred.
pub fn execute_move(
    grid: &mut Grid,
    descriptor: &MoveDescriptor,
    global_elasticity_factor: f64,
    fragmentation_threshold: f64,
    blocked_out: &mut Vec<BlockedTransfer>,
) -> f64 {
    let (sx, sy) = descriptor.candidate.source;
    if grid.at(sx, sy).material != descriptor.candidate.material
        || grid.at(sx, sy).fill_ratio <= FILL_EPSILON
    {
        // Source already consumed by an earlier move this tick.
        return 0.0;
    }

    match descriptor.kind {
        CollisionKind::BoundaryReflection => {
            reflect(grid, sx, sy, descriptor, global_elasticity_factor);
            0.0
        }
        CollisionKind::EmptyTransfer => transfer_into(grid, sx, sy, descriptor, blocked_out),
        CollisionKind::Absorption => absorb(grid, sx, sy, descriptor),
        CollisionKind::Elastic => {
            let elasticity = effective_elasticity(global_elasticity_factor, grid.at(sx, sy).material);
            exchange_collision_velocities(grid, sx, sy, descriptor, elasticity);
            let moved = transfer_into(grid, sx, sy, descriptor, blocked_out);
            if moved <= 0.0 {
                bounce_in_place(grid, sx, sy, descriptor, global_elasticity_factor);
            }
            moved
        }
        CollisionKind::Inelastic => {
            exchange_collision_velocities(grid, sx, sy, descriptor, INELASTIC_RESTITUTION_FACTOR);
            let moved = transfer_into(grid, sx, sy, descriptor, blocked_out);
            if moved <= 0.0 {
                damp_in_place(grid, sx, sy);
            }
            moved
        }
        CollisionKind::Fragmentation => {
            fragment(grid, sx, sy, descriptor, fragmentation_threshold, blocked_out)
        }
    }
}

/// Attempts to move `min(requested, source.fill, 1 - target.fill)` worth of
/// material from source to target, carrying COM/velocity along.
///
/// Probes the target on a copy first and only removes from the source the
/// amount the target actually accepts — `Cell::add_material` rejects a
/// mismatched material outright, and committing the source removal before
/// that check would destroy mass whenever a move lands on an occupied cell
/// of a different material (spec.md §8's conservation invariant).
fn transfer_into(
    grid: &mut Grid,
    sx: u32,
    sy: u32,
    descriptor: &MoveDescriptor,
    blocked_out: &mut Vec<BlockedTransfer>,
) -> f64 {
    let target = descriptor.candidate.target;
    let tx = target.x as u32;
    let ty = target.y as u32;

    let requested = descriptor.candidate.amount.min(grid.at(sx, sy).fill_ratio);
    let material = descriptor.candidate.material;

    let mut probe = *grid.at(tx, ty);
    let accepted = probe.add_material(material, requested);

    if accepted <= FILL_EPSILON {
        blocked_out.push(BlockedTransfer {
            source: (sx, sy),
            blocked_velocity: descriptor.candidate.source_velocity,
            energy: descriptor.energy,
        });
        return 0.0;
    }

    let velocity = grid.at(sx, sy).velocity;
    let projected_com = descriptor.candidate.projected_com;

    grid.at_mut(sx, sy).remove_material(accepted);
    probe.com = projected_com;
    probe.velocity = velocity;
    probe.clamp_com();
    *grid.at_mut(tx, ty) = probe;
    accepted
}

/// One-dimensional momentum exchange along the collision normal, updating
/// both the source's and the target's velocity: spec.md §4.12 step 4, after
/// `WorldB.cpp`'s `newVel = (fromCell.v*fromMass + toCell.v*toMass) /
/// (fromMass+toMass)`. `elasticity` interpolates between the fully inelastic
/// common velocity (`0.0`) and the full elastic exchange (`1.0`); tangential
/// velocity components are left untouched.
fn exchange_collision_velocities(
    grid: &mut Grid,
    sx: u32,
    sy: u32,
    descriptor: &MoveDescriptor,
    elasticity: f64,
) {
    let target = descriptor.candidate.target;
    let (tx, ty) = (target.x as u32, target.y as u32);
    if !grid.in_bounds(tx, ty) {
        return;
    }
    let normal = normal_for(descriptor);
    if normal == Vec2::ZERO {
        return;
    }

    let source = *grid.at(sx, sy);
    let target_cell = *grid.at(tx, ty);

    let m1 = (source.material.density() * source.fill_ratio).max(FILL_EPSILON);
    let m2 = (target_cell.material.density() * target_cell.fill_ratio).max(FILL_EPSILON);

    let v1n = source.velocity.dot(normal);
    let v2n = target_cell.velocity.dot(normal);
    let v1t = source.velocity - normal.scale(v1n);
    let v2t = target_cell.velocity - normal.scale(v2n);

    let common = (m1 * v1n + m2 * v2n) / (m1 + m2);
    let elastic_v1n = ((m1 - m2) * v1n + 2.0 * m2 * v2n) / (m1 + m2);
    let elastic_v2n = ((m2 - m1) * v2n + 2.0 * m1 * v1n) / (m1 + m2);

    let new_v1n = common + elasticity * (elastic_v1n - common);
    let new_v2n = common + elasticity * (elastic_v2n - common);

    grid.at_mut(sx, sy).velocity = v1t + normal.scale(new_v1n);
    grid.at_mut(tx, ty).velocity = v2t + normal.scale(new_v2n);
}

/// Porous materials absorb the incoming fluid rather than taking on its
/// material tag: the absorbed amount is removed from the source and added
/// 1:1 to the target's existing fill, capped at capacity — spec.md §4.11
/// and §8 scenario 3 both require the target to gain exactly what the
/// source loses, not a fraction of it.
fn absorb(grid: &mut Grid, sx: u32, sy: u32, descriptor: &MoveDescriptor) -> f64 {
    let target = descriptor.candidate.target;
    let (tx, ty) = (target.x as u32, target.y as u32);

    let requested = descriptor.candidate.amount.min(grid.at(sx, sy).fill_ratio);
    let target_room = (1.0 - grid.at(tx, ty).fill_ratio).max(0.0);
    let amount = requested.min(target_room);
    if amount <= FILL_EPSILON {
        return 0.0;
    }
    grid.at_mut(sx, sy).remove_material(amount);
    let target_cell = grid.at_mut(tx, ty);
    target_cell.fill_ratio = (target_cell.fill_ratio + amount).min(1.0);
    amount
}

/// Reflects velocity and pins COM at the boundary when a move would leave
/// the grid or strike a wall.
fn reflect(
    grid: &mut Grid,
    sx: u32,
    sy: u32,
    descriptor: &MoveDescriptor,
    global_elasticity_factor: f64,
) {
    let cell = grid.at_mut(sx, sy);
    let elasticity = effective_elasticity(global_elasticity_factor, cell.material);
    let normal = normal_for(descriptor);
    cell.velocity = cell.velocity.reflect(normal).scale(elasticity);
    cell.com = cell
        .com
        .clamp_components(-crate::cell::COM_DEFLECTION_THRESHOLD, crate::cell::COM_DEFLECTION_THRESHOLD);
}

fn bounce_in_place(
    grid: &mut Grid,
    sx: u32,
    sy: u32,
    descriptor: &MoveDescriptor,
    global_elasticity_factor: f64,
) {
    reflect(grid, sx, sy, descriptor, global_elasticity_factor);
}

fn damp_in_place(grid: &mut Grid, sx: u32, sy: u32) {
    let cell = grid.at_mut(sx, sy);
    cell.velocity = cell.velocity.scale(crate::collision::INELASTIC_RESTITUTION_FACTOR);
    cell.com = cell
        .com
        .clamp_components(-crate::cell::COM_DEFLECTION_THRESHOLD, crate::cell::COM_DEFLECTION_THRESHOLD);
}

/// High-energy collision against a brittle material: both cells lose fill
/// to Air in proportion to how far the collision energy sits past the
/// fragmentation threshold (spec.md §4.11 — "both cells lose mass to Air in
/// proportion to excess energy"), rather than obliterating the target
/// outright. Losses are recorded by the caller via `Stats::removed_mass`.
fn fragment(
    grid: &mut Grid,
    sx: u32,
    sy: u32,
    descriptor: &MoveDescriptor,
    fragmentation_threshold: f64,
    blocked_out: &mut Vec<BlockedTransfer>,
) -> f64 {
    let target = descriptor.candidate.target;
    let (tx, ty) = (target.x as u32, target.y as u32);

    let excess = (descriptor.energy - fragmentation_threshold).max(0.0);
    let loss_fraction = (excess / fragmentation_threshold).min(1.0);

    let target_loss = grid.at(tx, ty).fill_ratio * loss_fraction;
    grid.at_mut(tx, ty).remove_material(target_loss);

    let source_loss = grid.at(sx, sy).fill_ratio * loss_fraction;
    grid.at_mut(sx, sy).remove_material(source_loss);

    damp_in_place(grid, sx, sy);
    blocked_out.push(BlockedTransfer {
        source: (sx, sy),
        blocked_velocity: descriptor.candidate.source_velocity,
        energy: descriptor.energy,
    });
    // Nothing transfers into the target on fragmentation — both cells lose
    // fill to Air — so this reports no successful move, unlike a transfer.
    0.0
}

fn normal_for(descriptor: &MoveDescriptor) -> Vec2 {
    let (sx, sy) = descriptor.candidate.source;
    let target = descriptor.candidate.target;
    Vec2::new((target.x - sx as i32) as f64, (target.y - sy as i32) as f64).normalize_or_zero()
}
