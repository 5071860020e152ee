//! Dual pressure model: hydrostatic (weight-of-material-above) and dynamic
//! (accumulated energy from blocked transfers, decaying over time).
//!
//! Grounded on `WorldBPressureCalculator.cpp`. The `HYDROSTATIC_MULTIPLIER`
//! fixed scale on the hydrostatic force term (distinct from the caller's
//! `pressure_scale` tunable) resolves spec.md's silence on the precise force
//! magnitude, per `SPEC_FULL.md` §4.8.

use crate::grid::Grid;
use crate::vector::{Vec2, Vec2Ext};

pub const SLICE_THICKNESS: f64 = 1.0;
pub const HYDROSTATIC_MULTIPLIER: f64 = 0.002;
pub const DYNAMIC_MULTIPLIER: f64 = 0.1;
pub const DEFAULT_DYNAMIC_ACCUMULATION_RATE: f64 = 0.05;
pub const DEFAULT_DYNAMIC_DECAY_RATE: f64 = 0.02;
pub const MAX_DYNAMIC_PRESSURE: f64 = 10.0;
pub const MIN_PRESSURE_THRESHOLD: f64 = 0.01;

/// One blocked-transfer observation, produced by the move executor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockedTransfer {
    pub source: (u32, u32),
    pub blocked_velocity: Vec2,
    pub energy: f64,
}

/// Recomputes `cell.hydrostatic_pressure` for every cell by sweeping each
/// column along the gravity direction, accumulating `density * |g|` per
/// unit thickness. Empty cells pass the accumulation through unchanged.
pub fn compute_hydrostatic_pressure(grid: &mut Grid, gravity: Vec2) {
    let gravity_magnitude = gravity.magnitude();
    if gravity_magnitude < 1e-4 {
        return;
    }
    for x in 0..grid.width() {
        let mut accumulated = 0.0;
        for y in 0..grid.height() {
            let cell = grid.at_mut(x, y);
            cell.hydrostatic_pressure = accumulated;
            let effective_density = cell.material.density() * cell.fill_ratio;
            if effective_density > crate::cell::FILL_EPSILON {
                accumulated += effective_density * gravity_magnitude * SLICE_THICKNESS;
            }
        }
    }
}

/// Converts each blocked transfer's kinetic energy into dynamic pressure at
/// its source cell, and folds the blocked direction into a mass-weighted
/// running average `pressure_gradient`.
pub fn accumulate_dynamic_pressure(grid: &mut Grid, blocked: &[BlockedTransfer], accumulation_rate: f64) {
    for transfer in blocked {
        let (x, y) = transfer.source;
        if !grid.in_bounds(x, y) {
            continue;
        }
        let cell = grid.at_mut(x, y);
        let current_pressure = cell.dynamic_pressure;
        let new_pressure =
            (current_pressure + transfer.energy * accumulation_rate).min(MAX_DYNAMIC_PRESSURE);
        cell.dynamic_pressure = new_pressure;

        let blocked_direction = transfer.blocked_velocity.normalize_or_zero();
        let denom = current_pressure + transfer.energy;
        let new_gradient = if denom > 1e-9 {
            (cell.pressure_gradient * current_pressure + blocked_direction * transfer.energy) / denom
        } else {
            blocked_direction
        };
        cell.pressure_gradient = new_gradient.normalize_or_zero();
    }
}

/// Decays every cell's dynamic pressure by `(1 - decay_rate * dt)`.
pub fn decay_dynamic_pressure(grid: &mut Grid, decay_rate: f64, dt: f64) {
    for ((_, _), cell) in grid.iter_row_major_mut() {
        if cell.dynamic_pressure > MIN_PRESSURE_THRESHOLD {
            cell.dynamic_pressure *= (1.0 - decay_rate * dt).max(0.0);
        } else {
            cell.dynamic_pressure = 0.0;
        }
    }
}

/// Combined pressure force for one cell: hydrostatic (gravity-aligned) plus
/// dynamic (blocked-transfer-gradient-aligned), each weighted by material
/// sensitivity and the overall `pressure_scale`.
pub fn pressure_force(cell: &crate::cell::Cell, gravity: Vec2, pressure_scale: f64) -> Vec2 {
    let gravity_direction = gravity.normalize_or_zero();
    let hydrostatic =
        gravity_direction * (cell.hydrostatic_pressure * HYDROSTATIC_MULTIPLIER);
    let dynamic = cell.pressure_gradient * (cell.dynamic_pressure * DYNAMIC_MULTIPLIER);

    let hydro_weight = cell.material.hydrostatic_weight();
    let dyn_weight = cell.material.dynamic_weight();

    (hydrostatic * hydro_weight + dynamic * dyn_weight) * pressure_scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn topmost_water_cell_has_zero_hydrostatic_pressure() {
        let mut grid = Grid::new(1, 3);
        for y in 0..3 {
            grid.at_mut(0, y).set(Material::Water, 1.0);
        }
        compute_hydrostatic_pressure(&mut grid, Vec2::new(0.0, 9.81));
        assert_eq!(grid.at(0, 0).hydrostatic_pressure, 0.0);
    }

    #[test]
    fn hydrostatic_pressure_increases_strictly_with_depth() {
        let mut grid = Grid::new(1, 3);
        for y in 0..3 {
            grid.at_mut(0, y).set(Material::Water, 1.0);
        }
        compute_hydrostatic_pressure(&mut grid, Vec2::new(0.0, 9.81));
        let p0 = grid.at(0, 0).hydrostatic_pressure;
        let p1 = grid.at(0, 1).hydrostatic_pressure;
        let p2 = grid.at(0, 2).hydrostatic_pressure;
        assert!(p0 < p1);
        assert!(p1 < p2);
        let expected_p1 = Material::Water.density() * 9.81;
        assert!((p1 - expected_p1).abs() < 1e-9);
        assert!((p2 - 2.0 * expected_p1).abs() < 1e-9);
    }

    #[test]
    fn zero_gravity_produces_no_hydrostatic_pressure() {
        let mut grid = Grid::new(1, 2);
        grid.at_mut(0, 0).set(Material::Water, 1.0);
        grid.at_mut(0, 1).set(Material::Water, 1.0);
        compute_hydrostatic_pressure(&mut grid, Vec2::ZERO);
        assert_eq!(grid.at(0, 1).hydrostatic_pressure, 0.0);
    }

    #[test]
    fn blocked_transfer_builds_positive_dynamic_pressure_and_gradient() {
        let mut grid = Grid::new(1, 1);
        grid.at_mut(0, 0).set(Material::Water, 1.0);
        let blocked = vec![BlockedTransfer {
            source: (0, 0),
            blocked_velocity: Vec2::new(5.0, 0.0),
            energy: 4.0,
        }];
        accumulate_dynamic_pressure(&mut grid, &blocked, DEFAULT_DYNAMIC_ACCUMULATION_RATE);
        let cell = grid.at(0, 0);
        assert!(cell.dynamic_pressure > 0.0);
        assert!(cell.pressure_gradient.x > 0.0);
    }

    #[test]
    fn dynamic_pressure_decays_monotonically_toward_zero() {
        let mut grid = Grid::new(1, 1);
        grid.at_mut(0, 0).set(Material::Water, 1.0);
        grid.at_mut(0, 0).dynamic_pressure = 5.0;
        let mut last = 5.0;
        for _ in 0..20 {
            decay_dynamic_pressure(&mut grid, DEFAULT_DYNAMIC_DECAY_RATE, 1.0);
            let now = grid.at(0, 0).dynamic_pressure;
            assert!(now <= last);
            last = now;
        }
        assert!(last < 5.0);
    }

    #[test]
    fn dynamic_pressure_caps_at_maximum() {
        let mut grid = Grid::new(1, 1);
        grid.at_mut(0, 0).set(Material::Water, 1.0);
        let blocked = vec![BlockedTransfer {
            source: (0, 0),
            blocked_velocity: Vec2::new(1.0, 0.0),
            energy: 1000.0,
        }];
        accumulate_dynamic_pressure(&mut grid, &blocked, DEFAULT_DYNAMIC_ACCUMULATION_RATE);
        assert!(grid.at(0, 0).dynamic_pressure <= MAX_DYNAMIC_PRESSURE);
    }
}
