//! Quadratic air drag. Grounded on `WorldBAirResistanceCalculator.cpp`:
//! `F = -k * |v| * v`, skipped for empty/wall cells and near-zero velocity.

use crate::cell::Cell;
use crate::vector::{Vec2, Vec2Ext};

/// Default drag coefficient `k` (§4.7).
pub const DEFAULT_AIR_RESISTANCE_SCALAR: f64 = 0.1;

pub fn air_resistance_force(cell: &Cell, k: f64) -> Vec2 {
    if cell.is_empty() || cell.is_wall() {
        return Vec2::ZERO;
    }
    let speed = cell.velocity.magnitude();
    if speed < 1e-6 {
        return Vec2::ZERO;
    }
    cell.velocity.scale(-k * speed)
}
