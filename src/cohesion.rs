//! Cohesion (same-material attraction) and adhesion (cross-material
//! attraction) calculators. Read-only over the grid.
//!
//! Grounded on `WorldBCohesionCalculator.cpp` and
//! `WorldBAdhesionCalculator.cpp`.

use crate::cell::FILL_EPSILON;
use crate::grid::Grid;
use crate::material::Material;
use crate::support::{has_horizontal_support, has_vertical_support};
use crate::vector::{Vec2, Vec2Ext};

/// Minimum cohesion support factor when a cell has neither vertical nor
/// horizontal support.
pub const MIN_SUPPORT_FACTOR: f64 = 0.05;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Strength of cohesive resistance to separation (a scalar, not a force).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohesionResistance {
    pub magnitude: f64,
    pub connected_neighbors: u32,
}

/// Attractive force pulling a cell toward its like-material neighborhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComCohesionForce {
    pub force: Vec2,
    pub connection_count: u32,
}

/// Net cross-material attraction and diagnostics about the strongest
/// contributing neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdhesionForce {
    pub force: Vec2,
    pub contact_count: u32,
    pub strongest_attractor: Material,
}

/// Resistance cohesion: `material.cohesion * same_material_neighbors *
/// self.fill * support_factor`, with a metal-lattice override.
pub fn cohesion_resistance(grid: &Grid, x: u32, y: u32) -> CohesionResistance {
    let cell = grid.at(x, y);
    if cell.is_empty() {
        return CohesionResistance { magnitude: 0.0, connected_neighbors: 0 };
    }

    let mut connected_neighbors = 0u32;
    let mut metal_neighbors = 0u32;
    for (dx, dy) in NEIGHBOR_OFFSETS {
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx < 0 || ny < 0 {
            continue;
        }
        let (nx, ny) = (nx as u32, ny as u32);
        if !grid.in_bounds(nx, ny) {
            continue;
        }
        let neighbor = grid.at(nx, ny);
        if neighbor.material == cell.material && neighbor.fill_ratio > FILL_EPSILON {
            connected_neighbors += 1;
            if cell.material == Material::Metal && neighbor.fill_ratio > 0.5 {
                metal_neighbors += 1;
            }
        }
    }

    let support_factor = if cell.material == Material::Metal && metal_neighbors >= 2 {
        1.0
    } else if has_vertical_support(grid, x, y) {
        1.0
    } else if has_horizontal_support(grid, x, y) {
        0.5
    } else {
        MIN_SUPPORT_FACTOR
    };

    let magnitude =
        cell.material.cohesion() * (connected_neighbors as f64) * cell.fill_ratio * support_factor;

    CohesionResistance { magnitude, connected_neighbors }
}

/// COM-cohesion: pulls a cell toward the fill-weighted centroid of its
/// same-material neighbors within `range` cells.
pub fn com_cohesion_force(grid: &Grid, x: u32, y: u32, range: i32) -> ComCohesionForce {
    let cell = grid.at(x, y);
    if cell.is_empty() {
        return ComCohesionForce { force: Vec2::ZERO, connection_count: 0 };
    }

    let cell_world_pos = Vec2::new(x as f64, y as f64) + cell.com;
    let mut center_sum = Vec2::ZERO;
    let mut total_weight = 0.0;
    let mut connection_count = 0u32;

    for dx in -range..=range {
        for dy in -range..=range {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            let neighbor = grid.at(nx, ny);
            if neighbor.material == cell.material && neighbor.fill_ratio > FILL_EPSILON {
                let neighbor_world_pos = Vec2::new(nx as f64, ny as f64) + neighbor.com;
                let weight = neighbor.fill_ratio;
                center_sum += neighbor_world_pos * weight;
                total_weight += weight;
                connection_count += 1;
            }
        }
    }

    if connection_count == 0 || total_weight < FILL_EPSILON {
        return ComCohesionForce { force: Vec2::ZERO, connection_count: 0 };
    }

    let neighbor_center = center_sum / total_weight;
    let offset = neighbor_center - cell_world_pos;
    let distance = offset.magnitude();
    if distance < 1e-3 {
        return ComCohesionForce { force: Vec2::ZERO, connection_count };
    }

    let direction = offset.normalize_or_zero();
    let distance_factor = distance.min(2.0);
    let side = 2 * range + 1;
    let max_connections = (side * side - 1) as f64;
    let connection_factor = (connection_count as f64) / max_connections;
    let base_cohesion = cell.material.cohesion();
    let mut magnitude = base_cohesion * connection_factor * distance_factor * cell.fill_ratio;
    magnitude = magnitude.min(2.0 * base_cohesion);

    ComCohesionForce { force: direction * magnitude, connection_count }
}

/// Adhesion: cross-material attraction toward different-material neighbors.
pub fn adhesion_force(grid: &Grid, x: u32, y: u32) -> AdhesionForce {
    let cell = grid.at(x, y);
    if cell.is_empty() {
        return AdhesionForce { force: Vec2::ZERO, contact_count: 0, strongest_attractor: Material::Air };
    }

    let mut total_force = Vec2::ZERO;
    let mut contact_count = 0u32;
    let mut strongest_attractor = Material::Air;
    let mut max_adhesion = 0.0;

    for (dx, dy) in NEIGHBOR_OFFSETS {
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx < 0 || ny < 0 {
            continue;
        }
        let (nx, ny) = (nx as u32, ny as u32);
        if !grid.in_bounds(nx, ny) {
            continue;
        }
        let neighbor = grid.at(nx, ny);
        if neighbor.material != cell.material && neighbor.fill_ratio > FILL_EPSILON {
            let mutual_adhesion = (cell.material.adhesion() * neighbor.material.adhesion()).sqrt();
            let direction = Vec2::new(dx as f64, dy as f64).normalize_or_zero();
            let distance_weight = if dx.abs() + dy.abs() == 1 { 1.0 } else { 0.707 };
            let force_strength =
                mutual_adhesion * neighbor.fill_ratio * cell.fill_ratio * distance_weight;

            total_force += direction * force_strength;
            contact_count += 1;
            if mutual_adhesion > max_adhesion {
                max_adhesion = mutual_adhesion;
                strongest_attractor = neighbor.material;
            }
        }
    }

    AdhesionForce { force: total_force, contact_count, strongest_attractor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn empty_cell_has_no_cohesion() {
        let grid = Grid::new(3, 3);
        let r = cohesion_resistance(&grid, 1, 1);
        assert_eq!(r.magnitude, 0.0);
        assert_eq!(r.connected_neighbors, 0);
    }

    #[test]
    fn resting_on_ground_gives_full_support_factor() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 2).set(Material::Dirt, 1.0);
        grid.at_mut(0, 2).set(Material::Dirt, 1.0);
        let r = cohesion_resistance(&grid, 1, 2);
        assert!(r.magnitude > 0.0);
        // support_factor=1.0, one same-material neighbor, fill=1.0
        let expected = Material::Dirt.cohesion() * 1.0 * 1.0 * 1.0;
        assert!((r.magnitude - expected).abs() < 1e-9);
    }

    #[test]
    fn metal_lattice_override_gives_full_support() {
        let mut grid = Grid::new(3, 3);
        // Floating metal cluster, nowhere near ground or wall.
        grid.at_mut(1, 1).set(Material::Metal, 1.0);
        grid.at_mut(0, 1).set(Material::Metal, 1.0);
        grid.at_mut(2, 1).set(Material::Metal, 1.0);
        assert!(!has_vertical_support(&grid, 1, 1));
        let r = cohesion_resistance(&grid, 1, 1);
        let expected = Material::Metal.cohesion() * 2.0 * 1.0 * 1.0;
        assert!((r.magnitude - expected).abs() < 1e-9);
    }

    #[test]
    fn com_cohesion_zero_with_no_same_material_neighbors() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Sand, 1.0);
        let f = com_cohesion_force(&grid, 1, 1, 1);
        assert_eq!(f.force, Vec2::ZERO);
    }

    #[test]
    fn com_cohesion_pulls_toward_neighbor_centroid() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Sand, 1.0);
        grid.at_mut(2, 1).set(Material::Sand, 1.0);
        let f = com_cohesion_force(&grid, 1, 1, 1);
        assert!(f.force.x > 0.0);
        assert!(f.force.y.abs() < 1e-9);
    }

    #[test]
    fn adhesion_zero_with_no_different_material_neighbors() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Water, 1.0);
        grid.at_mut(0, 1).set(Material::Water, 1.0);
        let f = adhesion_force(&grid, 1, 1);
        assert_eq!(f.contact_count, 0);
        assert_eq!(f.force, Vec2::ZERO);
    }

    #[test]
    fn adhesion_pulls_toward_different_material_neighbor() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Water, 1.0);
        grid.at_mut(1, 0).set(Material::Dirt, 1.0);
        let f = adhesion_force(&grid, 1, 1);
        assert_eq!(f.contact_count, 1);
        assert_eq!(f.strongest_attractor, Material::Dirt);
        assert!(f.force.y < 0.0);
    }
}
