//! Structural support queries. Read-only over the grid; every traversal is
//! bounded so these functions always terminate.
//!
//! Grounded on `WorldBSupportCalculator.cpp`: vertical support recurses
//! through continuous material and breaks at the first empty gap (no
//! support through gaps), horizontal support only looks at the immediate
//! 8-neighborhood, and structural support short-circuits on Wall / ground /
//! high density before falling back to a bounded BFS.

use std::collections::{HashSet, VecDeque};

use crate::cell::FILL_EPSILON;
use crate::grid::Grid;
use crate::material::Material;

pub const MAX_VERTICAL_SUPPORT_DISTANCE: u32 = 5;
pub const RIGID_DENSITY_THRESHOLD: f64 = 5.0;
pub const STRONG_ADHESION_THRESHOLD: f64 = 0.5;
pub const MAX_SUPPORT_DISTANCE: u32 = 10;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Walks straight down from `(x, y)`, recursively checking that each
/// supporting cell is itself supported. The first empty cell encountered
/// breaks the chain.
pub fn has_vertical_support(grid: &Grid, x: u32, y: u32) -> bool {
    has_vertical_support_inner(grid, x, y, MAX_VERTICAL_SUPPORT_DISTANCE)
}

fn has_vertical_support_inner(grid: &Grid, x: u32, y: u32, budget: u32) -> bool {
    if !grid.in_bounds(x, y) {
        return false;
    }
    let cell = grid.at(x, y);
    if cell.is_empty() {
        return false;
    }
    if y == grid.height() - 1 {
        return true;
    }
    if budget == 0 {
        return false;
    }
    let below_y = y + 1;
    if below_y >= grid.height() {
        return false;
    }
    let below = grid.at(x, below_y);
    if below.is_empty() {
        return false;
    }
    has_vertical_support_inner(grid, x, below_y, budget - 1)
}

/// Immediate 8-neighborhood only; supported iff some neighbor is a
/// high-density material and the mutual adhesion exceeds the threshold.
pub fn has_horizontal_support(grid: &Grid, x: u32, y: u32) -> bool {
    if !grid.in_bounds(x, y) {
        return false;
    }
    let cell = grid.at(x, y);
    if cell.is_empty() {
        return false;
    }
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
        if neighbor.is_empty() {
            continue;
        }
        if neighbor.material.density() > RIGID_DENSITY_THRESHOLD {
            let mutual = (cell.material.adhesion() * neighbor.material.adhesion()).sqrt();
            if mutual > STRONG_ADHESION_THRESHOLD {
                return true;
            }
        }
    }
    false
}

/// Wall, ground row, and high-density cells are inherently supported.
/// Otherwise a bounded BFS through same-material/high-density cells seeks
/// any inherently supported cell.
pub fn has_structural_support(grid: &Grid, x: u32, y: u32) -> bool {
    if !grid.in_bounds(x, y) {
        return false;
    }
    let cell = grid.at(x, y);
    if cell.is_empty() {
        return false;
    }
    if cell.material == Material::Wall {
        return true;
    }
    if y == grid.height() - 1 {
        return true;
    }
    if cell.material.density() > RIGID_DENSITY_THRESHOLD {
        return true;
    }

    let mut visited: HashSet<(u32, u32)> = HashSet::new();
    let mut queue: VecDeque<((u32, u32), u32)> = VecDeque::new();
    queue.push_back(((x, y), 0));
    visited.insert((x, y));

    while let Some(((cx, cy), distance)) = queue.pop_front() {
        if distance >= MAX_SUPPORT_DISTANCE {
            continue;
        }
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = cx as i32 + dx;
            let ny = cy as i32 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            if !grid.in_bounds(nx, ny) || visited.contains(&(nx, ny)) {
                continue;
            }
            visited.insert((nx, ny));
            let neighbor = grid.at(nx, ny);
            if neighbor.is_empty() {
                continue;
            }
            if neighbor.material == Material::Wall || ny == grid.height() - 1 {
                return true;
            }
            if neighbor.material.density() > RIGID_DENSITY_THRESHOLD {
                return true;
            }
            if neighbor.material == cell.material && neighbor.fill_ratio > FILL_EPSILON {
                queue.push_back(((nx, ny), distance + 1));
            }
        }
    }
    false
}

/// BFS shortest path under the same-material/high-density adjacency rule,
/// capped at `MAX_SUPPORT_DISTANCE` when no support is found.
pub fn distance_to_support(grid: &Grid, x: u32, y: u32) -> u32 {
    if !grid.in_bounds(x, y) || grid.at(x, y).is_empty() {
        return MAX_SUPPORT_DISTANCE;
    }
    let material = grid.at(x, y).material;

    let mut distances: HashSet<(u32, u32)> = HashSet::new();
    let mut queue: VecDeque<((u32, u32), u32)> = VecDeque::new();
    queue.push_back(((x, y), 0));
    distances.insert((x, y));

    while let Some(((cx, cy), distance)) = queue.pop_front() {
        if has_structural_support(grid, cx, cy) {
            return distance;
        }
        if distance >= MAX_SUPPORT_DISTANCE {
            continue;
        }
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = cx as i32 + dx;
            let ny = cy as i32 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            if !grid.in_bounds(nx, ny) || distances.contains(&(nx, ny)) {
                continue;
            }
            let next = grid.at(nx, ny);
            let can_connect = (next.material == material && next.fill_ratio > FILL_EPSILON)
                || (!next.is_empty() && has_structural_support(grid, nx, ny));
            if can_connect {
                distances.insert((nx, ny));
                queue.push_back(((nx, ny), distance + 1));
            }
        }
    }
    MAX_SUPPORT_DISTANCE
}
