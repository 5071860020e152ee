//! Transfer detection: scans integrated cells for COM-boundary crossings
//! and turns each crossing into a candidate inter-cell move.
//!
//! Read-only over the grid — classification and application happen in
//! later phases (`collision` and `executor`).

use crate::cell::{COM_DEFLECTION_THRESHOLD, FILL_EPSILON};
use crate::grid::Grid;
use crate::material::Material;
use crate::vector::{IVec2, Vec2};

/// Which axis (or both) a candidate move crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAxis {
    Horizontal,
    Vertical,
    Diagonal,
}

/// An un-classified candidate move, produced purely from COM geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCandidate {
    pub source: (u32, u32),
    pub target: IVec2,
    pub material: Material,
    pub amount: f64,
    pub projected_com: Vec2,
    pub source_velocity: Vec2,
    pub axis: TransferAxis,
}

fn project(axis_com: f64, sign: f64) -> f64 {
    (axis_com - 2.0 * sign).clamp(-COM_DEFLECTION_THRESHOLD, COM_DEFLECTION_THRESHOLD)
}

/// A candidate target is "blocked" (for the diagonal-first priority rule)
/// if it is out of bounds or already at full capacity.
fn is_blocked(grid: &Grid, target: IVec2) -> bool {
    match grid.try_at(target) {
        None => true,
        Some(cell) => cell.fill_ratio >= 1.0 - FILL_EPSILON,
    }
}

/// Scans the grid row-major and emits one candidate move per axis that a
/// cell's COM has crossed, applying the diagonal-first priority rule from
/// spec.md §4.10.
pub fn detect_transfers(grid: &Grid) -> Vec<MoveCandidate> {
    let mut candidates = Vec::new();
    for ((x, y), cell) in grid.iter_row_major() {
        if cell.is_empty() || cell.is_wall() {
            continue;
        }
        let com = cell.com;
        let sign_x = if com.x > COM_DEFLECTION_THRESHOLD {
            Some(1.0)
        } else if com.x < -COM_DEFLECTION_THRESHOLD {
            Some(-1.0)
        } else {
            None
        };
        let sign_y = if com.y > COM_DEFLECTION_THRESHOLD {
            Some(1.0)
        } else if com.y < -COM_DEFLECTION_THRESHOLD {
            Some(-1.0)
        } else {
            None
        };

        match (sign_x, sign_y) {
            (Some(sx), Some(sy)) => {
                let diag_target = IVec2::new(x as i32 + sx as i32, y as i32 + sy as i32);
                if is_blocked(grid, diag_target) {
                    candidates.push(axis_candidate(x, y, cell, sx, 0.0, TransferAxis::Horizontal));
                    candidates.push(axis_candidate(x, y, cell, 0.0, sy, TransferAxis::Vertical));
                } else {
                    candidates.push(MoveCandidate {
                        source: (x, y),
                        target: diag_target,
                        material: cell.material,
                        amount: cell.fill_ratio,
                        projected_com: Vec2::new(project(com.x, sx), project(com.y, sy)),
                        source_velocity: cell.velocity,
                        axis: TransferAxis::Diagonal,
                    });
                }
            }
            (Some(sx), None) => {
                candidates.push(axis_candidate(x, y, cell, sx, 0.0, TransferAxis::Horizontal));
            }
            (None, Some(sy)) => {
                candidates.push(axis_candidate(x, y, cell, 0.0, sy, TransferAxis::Vertical));
            }
            (None, None) => {}
        }
    }
    candidates
}

fn axis_candidate(
    x: u32,
    y: u32,
    cell: &crate::cell::Cell,
    sx: f64,
    sy: f64,
    axis: TransferAxis,
) -> MoveCandidate {
    let target = IVec2::new(x as i32 + sx as i32, y as i32 + sy as i32);
    let projected_com = Vec2::new(
        if sx != 0.0 { project(cell.com.x, sx) } else { cell.com.x },
        if sy != 0.0 { project(cell.com.y, sy) } else { cell.com.y },
    );
    MoveCandidate {
        source: (x, y),
        target,
        material: cell.material,
        amount: cell.fill_ratio,
        projected_com,
        source_velocity: cell.velocity,
        axis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn no_candidate_below_threshold() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Sand, 1.0);
        grid.at_mut(1, 1).com = Vec2::new(0.3, 0.3);
        assert!(detect_transfers(&grid).is_empty());
    }

    #[test]
    fn single_axis_candidate_when_only_x_crosses() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Sand, 1.0);
        grid.at_mut(1, 1).com = Vec2::new(0.7, 0.0);
        let candidates = detect_transfers(&grid);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].axis, TransferAxis::Horizontal);
        assert_eq!(candidates[0].target, IVec2::new(2, 1));
        assert!((candidates[0].projected_com.x - (0.7 - 2.0)).abs() < 1e-9);
    }

    #[test]
    fn diagonal_candidate_when_both_axes_cross_and_unblocked() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Sand, 1.0);
        grid.at_mut(1, 1).com = Vec2::new(0.7, 0.7);
        let candidates = detect_transfers(&grid);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].axis, TransferAxis::Diagonal);
        assert_eq!(candidates[0].target, IVec2::new(2, 2));
    }

    #[test]
    fn falls_back_to_axis_candidates_when_diagonal_blocked() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Sand, 1.0);
        grid.at_mut(1, 1).com = Vec2::new(0.7, 0.7);
        grid.at_mut(2, 2).set(Material::Sand, 1.0); // full target blocks the diagonal
        let candidates = detect_transfers(&grid);
        assert_eq!(candidates.len(), 2);
        let axes: Vec<TransferAxis> = candidates.iter().map(|c| c.axis).collect();
        assert!(axes.contains(&TransferAxis::Horizontal));
        assert!(axes.contains(&TransferAxis::Vertical));
    }

    #[test]
    fn out_of_bounds_diagonal_target_falls_back_to_axes() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(2, 2).set(Material::Sand, 1.0);
        grid.at_mut(2, 2).com = Vec2::new(0.7, 0.7);
        let candidates = detect_transfers(&grid);
        assert_eq!(candidates.len(), 2);
    }
}
