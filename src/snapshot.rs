//! Snapshot persistence: a serde-derived structured record of the grid and
//! tunables, encoded via `bincode` for the hot path and available as JSON
//! for human-editable config/debugging.
//!
//! Only present when the `serde` feature is enabled.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::PhysicsError;
use crate::grid::Grid;
use crate::material::Material;
use crate::scheduler::Tunables;
use crate::vector::Vec2;

/// One non-empty cell's persisted state. Air cells are omitted entirely —
/// a snapshot only ever lists matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub x: u32,
    pub y: u32,
    pub material: Material,
    pub fill: f64,
    pub velocity: Vec2,
    pub com: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunablesRecord {
    pub gravity: Vec2,
    pub max_velocity: f64,
    pub elasticity_factor: f64,
    pub pressure_scale: f64,
    pub hydrostatic_enabled: bool,
    pub dynamic_enabled: bool,
    pub air_resistance_scalar: f64,
    pub cohesion_range: i32,
    pub fragmentation_threshold: f64,
    pub min_fill_threshold: f64,
    pub dynamic_accumulation_rate: f64,
    pub dynamic_decay_rate: f64,
}

impl From<Tunables> for TunablesRecord {
    fn from(t: Tunables) -> Self {
        TunablesRecord {
            gravity: t.gravity,
            max_velocity: t.max_velocity,
            elasticity_factor: t.elasticity_factor,
            pressure_scale: t.pressure_scale,
            hydrostatic_enabled: t.hydrostatic_enabled,
            dynamic_enabled: t.dynamic_enabled,
            air_resistance_scalar: t.air_resistance_scalar,
            cohesion_range: t.cohesion_range,
            fragmentation_threshold: t.fragmentation_threshold,
            min_fill_threshold: t.min_fill_threshold,
            dynamic_accumulation_rate: t.dynamic_accumulation_rate,
            dynamic_decay_rate: t.dynamic_decay_rate,
        }
    }
}

impl From<TunablesRecord> for Tunables {
    fn from(r: TunablesRecord) -> Self {
        Tunables {
            gravity: r.gravity,
            max_velocity: r.max_velocity,
            elasticity_factor: r.elasticity_factor,
            pressure_scale: r.pressure_scale,
            hydrostatic_enabled: r.hydrostatic_enabled,
            dynamic_enabled: r.dynamic_enabled,
            air_resistance_scalar: r.air_resistance_scalar,
            cohesion_range: r.cohesion_range,
            fragmentation_threshold: r.fragmentation_threshold,
            min_fill_threshold: r.min_fill_threshold,
            dynamic_accumulation_rate: r.dynamic_accumulation_rate,
            dynamic_decay_rate: r.dynamic_decay_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<CellRecord>,
    pub tunables: TunablesRecord,
    pub tick: u64,
}

impl SimSnapshot {
    pub fn capture(grid: &Grid, tunables: Tunables, tick: u64) -> Self {
        let cells = grid
            .iter_row_major()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|((x, y), cell)| cell_to_record(x, y, cell))
            .collect();
        SimSnapshot {
            width: grid.width(),
            height: grid.height(),
            cells,
            tunables: tunables.into(),
            tick,
        }
    }

    pub fn restore(&self) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        for record in &self.cells {
            if !grid.in_bounds(record.x, record.y) {
                continue;
            }
            let cell = grid.at_mut(record.x, record.y);
            cell.set(record.material, record.fill);
            cell.velocity = record.velocity;
            cell.com = record.com;
        }
        grid
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PhysicsError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| PhysicsError::SnapshotEncode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PhysicsError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(snapshot, _)| snapshot)
            .map_err(|e| PhysicsError::SnapshotDecode(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, PhysicsError> {
        serde_json::to_string_pretty(self).map_err(|e| PhysicsError::SnapshotEncode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        serde_json::from_str(json).map_err(|e| PhysicsError::SnapshotDecode(e.to_string()))
    }
}

fn cell_to_record(x: u32, y: u32, cell: &Cell) -> CellRecord {
    CellRecord {
        x,
        y,
        material: cell.material,
        fill: cell.fill_ratio,
        velocity: cell.velocity,
        com: cell.com,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn capture_omits_empty_cells() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(1, 1).set(Material::Sand, 0.8);
        let snapshot = SimSnapshot::capture(&grid, Tunables::default(), 0);
        assert_eq!(snapshot.cells.len(), 1);
        assert_eq!(snapshot.cells[0].material, Material::Sand);
    }

    #[test]
    fn roundtrip_through_bincode_preserves_cells() {
        let mut grid = Grid::new(3, 3);
        grid.at_mut(0, 0).set(Material::Water, 0.5);
        grid.at_mut(0, 0).velocity = Vec2::new(0.2, 0.3);
        let snapshot = SimSnapshot::capture(&grid, Tunables::default(), 5);

        let bytes = snapshot.to_bytes().unwrap();
        let restored = SimSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(restored, snapshot);

        let restored_grid = restored.restore();
        assert_eq!(restored_grid.at(0, 0).material, Material::Water);
        assert!((restored_grid.at(0, 0).fill_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn roundtrip_through_json_preserves_tick() {
        let grid = Grid::new(2, 2);
        let snapshot = SimSnapshot::capture(&grid, Tunables::default(), 12);
        let json = snapshot.to_json().unwrap();
        let restored = SimSnapshot::from_json(&json).unwrap();
        assert_eq!(restored.tick, 12);
    }

    #[test]
    fn decoding_garbage_bytes_returns_error() {
        let result = SimSnapshot::from_bytes(&[0xff, 0x00, 0x13, 0x37]);
        assert!(result.is_err());
    }
}
