//! Per-cell state and the pure mutators that keep it invariant-safe.

use crate::material::Material;
use crate::vector::{Vec2, Vec2Ext};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fill below this is treated as "no matter" throughout the core.
pub const FILL_EPSILON: f64 = 1e-3;

/// Sub-cell COM deflection past which a transfer is triggered (§4.10).
pub const COM_DEFLECTION_THRESHOLD: f64 = 0.6;

/// A single lattice site. Holds exactly one material at a fill ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub material: Material,
    /// In [0, 1]. Invariant: `material == Air` iff `fill_ratio == 0`.
    pub fill_ratio: f64,
    /// Sub-cell center of mass, in [-1, 1]^2. Origin is the cell center.
    pub com: Vec2,
    pub velocity: Vec2,
    pub hydrostatic_pressure: f64,
    pub dynamic_pressure: f64,
    pub pressure_gradient: Vec2,
    /// 0 = not part of an organism.
    pub organism_id: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            material: Material::Air,
            fill_ratio: 0.0,
            com: Vec2::ZERO,
            velocity: Vec2::ZERO,
            hydrostatic_pressure: 0.0,
            dynamic_pressure: 0.0,
            pressure_gradient: Vec2::ZERO,
            organism_id: 0,
        }
    }
}

impl Cell {
    pub fn new(material: Material, fill_ratio: f64) -> Self {
        let mut cell = Cell::default();
        cell.set(material, fill_ratio);
        cell
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.material == Material::Air || self.fill_ratio <= FILL_EPSILON
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.material == Material::Wall
    }

    /// Clamps `fill` to [0,1]; forces fill to 0 when material is Air.
    pub fn set(&mut self, material: Material, fill: f64) {
        let clamped = fill.clamp(0.0, 1.0);
        if material == Material::Air {
            self.material = Material::Air;
            self.fill_ratio = 0.0;
        } else {
            self.material = material;
            self.fill_ratio = clamped;
        }
    }

    /// Deposits `min(amount, 1 - fill)` of `kind` into this cell.
    ///
    /// Fails softly (returns 0) if the cell is non-empty and holds a
    /// different material. An empty cell adopts `kind`.
    pub fn add_material(&mut self, kind: Material, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        if self.is_empty() {
            self.material = kind;
            self.fill_ratio = 0.0;
        } else if self.material != kind {
            return 0.0;
        }
        let room = (1.0 - self.fill_ratio).max(0.0);
        let added = amount.min(room);
        self.fill_ratio = (self.fill_ratio + added).clamp(0.0, 1.0);
        added
    }

    /// Removes `min(amount, fill)`. Reverts to Air when fill drops to ~0.
    pub fn remove_material(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || self.is_empty() {
            return 0.0;
        }
        let removed = amount.min(self.fill_ratio);
        self.fill_ratio -= removed;
        if self.fill_ratio <= FILL_EPSILON {
            self.material = Material::Air;
            self.fill_ratio = 0.0;
            self.com = Vec2::ZERO;
            self.velocity = Vec2::ZERO;
        }
        removed
    }

    /// `com` divided by the COM-transfer threshold — a dimensionless
    /// crossing indicator used by the transfer detector.
    pub fn normalized_deflection(&self) -> Vec2 {
        self.com / COM_DEFLECTION_THRESHOLD
    }

    /// Clamp COM into [-1,1]^2, enforcing the cell invariant after an
    /// integration step.
    pub fn clamp_com(&mut self) {
        self.com = self.com.clamp_components(-1.0, 1.0);
    }

    pub fn mass(&self) -> f64 {
        self.material.density() * self.fill_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_empty_air() {
        let c = Cell::default();
        assert!(c.is_empty());
        assert_eq!(c.material, Material::Air);
        assert_eq!(c.fill_ratio, 0.0);
    }

    #[test]
    fn set_air_forces_fill_zero() {
        let mut c = Cell::new(Material::Water, 0.8);
        c.set(Material::Air, 0.5);
        assert_eq!(c.material, Material::Air);
        assert_eq!(c.fill_ratio, 0.0);
    }

    #[test]
    fn set_clamps_fill_into_unit_interval() {
        let mut c = Cell::default();
        c.set(Material::Sand, 1.5);
        assert_eq!(c.fill_ratio, 1.0);
        c.set(Material::Sand, -0.5);
        assert_eq!(c.fill_ratio, 0.0);
    }

    #[test]
    fn add_material_into_empty_cell_adopts_kind() {
        let mut c = Cell::default();
        let added = c.add_material(Material::Dirt, 0.4);
        assert_eq!(added, 0.4);
        assert_eq!(c.material, Material::Dirt);
        assert_eq!(c.fill_ratio, 0.4);
    }

    #[test]
    fn add_material_rejects_mismatched_material() {
        let mut c = Cell::new(Material::Water, 0.5);
        let added = c.add_material(Material::Dirt, 0.3);
        assert_eq!(added, 0.0);
        assert_eq!(c.material, Material::Water);
        assert_eq!(c.fill_ratio, 0.5);
    }

    #[test]
    fn add_material_caps_at_remaining_capacity() {
        let mut c = Cell::new(Material::Sand, 0.9);
        let added = c.add_material(Material::Sand, 0.5);
        assert!((added - 0.1).abs() < 1e-9);
        assert!((c.fill_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn remove_material_reverts_to_air_below_epsilon() {
        let mut c = Cell::new(Material::Water, 0.0005 + FILL_EPSILON);
        let removed = c.remove_material(0.0005);
        assert!(removed > 0.0);
        assert_eq!(c.material, Material::Air);
        assert_eq!(c.fill_ratio, 0.0);
    }

    #[test]
    fn remove_material_caps_at_available_fill() {
        let mut c = Cell::new(Material::Dirt, 0.3);
        let removed = c.remove_material(10.0);
        assert!((removed - 0.3).abs() < 1e-9);
        assert_eq!(c.material, Material::Air);
    }

    #[test]
    fn normalized_deflection_divides_by_threshold() {
        let mut c = Cell::new(Material::Sand, 1.0);
        c.com = Vec2::new(0.6, 0.0);
        let d = c.normalized_deflection();
        assert!((d.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_com_bounds_to_unit_square() {
        let mut c = Cell::new(Material::Sand, 1.0);
        c.com = Vec2::new(2.0, -3.0);
        c.clamp_com();
        assert_eq!(c.com, Vec2::new(1.0, -1.0));
    }
}
