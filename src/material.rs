//! Static per-material properties. The table is fixed for the lifetime of
//! the process — there is no way to construct a `Material` outside this
//! closed enum, so lookups never fail.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of materials a cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Material {
    Air,
    Dirt,
    Water,
    Sand,
    Wood,
    Metal,
    Leaf,
    Wall,
    Seed,
    Root,
}

impl Material {
    pub const ALL: [Material; 10] = [
        Material::Air,
        Material::Dirt,
        Material::Water,
        Material::Sand,
        Material::Wood,
        Material::Metal,
        Material::Leaf,
        Material::Wall,
        Material::Seed,
        Material::Root,
    ];

    #[inline]
    pub fn properties(self) -> &'static MaterialProperties {
        &MATERIAL_TABLE[self as usize]
    }

    #[inline]
    pub fn density(self) -> f64 {
        self.properties().density
    }

    #[inline]
    pub fn elasticity(self) -> f64 {
        self.properties().elasticity
    }

    #[inline]
    pub fn cohesion(self) -> f64 {
        self.properties().cohesion
    }

    #[inline]
    pub fn adhesion(self) -> f64 {
        self.properties().adhesion
    }

    #[inline]
    pub fn hydrostatic_weight(self) -> f64 {
        self.properties().hydrostatic_weight
    }

    #[inline]
    pub fn dynamic_weight(self) -> f64 {
        self.properties().dynamic_weight
    }

    /// Metal, Wood, and Wall are rigid for collision-classification purposes.
    #[inline]
    pub fn is_rigid(self) -> bool {
        matches!(self, Material::Metal | Material::Wood | Material::Wall)
    }

    /// Only Wall is immobile; Wood is heavy but still participates in
    /// transfers (Design Notes open question, resolved per spec).
    #[inline]
    pub fn is_immobile(self) -> bool {
        matches!(self, Material::Wall)
    }
}

/// Fixed physical constants for one material.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterialProperties {
    pub density: f64,
    pub elasticity: f64,
    pub cohesion: f64,
    pub adhesion: f64,
    /// Sensitivity to hydrostatic pressure force, in [0,1].
    pub hydrostatic_weight: f64,
    /// Sensitivity to dynamic (blocked-transfer) pressure force, in [0,1].
    pub dynamic_weight: f64,
}

impl MaterialProperties {
    const fn new(
        density: f64,
        elasticity: f64,
        cohesion: f64,
        adhesion: f64,
        hydrostatic_weight: f64,
        dynamic_weight: f64,
    ) -> Self {
        MaterialProperties {
            density,
            elasticity,
            cohesion,
            adhesion,
            hydrostatic_weight,
            dynamic_weight,
        }
    }
}

// Indexed by `Material as usize`; keep in sync with the enum's declaration order.
static MATERIAL_TABLE: [MaterialProperties; 10] = [
    // Air: density 0, no forces, no pressure response.
    MaterialProperties::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
    // Dirt: granular solid.
    MaterialProperties::new(1.6, 0.2, 0.5, 0.4, 0.7, 1.0),
    // Water: fluid.
    MaterialProperties::new(1.0, 0.1, 0.1, 0.3, 1.0, 0.8),
    // Sand: granular solid, slightly denser than dirt.
    MaterialProperties::new(1.8, 0.15, 0.35, 0.3, 0.7, 1.0),
    // Wood: rigid but mobile (see Design Notes).
    MaterialProperties::new(0.7, 0.6, 0.7, 0.5, 0.3, 0.5),
    // Metal: very rigid, high density.
    MaterialProperties::new(7.8, 0.8, 0.9, 0.6, 0.1, 0.5),
    // Leaf: light, brittle, organic.
    MaterialProperties::new(0.2, 0.3, 0.3, 0.4, 0.4, 0.6),
    // Wall: immobile boundary.
    MaterialProperties::new(10.0, 0.9, 1.0, 1.0, 0.0, 0.0),
    // Seed: growth-organism material, light and semi-structural.
    MaterialProperties::new(0.9, 0.4, 0.6, 0.5, 0.4, 0.6),
    // Root: growth-organism material, denser/more rigid than Seed.
    MaterialProperties::new(1.2, 0.5, 0.8, 0.6, 0.3, 0.5),
];
