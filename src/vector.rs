//! 2D vector primitives used throughout the physics core.
//!
//! `Vec2` holds real-valued components (COM offsets, velocities, forces) and
//! is an alias for [`glam::DVec2`]. `IVec2` holds grid coordinates and
//! integer offsets and aliases [`glam::IVec2`]. The extension traits below
//! add the zero-safe and grid-flavored helpers (`reflect`, `clamp_magnitude`,
//! COM-rotation, manhattan distance, …) this crate needs on top of glam's own
//! arithmetic, dot products, and component clamping.

pub type Vec2 = glam::DVec2;
pub type IVec2 = glam::IVec2;

/// Extensions over [`Vec2`] used by the force, collision, and transfer code.
pub trait Vec2Ext: Sized {
    fn magnitude(self) -> f64;
    fn magnitude_squared(self) -> f64;
    fn scale(self, k: f64) -> Self;
    fn normalize_or_zero(self) -> Self;
    /// Reflect about a (not necessarily normalized) surface normal.
    fn reflect(self, normal: Self) -> Self;
    fn rotate_radians(self, radians: f64) -> Self;
    fn clamp_components(self, min: f64, max: f64) -> Self;
    fn clamp_magnitude(self, max: f64) -> Self;
    /// Rotate 90 degrees counter-clockwise.
    fn perpendicular(self) -> Self;
    fn to_ivec2(self) -> IVec2;
}

impl Vec2Ext for Vec2 {
    fn magnitude(self) -> f64 {
        self.length()
    }

    fn magnitude_squared(self) -> f64 {
        self.length_squared()
    }

    fn scale(self, k: f64) -> Vec2 {
        self * k
    }

    fn normalize_or_zero(self) -> Vec2 {
        let mag = self.length();
        if mag < 1e-9 {
            Vec2::ZERO
        } else {
            self * (1.0 / mag)
        }
    }

    fn reflect(self, normal: Vec2) -> Vec2 {
        let n = normal.normalize_or_zero();
        self - n * (2.0 * self.dot(n))
    }

    fn rotate_radians(self, radians: f64) -> Vec2 {
        let (s, c) = radians.sin_cos();
        Vec2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    fn clamp_components(self, min: f64, max: f64) -> Vec2 {
        Vec2::new(self.x.clamp(min, max), self.y.clamp(min, max))
    }

    fn clamp_magnitude(self, max: f64) -> Vec2 {
        let mag = self.length();
        if mag > max && mag > 1e-9 {
            self * (max / mag)
        } else {
            self
        }
    }

    fn perpendicular(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    fn to_ivec2(self) -> IVec2 {
        IVec2::new(self.x as i32, self.y as i32)
    }
}

/// Extensions over [`IVec2`] used by grid-coordinate code.
pub trait IVec2Ext: Sized {
    fn manhattan_length(self) -> i32;
    fn to_vec2(self) -> Vec2;
}

impl IVec2Ext for IVec2 {
    fn manhattan_length(self) -> i32 {
        self.x.abs() + self.y.abs()
    }

    fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f64, self.y as f64)
    }
}
