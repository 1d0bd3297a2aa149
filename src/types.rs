//! Core value types: quaternions and grid bounds.
//!
//! The iterated `Quaternion` is a plain algebra value (Hamilton product,
//! norm, small integer powers), not a rotation: glam's `Quat` assumes
//! unit length, which escape-time iteration immediately violates.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Quaternion with scalar part `w` and imaginary parts `x`, `y`, `z`.
///
/// Grid coordinates map to the imaginary parts; the caller's fourth
/// component fills `w`. Immutable value type, safe to share across
/// worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// Scalar (real) component
    pub w: f32,
    /// First imaginary component
    pub x: f32,
    /// Second imaginary component
    pub y: f32,
    /// Third imaginary component
    pub z: f32,
}

impl Quaternion {
    /// Zero quaternion
    pub const ZERO: Quaternion = Quaternion::new(0.0, 0.0, 0.0, 0.0);

    /// Multiplicative identity
    pub const ONE: Quaternion = Quaternion::new(1.0, 0.0, 0.0, 0.0);

    /// Create a quaternion from scalar and imaginary components
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Quaternion { w, x, y, z }
    }

    /// Real quaternion `r + 0i + 0j + 0k`
    pub const fn from_real(r: f32) -> Self {
        Quaternion::new(r, 0.0, 0.0, 0.0)
    }

    /// Squared magnitude
    #[inline]
    pub fn norm_sq(self) -> f32 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude
    #[inline]
    pub fn norm(self) -> f32 {
        self.norm_sq().sqrt()
    }

    /// Multiply by a real scalar
    #[inline]
    pub fn scale(self, s: f32) -> Self {
        Quaternion::new(self.w * s, self.x * s, self.y * s, self.z * s)
    }

    /// Raise to a small non-negative integer power by repeated
    /// multiplication. `q.powi(0)` is the identity.
    pub fn powi(self, n: u32) -> Self {
        let mut acc = Quaternion::ONE;
        for _ in 0..n {
            acc = acc * self;
        }
        acc
    }
}

impl Add for Quaternion {
    type Output = Quaternion;

    #[inline]
    fn add(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w + rhs.w,
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
        )
    }
}

impl Sub for Quaternion {
    type Output = Quaternion;

    #[inline]
    fn sub(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w - rhs.w,
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
        )
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    /// Hamilton product (non-commutative)
    #[inline]
    fn mul(self, r: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * r.w - self.x * r.x - self.y * r.y - self.z * r.z,
            self.w * r.x + self.x * r.w + self.y * r.z - self.z * r.y,
            self.w * r.y - self.x * r.z + self.y * r.w + self.z * r.x,
            self.w * r.z + self.x * r.y - self.y * r.x + self.z * r.w,
        )
    }
}

impl Neg for Quaternion {
    type Output = Quaternion;

    #[inline]
    fn neg(self) -> Quaternion {
        self.scale(-1.0)
    }
}

/// Axis-aligned rectangular sampling region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl GridBounds {
    /// Create bounds from corner points (validated later by the grid)
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        GridBounds { min, max }
    }

    /// Cube bounds `[-half, half]^3`
    pub fn symmetric(half: f32) -> Self {
        GridBounds::new(Vec3::splat(-half), Vec3::splat(half))
    }

    /// Extent along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point of the region
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when every axis is finite and `min < max`
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x < self.max.x
            && self.min.y < self.max.y
            && self.min.z < self.max.z
    }
}
