//! Scalar and array-vector primitives shared across the crate.
//!
//! Positions and directions are plain `[Real; D]` arrays so that every other
//! module can be generic over the spatial dimension. Only the handful of
//! operations the neighbor search needs are provided.

/// Scalar type used for all positions, distances and kernel values.
pub type Real = f64;

/// Epsilon floor added to denominators of pairwise quantities so that
/// coincident positions do not produce non-finite directions.
pub const TINY: Real = 1.0e-30;

/// Componentwise difference `lhs - rhs`.
#[inline]
pub fn sub<const D: usize>(lhs: [Real; D], rhs: [Real; D]) -> [Real; D] {
    std::array::from_fn(|i| lhs[i] - rhs[i])
}

/// Componentwise sum `lhs + rhs`.
#[inline]
pub fn add<const D: usize>(lhs: [Real; D], rhs: [Real; D]) -> [Real; D] {
    std::array::from_fn(|i| lhs[i] + rhs[i])
}

/// Vector scaled by a scalar.
#[inline]
pub fn scale<const D: usize>(v: [Real; D], s: Real) -> [Real; D] {
    std::array::from_fn(|i| v[i] * s)
}

/// Dot product of two vectors.
#[inline]
pub fn dot<const D: usize>(lhs: [Real; D], rhs: [Real; D]) -> Real {
    (0..D).map(|i| lhs[i] * rhs[i]).sum()
}

/// Squared Euclidean norm.
#[inline]
pub fn length_squared<const D: usize>(v: [Real; D]) -> Real {
    dot(v, v)
}

/// Euclidean norm.
#[inline]
pub fn length<const D: usize>(v: [Real; D]) -> Real {
    length_squared(v).sqrt()
}

/// Euclidean distance between two positions.
#[inline]
pub fn distance<const D: usize>(lhs: [Real; D], rhs: [Real; D]) -> Real {
    length(sub(lhs, rhs))
}

/// Conversions between `[Real; D]` and `glam` vector types for engine
/// integration.
#[cfg(feature = "glam")]
pub mod convert {
    use super::Real;

    /// Converts a `glam::DVec2` into a position array.
    #[inline]
    pub fn from_dvec2(v: glam::DVec2) -> [Real; 2] {
        v.to_array()
    }

    /// Converts a position array into a `glam::DVec2`.
    #[inline]
    pub fn to_dvec2(v: [Real; 2]) -> glam::DVec2 {
        glam::DVec2::from_array(v)
    }

    /// Converts a `glam::DVec3` into a position array.
    #[inline]
    pub fn from_dvec3(v: glam::DVec3) -> [Real; 3] {
        v.to_array()
    }

    /// Converts a position array into a `glam::DVec3`.
    #[inline]
    pub fn to_dvec3(v: [Real; 3]) -> glam::DVec3 {
        glam::DVec3::from_array(v)
    }
}
