//! Interpolation kernels.
//!
//! A kernel is a radially symmetric weighting function with compact support:
//! zero at and beyond its cutoff radius, monotonically non-increasing in
//! distance. The neighbor-relation builders evaluate a kernel once per
//! admitted pair and cache the results, so implementations only need the
//! scalar weight `w` and its radial derivative `dw`.
//!
//! The pair direction convention used throughout the crate is that `e_ij` is
//! the unit vector from neighbor `j` toward particle `i`, i.e.
//! `(pos_i - pos_j) / r_ij`, and the kernel-gradient vector of a pair is
//! `dw(r_ij) * e_ij`.

use crate::math::Real;
use std::f64::consts::PI;

/// A radially symmetric interpolation kernel with compact support in `D`
/// dimensions.
///
/// The dimension is part of the trait so that a body can only be paired
/// with a kernel normalized for its own dimension.
pub trait Kernel<const D: usize> {
    /// Radius beyond which the kernel is identically zero.
    fn cutoff_radius(&self) -> Real;

    /// Kernel weight at distance `r`.
    fn w(&self, r: Real) -> Real;

    /// Radial derivative of the kernel weight at distance `r`.
    fn dw(&self, r: Real) -> Real;

    /// Self-weight of a particle, the kernel value at zero distance.
    #[inline]
    fn w0(&self) -> Real {
        self.w(0.0)
    }

    /// Kernel weight at distance `r` for a particle whose smoothing length
    /// is `ratio` times the reference smoothing length.
    ///
    /// Rescaling the smoothing length by `ratio` stretches the support to
    /// `ratio * cutoff_radius()` and divides the normalization by
    /// `ratio^D`, so `w_at_ratio(r, 1.0) == w(r)` exactly.
    #[inline]
    fn w_at_ratio(&self, r: Real, ratio: Real) -> Real {
        self.w(r / ratio) / ratio.powi(D as i32)
    }

    /// Radial derivative at distance `r` for a particle whose smoothing
    /// length is `ratio` times the reference smoothing length.
    #[inline]
    fn dw_at_ratio(&self, r: Real, ratio: Real) -> Real {
        self.dw(r / ratio) / ratio.powi(D as i32 + 1)
    }
}

fn assert_supported_dimension(d: usize) {
    assert!(
        d == 2 || d == 3,
        "kernels are implemented for 2 and 3 dimensions, got {d}"
    );
}

/// The cubic B-spline kernel with support `2h`.
#[derive(Clone, Copy, Debug)]
pub struct CubicSplineKernel<const D: usize> {
    h: Real,
    sigma: Real,
}

impl<const D: usize> CubicSplineKernel<D> {
    /// Creates a cubic B-spline kernel with the given smoothing length.
    ///
    /// # Panics
    ///
    /// Panics if the smoothing length is not positive or `D` is not 2 or 3.
    pub fn new(smoothing_length: Real) -> Self {
        assert_supported_dimension(D);
        assert!(
            smoothing_length > 0.0,
            "smoothing length must be positive, got {smoothing_length}"
        );

        let h = smoothing_length;
        let sigma = match D {
            2 => 10.0 / (7.0 * PI * h * h),
            _ => 1.0 / (PI * h * h * h),
        };

        Self { h, sigma }
    }

    /// The smoothing length this kernel was built with.
    #[inline]
    pub const fn smoothing_length(&self) -> Real {
        self.h
    }
}

impl<const D: usize> Kernel<D> for CubicSplineKernel<D> {
    #[inline]
    fn cutoff_radius(&self) -> Real {
        2.0 * self.h
    }

    #[inline]
    fn w(&self, r: Real) -> Real {
        let q = r / self.h;
        if q < 1.0 {
            self.sigma * (1.0 - 1.5 * q * q + 0.75 * q * q * q)
        } else if q < 2.0 {
            let s = 2.0 - q;
            self.sigma * 0.25 * s * s * s
        } else {
            0.0
        }
    }

    #[inline]
    fn dw(&self, r: Real) -> Real {
        let q = r / self.h;
        if q < 1.0 {
            self.sigma / self.h * (-3.0 * q + 2.25 * q * q)
        } else if q < 2.0 {
            let s = 2.0 - q;
            self.sigma / self.h * (-0.75 * s * s)
        } else {
            0.0
        }
    }
}

/// The Wendland C2 kernel with support `2h`.
///
/// Smoother near the cutoff than the cubic spline and free of the pairing
/// instability, which makes it the usual production choice.
#[derive(Clone, Copy, Debug)]
pub struct WendlandC2Kernel<const D: usize> {
    h: Real,
    sigma: Real,
}

impl<const D: usize> WendlandC2Kernel<D> {
    /// Creates a Wendland C2 kernel with the given smoothing length.
    ///
    /// # Panics
    ///
    /// Panics if the smoothing length is not positive or `D` is not 2 or 3.
    pub fn new(smoothing_length: Real) -> Self {
        assert_supported_dimension(D);
        assert!(
            smoothing_length > 0.0,
            "smoothing length must be positive, got {smoothing_length}"
        );

        let h = smoothing_length;
        let sigma = match D {
            2 => 7.0 / (4.0 * PI * h * h),
            _ => 21.0 / (16.0 * PI * h * h * h),
        };

        Self { h, sigma }
    }

    /// The smoothing length this kernel was built with.
    #[inline]
    pub const fn smoothing_length(&self) -> Real {
        self.h
    }
}

impl<const D: usize> Kernel<D> for WendlandC2Kernel<D> {
    #[inline]
    fn cutoff_radius(&self) -> Real {
        2.0 * self.h
    }

    #[inline]
    fn w(&self, r: Real) -> Real {
        let q = r / self.h;
        if q < 2.0 {
            let s = 1.0 - 0.5 * q;
            self.sigma * s * s * s * s * (2.0 * q + 1.0)
        } else {
            0.0
        }
    }

    #[inline]
    fn dw(&self, r: Real) -> Real {
        let q = r / self.h;
        if q < 2.0 {
            let s = 1.0 - 0.5 * q;
            self.sigma / self.h * (-5.0 * q) * s * s * s
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_kernel_shape<const D: usize, K: Kernel<D>>(kernel: &K) {
        let cutoff = kernel.cutoff_radius();
        assert!(kernel.w0() > 0.0);
        assert_eq!(kernel.w(cutoff), 0.0);
        assert_eq!(kernel.w(cutoff * 1.5), 0.0);
        assert_eq!(kernel.dw(cutoff), 0.0);

        // Monotonically non-increasing weight, non-positive derivative.
        let samples = 64;
        let mut previous = kernel.w0();
        for n in 1..=samples {
            let r = cutoff * n as Real / samples as Real;
            let w = kernel.w(r);
            assert!(w <= previous + 1e-12, "w must not increase at r = {r}");
            assert!(kernel.dw(r) <= 0.0, "dw must not be positive at r = {r}");
            previous = w;
        }
    }

    #[test]
    fn cubic_spline_shape() {
        assert_kernel_shape(&CubicSplineKernel::<2>::new(0.3));
        assert_kernel_shape(&CubicSplineKernel::<3>::new(1.2));
    }

    #[test]
    fn wendland_shape() {
        assert_kernel_shape(&WendlandC2Kernel::<2>::new(0.3));
        assert_kernel_shape(&WendlandC2Kernel::<3>::new(1.2));
    }

    #[test]
    fn cubic_spline_known_values() {
        let h = 0.5;
        let kernel = CubicSplineKernel::<2>::new(h);
        let sigma = 10.0 / (7.0 * PI * h * h);

        assert!((kernel.w0() - sigma).abs() < 1e-12);
        // At q = 1 both branches meet at sigma / 4.
        assert!((kernel.w(h) - 0.25 * sigma).abs() < 1e-12);
    }

    #[test]
    fn derivative_matches_finite_differences() {
        let kernel = WendlandC2Kernel::<3>::new(0.7);
        let dr = 1e-6;
        for n in 1..20 {
            let r = kernel.cutoff_radius() * n as Real / 21.0;
            let numeric = (kernel.w(r + dr) - kernel.w(r - dr)) / (2.0 * dr);
            assert!((kernel.dw(r) - numeric).abs() < 1e-5);
        }
    }

    #[test]
    fn ratio_scaling_matches_a_rescaled_kernel() {
        // Evaluating at ratio 2 must agree with a kernel built with twice
        // the smoothing length.
        let h = 0.4;
        let reference = WendlandC2Kernel::<3>::new(h);
        let coarse = WendlandC2Kernel::<3>::new(2.0 * h);

        for n in 0..20 {
            let r = coarse.cutoff_radius() * n as Real / 19.0;
            assert!((reference.w_at_ratio(r, 2.0) - coarse.w(r)).abs() < 1e-12);
            assert!((reference.dw_at_ratio(r, 2.0) - coarse.dw(r)).abs() < 1e-12);
        }

        assert_eq!(reference.w_at_ratio(0.3, 1.0), reference.w(0.3));
    }

    #[test]
    #[should_panic]
    fn unsupported_dimension_panics() {
        let _ = CubicSplineKernel::<4>::new(1.0);
    }
}
