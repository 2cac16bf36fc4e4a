//! Setup-time errors.
//!
//! Only structural misconfiguration is fatal in this crate: a domain or
//! cutoff for which no valid spatial decomposition exists is reported at
//! construction and no grid or relation is built. Runtime degenerate states
//! (a particle with no neighbors in range) are valid results, not errors.

use crate::math::Real;
use std::fmt;

/// Errors detected when constructing a grid or periodic condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetupError {
    /// The interaction cutoff radius, and therefore the cell size, must be
    /// strictly positive.
    NonPositiveCutoff(Real),
    /// The domain extent along an axis is smaller than one cutoff radius, so
    /// not even a single cell fits.
    DomainSmallerThanCutoff {
        /// Axis along which the domain is too small.
        axis: usize,
        /// Extent of the domain along that axis.
        extent: Real,
        /// Requested cutoff radius.
        cutoff: Real,
    },
    /// A periodic axis with `upper <= lower` has no period to translate by.
    EmptyPeriodicAxis {
        /// Lower bound of the periodic axis.
        lower: Real,
        /// Upper bound of the periodic axis.
        upper: Real,
    },
    /// The axis index is not a valid axis of the dimension.
    InvalidAxis {
        /// Requested axis.
        axis: usize,
        /// Spatial dimension.
        dimension: usize,
    },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::NonPositiveCutoff(cutoff) => {
                write!(f, "cutoff radius must be positive, got {cutoff}")
            }
            SetupError::DomainSmallerThanCutoff {
                axis,
                extent,
                cutoff,
            } => write!(
                f,
                "domain extent {extent} along axis {axis} is smaller than the cutoff radius {cutoff}"
            ),
            SetupError::EmptyPeriodicAxis { lower, upper } => {
                write!(f, "periodic axis bounds [{lower}, {upper}] enclose no period")
            }
            SetupError::InvalidAxis { axis, dimension } => {
                write!(f, "axis {axis} is not valid in {dimension} dimensions")
            }
        }
    }
}

impl std::error::Error for SetupError {}
