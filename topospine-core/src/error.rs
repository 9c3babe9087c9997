//! Error types for the topospine core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{builder::ExecutionStrategy, samples::SampleId};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while constructing a [`crate::SampleSet`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SampleSetError {
    /// The sample set contained no samples.
    #[error("sample set contains no samples")]
    Empty,
    /// Coordinates must have positive dimension.
    #[error("sample coordinates must have positive dimension")]
    ZeroDimension,
    /// The flat coordinate buffer did not hold `dimension` values per sample.
    #[error("coordinate buffer has {got} values but {expected} were expected")]
    CoordinateLengthMismatch {
        /// Number of coordinate values required by `dimension * samples`.
        expected: usize,
        /// Number of coordinate values supplied.
        got: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("sample {sample} has a non-finite coordinate on axis {axis}")]
    NonFiniteCoordinate {
        /// Sample owning the offending coordinate.
        sample: SampleId,
        /// Axis of the offending coordinate.
        axis: usize,
    },
    /// The grid shape does not describe the number of supplied values.
    #[error("grid shape holds {cells} cells but {values} values were supplied")]
    GridShapeMismatch {
        /// Product of the grid extents.
        cells: usize,
        /// Number of scalar values supplied.
        values: usize,
    },
    /// A grid axis had zero extent.
    #[error("grid axis {axis} has zero extent")]
    ZeroExtent {
        /// Axis with zero extent.
        axis: usize,
    },
    /// Grid origin or spacing did not match the grid rank.
    #[error("grid {field} has {got} components but the grid has rank {rank}")]
    GridRankMismatch {
        /// Which grid property was malformed (`origin` or `spacing`).
        field: &'static str,
        /// Rank of the grid.
        rank: usize,
        /// Number of components supplied.
        got: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`SampleSetError`] variants.
    enum SampleSetErrorCode for SampleSetError {
        /// The sample set contained no samples.
        Empty => Empty => "SAMPLE_SET_EMPTY",
        /// Coordinates must have positive dimension.
        ZeroDimension => ZeroDimension => "SAMPLE_SET_ZERO_DIMENSION",
        /// The coordinate buffer length was wrong.
        CoordinateLengthMismatch => CoordinateLengthMismatch { .. } => "SAMPLE_SET_COORDINATE_LENGTH_MISMATCH",
        /// A coordinate was NaN or infinite.
        NonFiniteCoordinate => NonFiniteCoordinate { .. } => "SAMPLE_SET_NON_FINITE_COORDINATE",
        /// The grid shape does not match the values.
        GridShapeMismatch => GridShapeMismatch { .. } => "SAMPLE_SET_GRID_SHAPE_MISMATCH",
        /// A grid axis had zero extent.
        ZeroExtent => ZeroExtent { .. } => "SAMPLE_SET_ZERO_EXTENT",
        /// Grid origin or spacing did not match the grid rank.
        GridRankMismatch => GridRankMismatch { .. } => "SAMPLE_SET_GRID_RANK_MISMATCH",
    }
}

/// Per-sample data problem recorded in [`crate::Diagnostics`].
///
/// These never abort a run; the affected sample is excluded from the
/// neighbourhood graph and from basin assignment.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleDataError {
    /// The scalar value was NaN or infinite.
    #[error("sample {sample} has non-finite scalar value {value}")]
    NonFiniteValue {
        /// Rejected sample.
        sample: SampleId,
        /// Offending value.
        value: f64,
    },
}

impl SampleDataError {
    /// Returns the sample the error refers to.
    #[must_use]
    pub const fn sample(&self) -> SampleId {
        match self {
            Self::NonFiniteValue { sample, .. } => *sample,
        }
    }
}

/// Error type produced when configuring or running [`crate::TopoSpine`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TopoSpineError {
    /// Grid stencils need a radius of at least one.
    #[error("grid stencil radius must be at least 1 (got {got})")]
    InvalidGridRadius {
        /// The radius supplied by the caller.
        got: usize,
    },
    /// k-NN neighbourhoods need at least one neighbour.
    #[error("k-NN neighbourhood requires k >= 1 (got {got})")]
    InvalidNeighbourCount {
        /// The `k` supplied by the caller.
        got: usize,
    },
    /// The simplification threshold was negative or NaN.
    #[error("simplification threshold must be a non-negative number (got {got})")]
    InvalidThreshold {
        /// The threshold supplied by the caller.
        got: f64,
    },
    /// The target extremum count was zero.
    #[error("target extremum count must be at least 1 (got {got})")]
    InvalidTargetExtrema {
        /// The target supplied by the caller.
        got: usize,
    },
    /// The sample set had fewer samples than any neighbourhood needs.
    #[error("sample set `{sample_set}` has {samples} samples but at least {required} are required")]
    InsufficientSamples {
        /// Name of the undersized sample set.
        sample_set: Arc<str>,
        /// Number of samples available.
        samples: usize,
        /// Minimum number of samples the pipeline accepts.
        required: usize,
    },
    /// A grid policy was requested for samples without a grid layout.
    #[error("sample set `{sample_set}` has no grid shape; grid neighbourhoods need one")]
    MissingGridShape {
        /// Name of the sample set lacking a grid shape.
        sample_set: Arc<str>,
    },
    /// Every sample was excluded as non-finite or isolated.
    #[error("sample set `{sample_set}` has no classifiable samples ({excluded} excluded)")]
    NoClassifiableSamples {
        /// Name of the sample set.
        sample_set: Arc<str>,
        /// Number of excluded samples.
        excluded: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// Constructing the sample set failed.
    #[error(transparent)]
    SampleSet(#[from] SampleSetError),
    /// An internal invariant was violated, indicating a logic error.
    #[error("topology invariant violated: {invariant} (sample {sample})")]
    InvariantViolation {
        /// Name of the violated invariant to assist debugging.
        invariant: &'static str,
        /// Sample at which the violation was detected.
        sample: SampleId,
    },
}

define_error_codes! {
    /// Stable codes describing [`TopoSpineError`] variants.
    enum TopoSpineErrorCode for TopoSpineError {
        /// Grid stencils need a radius of at least one.
        InvalidGridRadius => InvalidGridRadius { .. } => "TOPOSPINE_INVALID_GRID_RADIUS",
        /// k-NN neighbourhoods need at least one neighbour.
        InvalidNeighbourCount => InvalidNeighbourCount { .. } => "TOPOSPINE_INVALID_NEIGHBOUR_COUNT",
        /// The simplification threshold was negative or NaN.
        InvalidThreshold => InvalidThreshold { .. } => "TOPOSPINE_INVALID_THRESHOLD",
        /// The target extremum count was zero.
        InvalidTargetExtrema => InvalidTargetExtrema { .. } => "TOPOSPINE_INVALID_TARGET_EXTREMA",
        /// The sample set had too few samples.
        InsufficientSamples => InsufficientSamples { .. } => "TOPOSPINE_INSUFFICIENT_SAMPLES",
        /// A grid policy was requested for samples without a grid layout.
        MissingGridShape => MissingGridShape { .. } => "TOPOSPINE_MISSING_GRID_SHAPE",
        /// Every sample was excluded.
        NoClassifiableSamples => NoClassifiableSamples { .. } => "TOPOSPINE_NO_CLASSIFIABLE_SAMPLES",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "TOPOSPINE_BACKEND_UNAVAILABLE",
        /// Constructing the sample set failed.
        SampleSetFailure => SampleSet { .. } => "TOPOSPINE_SAMPLE_SET_FAILURE",
        /// An internal invariant was violated.
        InvariantViolation => InvariantViolation { .. } => "TOPOSPINE_INVARIANT_VIOLATION",
    }
}

impl TopoSpineError {
    /// Retrieve the inner [`SampleSetErrorCode`] when the error originated in
    /// sample set construction.
    pub const fn sample_set_code(&self) -> Option<SampleSetErrorCode> {
        match self {
            Self::SampleSet(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TopoSpineError>;
