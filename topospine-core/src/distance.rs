//! Distance metrics for k-nearest-neighbour neighbourhoods.
//!
//! Coordinates are validated as finite when a [`crate::SampleSet`] is built,
//! so the metrics here are infallible.

use core::fmt;

/// Metric used to rank candidate neighbours.
///
/// # Examples
/// ```
/// use topospine_core::DistanceMetric;
///
/// let a = [0.0, 0.0];
/// let b = [3.0, 4.0];
/// assert_eq!(DistanceMetric::Euclidean.distance(&a, &b), 5.0);
/// assert_eq!(DistanceMetric::Manhattan.distance(&a, &b), 7.0);
/// assert_eq!(DistanceMetric::Chebyshev.distance(&a, &b), 4.0);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMetric {
    /// Straight-line (L2) distance.
    #[default]
    Euclidean,
    /// Sum of absolute axis differences (L1).
    Manhattan,
    /// Largest absolute axis difference (L∞).
    Chebyshev,
}

impl DistanceMetric {
    /// Computes the distance between two equally sized coordinate vectors.
    ///
    /// Extra components of the longer slice are ignored.
    #[must_use]
    pub fn distance(self, left: &[f64], right: &[f64]) -> f64 {
        let diffs = left.iter().zip(right).map(|(a, b)| (a - b).abs());
        match self {
            Self::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Self::Manhattan => diffs.sum(),
            Self::Chebyshev => diffs.fold(0.0, f64::max),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => f.write_str("euclidean"),
            Self::Manhattan => f.write_str("manhattan"),
            Self::Chebyshev => f.write_str("chebyshev"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coords(dim: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        (
            prop::collection::vec(-1.0e3..1.0e3f64, dim),
            prop::collection::vec(-1.0e3..1.0e3f64, dim),
        )
    }

    proptest! {
        #[test]
        fn metrics_are_symmetric_and_ordered((a, b) in (1usize..6).prop_flat_map(coords)) {
            for metric in [DistanceMetric::Euclidean, DistanceMetric::Manhattan, DistanceMetric::Chebyshev] {
                prop_assert_eq!(metric.distance(&a, &b), metric.distance(&b, &a));
                prop_assert_eq!(metric.distance(&a, &a), 0.0);
            }
            let chebyshev = DistanceMetric::Chebyshev.distance(&a, &b);
            let euclidean = DistanceMetric::Euclidean.distance(&a, &b);
            let manhattan = DistanceMetric::Manhattan.distance(&a, &b);
            prop_assert!(chebyshev <= euclidean + 1e-9);
            prop_assert!(euclidean <= manhattan + 1e-9);
        }
    }
}
