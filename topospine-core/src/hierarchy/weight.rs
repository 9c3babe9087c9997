//! Merge weights ranking saddle cancellations.

/// Scores the cancellation of the weaker extremum of a saddle.
///
/// The merge loop re-scores a saddle whenever one of its extrema is replaced
/// by a stronger representative. Implementations must not decrease in that
/// case, otherwise executed weights stop being monotone and thresholds lose
/// their meaning.
///
/// Closures of the form `Fn(saddle, weaker, stronger) -> f64` implement the
/// trait.
///
/// # Examples
/// ```
/// use topospine_core::{MergeWeight, Persistence};
///
/// assert_eq!(Persistence.weight(1.0, 5.0, 6.0), 4.0);
///
/// let scaled = |saddle: f64, weaker: f64, _stronger: f64| 2.0 * (weaker - saddle).abs();
/// assert_eq!(scaled.weight(1.0, 5.0, 6.0), 8.0);
/// ```
pub trait MergeWeight {
    /// Returns the cost of merging the `weaker` extremum into the `stronger`
    /// one through a saddle of value `saddle`.
    fn weight(&self, saddle: f64, weaker: f64, stronger: f64) -> f64;
}

/// Classic topological persistence: `|saddle - weaker|`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Persistence;

impl MergeWeight for Persistence {
    fn weight(&self, saddle: f64, weaker: f64, _stronger: f64) -> f64 {
        (saddle - weaker).abs()
    }
}

impl<F> MergeWeight for F
where
    F: Fn(f64, f64, f64) -> f64,
{
    fn weight(&self, saddle: f64, weaker: f64, stronger: f64) -> f64 {
        self(saddle, weaker, stronger)
    }
}
