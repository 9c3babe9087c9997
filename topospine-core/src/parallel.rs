//! Per-sample fan-out shared by the embarrassingly parallel stages.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maps `f` over `0..len`, on Rayon workers when `parallel` is set.
///
/// Output order always follows the index order, so the result does not
/// depend on scheduling.
pub(crate) fn map_indices<T, F>(len: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    #[cfg(feature = "parallel")]
    if parallel {
        return (0..len).into_par_iter().map(f).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;
    (0..len).map(f).collect()
}
