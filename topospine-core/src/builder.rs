//! Builder utilities for configuring TopoSpine runs.
//!
//! Exposes the execution strategy selection surface and the builder
//! validation used before constructing [`TopoSpine`] instances.

use crate::{
    Result,
    hierarchy::{Polarity, StoppingRule},
    neighborhood::NeighborhoodPolicy,
    topospine::TopoSpine,
};

/// Indicates how per-sample stages are scheduled when [`TopoSpine::run`] is
/// invoked.
///
/// Neighbourhood construction and classification are embarrassingly parallel
/// over samples; basin assignment and the merge loop always run on the
/// calling thread. `Auto` uses Rayon when the `parallel` feature is compiled
/// in and falls back to sequential execution otherwise, so results stay
/// identical across builds.
///
/// # Examples
/// ```
/// use topospine_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Allow the library to select the scheduling automatically.
    #[default]
    Auto,
    /// Run every stage on the calling thread.
    Sequential,
    /// Require the Rayon-backed per-sample stages.
    Parallel,
}

impl ExecutionStrategy {
    /// Resolves the strategy to "use worker threads or not".
    ///
    /// # Errors
    /// Returns [`crate::TopoSpineError::BackendUnavailable`] when
    /// `Parallel` is requested from a build without the `parallel` feature.
    pub(crate) fn resolve(self) -> Result<bool> {
        match self {
            Self::Auto => Ok(cfg!(feature = "parallel")),
            Self::Sequential => Ok(false),
            #[cfg(feature = "parallel")]
            Self::Parallel => Ok(true),
            #[cfg(not(feature = "parallel"))]
            Self::Parallel => Err(crate::error::TopoSpineError::BackendUnavailable {
                requested: Self::Parallel,
            }),
        }
    }
}

/// Configures and constructs [`TopoSpine`] instances.
///
/// # Examples
/// ```
/// use topospine_core::{ExecutionStrategy, NeighborhoodPolicy, TopoSpineBuilder};
///
/// let topospine = TopoSpineBuilder::new()
///     .with_neighborhood(NeighborhoodPolicy::knn(6))
///     .with_simplification_threshold(Some(0.25))
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(topospine.stopping_rule().threshold(), Some(0.25));
/// assert_eq!(topospine.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone)]
pub struct TopoSpineBuilder {
    neighborhood: NeighborhoodPolicy,
    threshold: Option<f64>,
    target_extrema: Option<usize>,
    polarity: Polarity,
    execution_strategy: ExecutionStrategy,
}

impl Default for TopoSpineBuilder {
    fn default() -> Self {
        Self {
            neighborhood: NeighborhoodPolicy::default(),
            threshold: None,
            target_extrema: None,
            polarity: Polarity::Maxima,
            execution_strategy: ExecutionStrategy::Auto,
        }
    }
}

impl TopoSpineBuilder {
    /// Creates a builder populated with default parameters: a radius-one box
    /// stencil, no simplification, maxima polarity and automatic scheduling.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::{NeighborhoodPolicy, Polarity, TopoSpineBuilder};
    ///
    /// let builder = TopoSpineBuilder::new();
    /// assert_eq!(builder.neighborhood(), &NeighborhoodPolicy::grid(1));
    /// assert_eq!(builder.simplification_threshold(), None);
    /// assert_eq!(builder.polarity(), Polarity::Maxima);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the neighbourhood policy.
    #[must_use]
    pub fn with_neighborhood(mut self, policy: NeighborhoodPolicy) -> Self {
        self.neighborhood = policy;
        self
    }

    /// Returns the configured neighbourhood policy.
    #[must_use]
    #[rustfmt::skip]
    pub fn neighborhood(&self) -> &NeighborhoodPolicy { &self.neighborhood }

    /// Sets the persistence threshold below which saddles are cancelled.
    ///
    /// `None` simplifies the whole hierarchy; `Some(0.0)` cancels nothing.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::TopoSpineBuilder;
    ///
    /// let builder = TopoSpineBuilder::new().with_simplification_threshold(Some(1.5));
    /// assert_eq!(builder.simplification_threshold(), Some(1.5));
    /// ```
    #[must_use]
    pub fn with_simplification_threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the configured simplification threshold.
    #[must_use]
    #[rustfmt::skip]
    pub fn simplification_threshold(&self) -> Option<f64> { self.threshold }

    /// Stops simplification once at most `target` extrema remain.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::TopoSpineBuilder;
    ///
    /// let builder = TopoSpineBuilder::new().with_target_extrema(Some(2));
    /// assert_eq!(builder.target_extrema(), Some(2));
    /// ```
    #[must_use]
    pub fn with_target_extrema(mut self, target: Option<usize>) -> Self {
        self.target_extrema = target;
        self
    }

    /// Returns the configured target extremum count.
    #[must_use]
    #[rustfmt::skip]
    pub fn target_extrema(&self) -> Option<usize> { self.target_extrema }

    /// Chooses whether the extremum graph tracks maxima or minima.
    #[must_use]
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Returns the configured polarity.
    #[must_use]
    #[rustfmt::skip]
    pub fn polarity(&self) -> Polarity { self.polarity }

    /// Sets the execution strategy to use when running the pipeline.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::{ExecutionStrategy, TopoSpineBuilder};
    ///
    /// let builder = TopoSpineBuilder::new().with_execution_strategy(ExecutionStrategy::Sequential);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Validates the configuration and constructs a [`TopoSpine`] instance.
    ///
    /// # Errors
    /// Returns [`crate::TopoSpineError::InvalidGridRadius`] or
    /// [`crate::TopoSpineError::InvalidNeighbourCount`] for degenerate
    /// neighbourhoods, [`crate::TopoSpineError::InvalidThreshold`] for a
    /// negative or NaN threshold, and
    /// [`crate::TopoSpineError::InvalidTargetExtrema`] for a zero target.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::{TopoSpineBuilder, TopoSpineError};
    ///
    /// let err = TopoSpineBuilder::new()
    ///     .with_simplification_threshold(Some(-1.0))
    ///     .build()
    ///     .expect_err("negative thresholds are rejected");
    /// assert!(matches!(err, TopoSpineError::InvalidThreshold { .. }));
    /// ```
    pub fn build(self) -> Result<TopoSpine> {
        self.neighborhood.validate()?;
        let stopping = StoppingRule::new(self.threshold, self.target_extrema)?;
        Ok(TopoSpine::new(
            self.neighborhood,
            stopping,
            self.polarity,
            self.execution_strategy,
        ))
    }
}
