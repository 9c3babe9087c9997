//! Pipeline orchestration for the TopoSpine library.
//!
//! Provides the [`TopoSpine`] runtime entry point, which threads a
//! [`SampleSet`] through every stage and collects the outputs into a
//! [`TopologyReport`].

use tracing::{info, instrument, warn};

use crate::{
    Result,
    basins::assign_basins,
    builder::ExecutionStrategy,
    classify::classify,
    error::TopoSpineError,
    hierarchy::{ExtremumGraphBuilder, MergeWeight, Persistence, Polarity, StoppingRule},
    neighborhood::{NeighborhoodPolicy, build_neighborhood},
    result::TopologyReport,
    samples::SampleSet,
    segmentation::label_segmentation,
    spine::SpineBuilder,
};

/// Entry point for running the topology pipeline.
///
/// # Examples
/// ```
/// use topospine_core::{GridShape, SampleSet, TopoSpineBuilder};
///
/// let samples = SampleSet::from_grid(
///     "ridge",
///     GridShape::new(vec![7]),
///     vec![0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 0.0],
/// )?;
/// let topospine = TopoSpineBuilder::new().with_target_extrema(Some(2)).build()?;
/// let report = topospine.run(&samples)?;
/// let surviving: Vec<_> = report.extremum_graph().nodes().map(|node| node.sample).collect();
/// assert_eq!(surviving, vec![3, 5]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct TopoSpine {
    neighborhood: NeighborhoodPolicy,
    stopping: StoppingRule,
    polarity: Polarity,
    execution_strategy: ExecutionStrategy,
}

impl TopoSpine {
    pub(crate) fn new(
        neighborhood: NeighborhoodPolicy,
        stopping: StoppingRule,
        polarity: Polarity,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            neighborhood,
            stopping,
            polarity,
            execution_strategy,
        }
    }

    /// Returns the neighbourhood policy configured for this instance.
    #[must_use]
    pub fn neighborhood(&self) -> &NeighborhoodPolicy {
        &self.neighborhood
    }

    /// Returns the stopping rule applied to the merge log.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::TopoSpineBuilder;
    ///
    /// let topospine = TopoSpineBuilder::new()
    ///     .with_target_extrema(Some(4))
    ///     .build()
    ///     .expect("builder must accept a non-zero target");
    /// assert_eq!(topospine.stopping_rule().target_extrema(), Some(4));
    /// assert_eq!(topospine.stopping_rule().threshold(), None);
    /// ```
    #[must_use]
    pub fn stopping_rule(&self) -> StoppingRule {
        self.stopping
    }

    /// Returns whether maxima or minima are simplified.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Returns the execution strategy that will be used when running.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Executes the pipeline against `samples`, weighting saddles by
    /// [`Persistence`].
    ///
    /// # Errors
    /// Returns [`TopoSpineError::InsufficientSamples`] for fewer than two
    /// samples, [`TopoSpineError::MissingGridShape`] when a grid policy is
    /// applied to scattered points, [`TopoSpineError::NoClassifiableSamples`]
    /// when every sample is non-finite or isolated, and
    /// [`TopoSpineError::BackendUnavailable`] when the requested execution
    /// strategy is not compiled into this build.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::{GridShape, SampleSet, TopoSpineBuilder, TopoSpineError};
    ///
    /// let samples = SampleSet::from_grid("single", GridShape::new(vec![1]), vec![4.0])?;
    /// let err = TopoSpineBuilder::new()
    ///     .build()?
    ///     .run(&samples)
    ///     .expect_err("one sample has no topology");
    /// assert!(matches!(err, TopoSpineError::InsufficientSamples { samples: 1, .. }));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run(&self, samples: &SampleSet) -> Result<TopologyReport> {
        self.run_with_weight(samples, &Persistence)
    }

    /// Executes the pipeline weighting saddles with `weight`.
    ///
    /// # Errors
    /// See [`Self::run`].
    #[instrument(
        name = "core.run",
        err,
        skip(self, samples, weight),
        fields(
            sample_set = %samples.name(),
            samples = samples.len(),
            polarity = %self.polarity,
            strategy = ?self.execution_strategy,
        ),
    )]
    pub fn run_with_weight<W: MergeWeight + ?Sized>(
        &self,
        samples: &SampleSet,
        weight: &W,
    ) -> Result<TopologyReport> {
        let graph = build_neighborhood(samples, &self.neighborhood, self.execution_strategy)?;
        let excluded = graph.excluded_count();
        if excluded == samples.len() {
            warn!(excluded, "every sample was excluded, returning error");
            return Err(TopoSpineError::NoClassifiableSamples {
                sample_set: samples.name_arc(),
                excluded,
            });
        }

        let classification = classify(samples, &graph, self.execution_strategy)?;
        let basins = assign_basins(&graph, &classification)?;
        let extremum_graph = ExtremumGraphBuilder::new(self.polarity, self.stopping)
            .build_with_weight(samples, &graph, &classification, &basins, weight)?;
        let segmentation = label_segmentation(&basins, &extremum_graph);
        let spine = SpineBuilder.build(&extremum_graph)?;

        info!(
            surviving = extremum_graph.surviving_count(),
            merges = extremum_graph.cancellations().len(),
            excluded,
            "run completed"
        );
        Ok(TopologyReport {
            sample_set: samples.name_arc(),
            neighborhood: graph,
            classification,
            basins,
            extremum_graph,
            segmentation,
            spine,
        })
    }
}
