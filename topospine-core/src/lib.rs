//! TopoSpine core library.
//!
//! Scalar-field topology over sampled data: critical points, basins,
//! persistence simplification of the extremum graph, and a nested spine
//! layout of the resulting hierarchy.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod basins;
mod builder;
mod classify;
mod distance;
mod error;
mod hierarchy;
mod neighborhood;
mod parallel;
mod result;
mod samples;
mod segmentation;
mod spine;
#[cfg(test)]
mod test_utils;
mod topospine;
mod union_find;

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub use crate::spine::{LandscapeDocument, LandscapeNode};
pub use crate::{
    basins::{Basins, SaddleBasins, assign_basins},
    builder::{ExecutionStrategy, TopoSpineBuilder},
    classify::{
        Classification, CriticalCounts, CriticalKind, CriticalPoint, classify, compare_samples,
    },
    distance::DistanceMetric,
    error::{
        Result, SampleDataError, SampleSetError, SampleSetErrorCode, TopoSpineError,
        TopoSpineErrorCode,
    },
    hierarchy::{
        CurvePoint, ExtremumGraph, ExtremumGraphBuilder, ExtremumNode, MergeEvent, MergeWeight,
        Persistence, Polarity, SaddleEdge, StoppingRule,
    },
    neighborhood::{MIN_SAMPLES, NeighborhoodGraph, NeighborhoodPolicy, Stencil, build_neighborhood},
    result::{Diagnostics, TopologyReport},
    samples::{GridShape, SampleId, SampleSet},
    segmentation::{Segmentation, label_segmentation},
    spine::{Spine, SpineBuilder, SpineEdge, SpineEntry, SpineRange},
    topospine::TopoSpine,
};
