//! Unit tests for neighbourhood graph construction.

use rstest::rstest;

use super::*;
use crate::{error::TopoSpineErrorCode, samples::GridShape};

fn grid_1d(values: Vec<f64>) -> SampleSet {
    SampleSet::from_grid("line", GridShape::new(vec![values.len()]), values)
        .expect("valid grid")
}

#[test]
fn grid_line_links_adjacent_cells() {
    let samples = grid_1d(vec![0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 0.0]);
    let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Sequential)
        .expect("graph builds");

    assert_eq!(graph.len(), 7);
    assert_eq!(graph.neighbours(0), &[1]);
    assert_eq!(graph.neighbours(3), &[2, 4]);
    assert_eq!(graph.neighbours(6), &[5]);
    assert_eq!(graph.edge_count(), 6);
    assert_eq!(graph.component_count(), 1);
    assert!(graph.isolated().is_empty());
}

#[test]
fn non_finite_values_split_components_and_are_reported() {
    let samples = grid_1d(vec![0.0, 1.0, f64::NAN, 2.0, 3.0]);
    let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Sequential)
        .expect("graph builds");

    assert_eq!(graph.non_finite().len(), 1);
    assert_eq!(graph.non_finite()[0].sample(), 2);
    assert!(graph.neighbours(2).is_empty());
    assert_eq!(graph.neighbours(1), &[0]);
    assert_eq!(graph.component_count(), 2);
    assert_ne!(graph.component(0), graph.component(4));
    assert_eq!(graph.component(2), None);
}

#[test]
fn samples_cut_off_by_non_finite_neighbours_are_isolated() {
    let samples = grid_1d(vec![f64::INFINITY, 1.0, f64::NAN, 2.0, 3.0]);
    let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Sequential)
        .expect("graph builds");

    assert_eq!(graph.isolated(), &[1]);
    assert_eq!(graph.excluded_count(), 3);
    assert!(!graph.is_active(1));
    assert!(graph.is_active(3));
}

#[test]
fn knn_lists_are_symmetrised() {
    // Sample 2 is far away: its nearest neighbour is 1 but nobody picks 2.
    let samples = SampleSet::from_points(
        "points",
        1,
        vec![0.0, 1.0, 10.0],
        vec![0.0, 1.0, 2.0],
    )
    .expect("valid points");
    let graph = build_neighborhood(&samples, &NeighborhoodPolicy::knn(1), ExecutionStrategy::Sequential)
        .expect("graph builds");

    assert!(graph.contains_edge(1, 2));
    assert!(graph.contains_edge(2, 1));
    assert_eq!(graph.neighbours(1), &[0, 2]);
    assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
}

#[rstest]
#[case(ExecutionStrategy::Sequential)]
#[case(ExecutionStrategy::Auto)]
fn strategies_agree(#[case] strategy: ExecutionStrategy) {
    let values: Vec<f64> = (0..30).map(|i| f64::from(i * 7 % 11)).collect();
    let samples = SampleSet::from_grid("plane", GridShape::new(vec![6, 5]), values).expect("valid grid");
    let reference = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Sequential)
        .expect("graph builds");
    let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), strategy).expect("graph builds");
    assert_eq!(graph, reference);
}

#[rstest]
#[case::single_sample(
    SampleSet::from_points("one", 1, vec![0.0], vec![1.0]).expect("valid"),
    NeighborhoodPolicy::knn(1),
    TopoSpineErrorCode::InsufficientSamples,
)]
#[case::grid_without_shape(
    SampleSet::from_points("two", 1, vec![0.0, 1.0], vec![1.0, 2.0]).expect("valid"),
    NeighborhoodPolicy::grid(1),
    TopoSpineErrorCode::MissingGridShape,
)]
#[case::zero_k(
    SampleSet::from_points("two", 1, vec![0.0, 1.0], vec![1.0, 2.0]).expect("valid"),
    NeighborhoodPolicy::knn(0),
    TopoSpineErrorCode::InvalidNeighbourCount,
)]
fn build_rejects_unusable_inputs(
    #[case] samples: SampleSet,
    #[case] policy: NeighborhoodPolicy,
    #[case] expected: TopoSpineErrorCode,
) {
    let err = build_neighborhood(&samples, &policy, ExecutionStrategy::Sequential)
        .expect_err("input must be rejected");
    assert_eq!(err.code(), expected);
}

#[test]
fn random_clouds_give_every_sample_at_least_k_neighbours() {
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    let mut rng = SmallRng::seed_from_u64(17);
    let coordinates: Vec<f64> = (0..120).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let values: Vec<f64> = (0..40).map(|_| rng.gen_range(0.0..1.0)).collect();
    let samples = SampleSet::from_points("cloud", 3, coordinates, values).expect("valid points");
    let policy = NeighborhoodPolicy::knn(4);

    let graph = build_neighborhood(&samples, &policy, ExecutionStrategy::Sequential)
        .expect("graph builds");
    for sample in 0..graph.len() {
        assert!(graph.neighbours(sample).len() >= 4, "sample {sample} is under-connected");
        for &other in graph.neighbours(sample) {
            assert!(graph.contains_edge(other, sample));
        }
    }
    let parallel = build_neighborhood(&samples, &policy, ExecutionStrategy::Auto).expect("graph builds");
    assert_eq!(parallel, graph);
}

#[test]
fn radii_beyond_the_grid_link_every_cell() {
    let samples = grid_1d(vec![1.0, 3.0, 2.0]);
    let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(usize::MAX), ExecutionStrategy::Sequential)
        .expect("graph builds");
    assert_eq!(graph.neighbours(0), &[1, 2]);
    assert_eq!(graph.neighbours(1), &[0, 2]);
    assert_eq!(graph.edge_count(), 3);
}
