//! Unit tests for critical-point classification.

use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::{neighborhood::NeighborhoodPolicy, samples::GridShape, test_utils::grid_pipeline_input};

fn classify_grid(extents: Vec<usize>, values: Vec<f64>, policy: NeighborhoodPolicy) -> Classification {
    let (samples, graph) = grid_pipeline_input(extents, values, policy);
    classify(&samples, &graph, ExecutionStrategy::Sequential).expect("classification succeeds")
}

#[test]
fn scenario_line_has_three_maxima_and_four_minima() {
    let classification = classify_grid(
        vec![7],
        vec![0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 0.0],
        NeighborhoodPolicy::grid(1),
    );

    assert_eq!(classification.samples_of(CriticalKind::Maximum), vec![1, 3, 5]);
    assert_eq!(classification.samples_of(CriticalKind::Minimum), vec![0, 2, 4, 6]);
    assert_eq!(
        classification.counts(),
        CriticalCounts { minima: 4, maxima: 3, saddles: 0, regular: 0 },
    );
}

#[rstest]
#[case::equal_values_order_by_id(vec![2.0, 2.0, 2.0], vec![0], vec![2])]
#[case::plateau_then_peak(vec![1.0, 1.0, 3.0], vec![0], vec![2])]
fn ties_resolve_by_sample_id(
    #[case] values: Vec<f64>,
    #[case] minima: Vec<SampleId>,
    #[case] maxima: Vec<SampleId>,
) {
    let len = values.len();
    let classification = classify_grid(vec![len], values, NeighborhoodPolicy::grid(1));
    assert_eq!(classification.samples_of(CriticalKind::Minimum), minima);
    assert_eq!(classification.samples_of(CriticalKind::Maximum), maxima);
}

#[test]
fn steepest_pointers_prefer_lowest_id_among_equal_values() {
    // Centre of a 3x3 cross stencil with two equal highest neighbours.
    let values = vec![
        0.0, 9.0, 0.0, //
        1.0, 5.0, 9.0, //
        0.0, 2.0, 0.0,
    ];
    let classification = classify_grid(vec![3, 3], values, NeighborhoodPolicy::Grid {
        radius: 1,
        stencil: crate::Stencil::Cross,
    });
    let centre = classification.point(4).expect("centre is active");
    assert_eq!(centre.ascent(), Some(1));
    assert_eq!(centre.descent(), Some(3));
}

#[test]
fn monkey_saddle_in_the_plane_has_split_links() {
    // Cross stencil: higher and lower edge cells alternate around the
    // centre and no two of them touch.
    let values = vec![
        9.0, 4.0, 0.0, //
        4.0, 5.0, 6.0, //
        0.0, 6.0, 9.0,
    ];
    let classification = classify_grid(vec![3, 3], values, NeighborhoodPolicy::Grid {
        radius: 1,
        stencil: crate::Stencil::Cross,
    });
    let centre = classification.point(4).expect("centre is active");
    assert_eq!(centre.kind(), CriticalKind::Saddle);
    assert_eq!(centre.upper_components(), 2);
    assert_eq!(centre.lower_components(), 2);
}

#[test]
fn excluded_samples_have_no_classification() {
    let classification = classify_grid(
        vec![4],
        vec![0.0, f64::NAN, 1.0, 2.0],
        NeighborhoodPolicy::grid(1),
    );
    assert_eq!(classification.kind(0), None);
    assert_eq!(classification.kind(1), None);
    assert_eq!(classification.kind(2), Some(CriticalKind::Minimum));
    assert_eq!(classification.len(), 4);
}

fn check_extrema_match_direct_comparison(values: &[f64]) -> std::result::Result<(), TestCaseError> {
    let samples = SampleSet::from_grid("line", GridShape::new(vec![values.len()]), values.to_vec())
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    let graph = crate::build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Sequential)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    let classification = classify(&samples, &graph, ExecutionStrategy::Sequential)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;

    for sample in 0..values.len() {
        let neighbours = graph.neighbours(sample);
        let higher = neighbours
            .iter()
            .all(|&n| compare_samples(values, sample, n) == Ordering::Greater);
        let lower = neighbours
            .iter()
            .all(|&n| compare_samples(values, sample, n) == Ordering::Less);
        let kind = classification.kind(sample);
        prop_assert_eq!(kind == Some(CriticalKind::Maximum), higher);
        prop_assert_eq!(kind == Some(CriticalKind::Minimum), lower);
        if let Some(point) = classification.point(sample) {
            if let Some(up) = point.ascent() {
                prop_assert_eq!(compare_samples(values, up, sample), Ordering::Greater);
            }
            if let Some(down) = point.descent() {
                prop_assert_eq!(compare_samples(values, down, sample), Ordering::Less);
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(crate::test_utils::suite_proptest_config(64))]

    #[test]
    fn extrema_match_direct_neighbour_comparison(
        values in prop::collection::vec(-4i8..4, 2..40),
    ) {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        check_extrema_match_direct_comparison(&values)?;
    }
}

#[test]
fn compare_samples_orders_in_range_ids() {
    assert_eq!(compare_samples(&[1.0, 1.0], 0, 1), Ordering::Less);
    assert_eq!(compare_samples(&[2.0, 1.0], 0, 1), Ordering::Greater);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn compare_samples_panics_on_out_of_range_ids() {
    let _ = compare_samples(&[1.0, 2.0], 0, 5);
}
