//! Landscape documents for the WebGL spine viewer.
//!
//! The viewer reads `{ nodes: [...], link: ["i-j", ...] }` where every node
//! has a 2-D `position` and a `functionValue`, and each link names two
//! indices into `nodes`.

use serde::{Deserialize, Serialize};

use super::Spine;
use crate::samples::SampleId;

/// One spine node as consumed by the landscape viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandscapeNode {
    /// Extremum sample.
    pub index: SampleId,
    /// `[spine position, scalar value]`.
    pub position: [f64; 2],
    /// Scalar value at the extremum.
    #[serde(rename = "functionValue")]
    pub function_value: f64,
    /// Persistence in the full hierarchy; `None` for the strongest extremum
    /// of a component.
    pub persistence: Option<f64>,
}

/// Landscape viewer document: surviving extrema and the merges joining
/// them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandscapeDocument {
    /// Surviving extrema ordered by spine position.
    pub nodes: Vec<LandscapeNode>,
    /// `"i-j"` pairs of indices into `nodes`.
    pub link: Vec<String>,
}

impl Spine {
    /// Exports the surviving part of the spine as a landscape document.
    ///
    /// Links are the merges simplification did not apply; they always join
    /// two surviving extrema.
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
    /// let report = TopoSpineBuilder::new().with_target_extrema(Some(2)).build()?.run(&samples)?;
    /// let document = report.spine().to_landscape();
    /// assert_eq!(document.nodes.len(), 2);
    /// assert_eq!(document.link, vec!["0-1".to_owned()]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn to_landscape(&self) -> LandscapeDocument {
        let surviving: Vec<_> = self.surviving().collect();
        let node_index = |extremum: SampleId| {
            surviving
                .iter()
                .position(|entry| entry.extremum == extremum)
        };
        let nodes = surviving
            .iter()
            .map(|entry| LandscapeNode {
                index: entry.extremum,
                position: entry.point(),
                function_value: entry.value,
                persistence: entry.persistence.is_finite().then_some(entry.persistence),
            })
            .collect();
        let link = self
            .edges()
            .iter()
            .filter(|edge| !edge.cancelled)
            .filter_map(|edge| {
                let source = node_index(edge.absorbed)?;
                let target = node_index(edge.survivor)?;
                Some(format!("{source}-{target}"))
            })
            .collect();
        LandscapeDocument { nodes, link }
    }
}
