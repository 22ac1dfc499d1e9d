//! Weighted network construction from road, neighborhood and anchor layers.
//!
//! Every road part is exploded into its consecutive coordinate pairs
//! ("elementary segments").  Each non-degenerate segment is weighted by the
//! [`AttractivenessModel`] at its midpoint and emitted as one or two directed
//! edges according to the road's [`Direction`].

use tracing::{debug, info, warn};

use tp_core::{planar, SegmentId};

use crate::attractiveness::{AttractivenessConfig, AttractivenessModel};
use crate::layers::{ArticulationPoint, Direction, Neighborhood, RoadFeature};
use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{NetworkError, NetworkResult};

/// What to do with a road whose `direction` or `length` is malformed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RoadAttributePolicy {
    /// Fail the whole build with [`NetworkError::InvalidRoadAttribute`].
    #[default]
    Abort,
    /// Drop the feature, log a warning, keep building.
    SkipAndWarn,
}

/// Network construction settings.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildConfig {
    pub attractiveness:   AttractivenessConfig,
    pub attribute_policy: RoadAttributePolicy,
}

/// Counters collected during a build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub features: usize,
    /// Features dropped under [`RoadAttributePolicy::SkipAndWarn`].
    pub rejected: Vec<SegmentId>,
    /// Features with no usable geometry.
    pub empty_features: usize,
    /// Zero-length elementary segments skipped.
    pub degenerate_segments: usize,
}

/// Builds a [`RoadNetwork`] from the input layers.
pub struct NetworkBuilder {
    config: BuildConfig,
}

impl NetworkBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Build the network, discarding the report.
    pub fn build(
        &self,
        roads:         &[RoadFeature],
        neighborhoods: &[Neighborhood],
        articulation:  &[ArticulationPoint],
    ) -> NetworkResult<RoadNetwork> {
        self.build_with_report(roads, neighborhoods, articulation)
            .map(|(network, _)| network)
    }

    /// Build the network and return construction counters alongside it.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::EmptyLayer`] when `roads` is empty.
    /// - [`NetworkError::InvalidRoadAttribute`] for a malformed road under
    ///   [`RoadAttributePolicy::Abort`].
    /// - [`NetworkError::Core`] for an invalid attractiveness configuration.
    pub fn build_with_report(
        &self,
        roads:         &[RoadFeature],
        neighborhoods: &[Neighborhood],
        articulation:  &[ArticulationPoint],
    ) -> NetworkResult<(RoadNetwork, BuildReport)> {
        if roads.is_empty() {
            return Err(NetworkError::EmptyLayer("roads"));
        }
        self.config.attractiveness.validate()?;
        if articulation.is_empty() {
            warn!("no articulation points: articulation discount disabled");
        }

        let model = AttractivenessModel::new(
            self.config.attractiveness.clone(),
            articulation,
            neighborhoods,
        );
        debug!(anchors = model.anchor_count(), "attractiveness model ready");

        let mut report = BuildReport { features: roads.len(), ..BuildReport::default() };
        let mut builder = RoadNetworkBuilder::new();

        for road in roads {
            let direction = match validate_road(road) {
                Ok(d) => d,
                Err(e) => match self.config.attribute_policy {
                    RoadAttributePolicy::Abort => return Err(e),
                    RoadAttributePolicy::SkipAndWarn => {
                        warn!("skipping road: {e}");
                        report.rejected.push(road.id);
                        continue;
                    }
                },
            };

            let parts: Vec<_> = road.geometry.0.iter().filter(|l| l.0.len() >= 2).collect();
            if parts.is_empty() {
                debug!(road = %road.id, "road has no usable geometry");
                report.empty_features += 1;
                continue;
            }

            for line in parts {
                for seg in line.lines() {
                    let raw_m = planar::distance(seg.start, seg.end);
                    if raw_m == 0.0 {
                        report.degenerate_segments += 1;
                        continue;
                    }
                    let weight = model.weight(raw_m, planar::midpoint(seg.start, seg.end));
                    let a = builder.node_at(seg.start);
                    let b = builder.node_at(seg.end);
                    match direction {
                        Direction::Bidirectional => builder.add_road(a, b, raw_m, weight, road.id),
                        Direction::Forward => builder.add_directed_edge(a, b, raw_m, weight, road.id),
                        Direction::Reverse => builder.add_directed_edge(b, a, raw_m, weight, road.id),
                    }
                }
            }
        }

        let network = builder.build();
        info!(
            nodes = network.node_count(),
            edges = network.edge_count(),
            rejected = report.rejected.len(),
            degenerate = report.degenerate_segments,
            "road network built"
        );
        Ok((network, report))
    }
}

/// Parse the direction code and check the declared length of one road.
fn validate_road(road: &RoadFeature) -> NetworkResult<Direction> {
    let invalid = |attribute, value: &Option<String>| NetworkError::InvalidRoadAttribute {
        segment: road.id,
        attribute,
        value: value.clone(),
    };

    let direction = road
        .direction
        .as_deref()
        .and_then(|s| s.parse::<Direction>().ok())
        .ok_or_else(|| invalid("direction", &road.direction))?;

    if let Some(len) = road.length.as_deref() {
        let ok = len
            .trim()
            .parse::<f64>()
            .is_ok_and(|v| v.is_finite() && v >= 0.0);
        if !ok {
            return Err(invalid("length", &road.length));
        }
    }

    Ok(direction)
}
