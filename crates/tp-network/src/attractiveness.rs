//! Attractiveness weighting of road segments.
//!
//! A segment's routing cost is its length shrunk by two independent
//! discounts, both evaluated at the segment midpoint:
//!
//! ```text
//! d_a = max(0, 1 − dist(nearest articulation point) / R_a) · k_a
//! d_p = max(0, 1 − dist(nearest anchor centroid)   / R_c) · k_c   (R_c, k_c by anchor class)
//! d   = d_a + d_p − d_a·d_p
//! w   = max(len · (1 − d), min_weight)
//! ```
//!
//! The floor applies to every segment, including ones shorter than
//! `min_weight`: no edge costs less than `min_weight`.

use geo::Coord;

use tp_core::{planar, CoreError, CoreResult};

use crate::index::{GeometryIndex, RTreeIndex};
use crate::layers::{ArticulationPoint, DevelopmentClass, Neighborhood};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Linear fall-off discount: `max_discount` at distance 0, nothing at
/// `radius_m` and beyond.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscountRule {
    pub radius_m:     f64,
    pub max_discount: f64,
}

impl DiscountRule {
    pub const fn new(radius_m: f64, max_discount: f64) -> Self {
        Self { radius_m, max_discount }
    }

    /// Discount fraction at `distance` metres.
    #[inline]
    pub fn discount(&self, distance: f64) -> f64 {
        if self.radius_m <= 0.0 {
            return 0.0;
        }
        (1.0 - distance / self.radius_m).max(0.0) * self.max_discount
    }
}

/// Tunable constants of the weighting model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttractivenessConfig {
    pub articulation: DiscountRule,
    pub emerging:     DiscountRule,
    pub consolidated: DiscountRule,
    pub planned:      DiscountRule,
    /// Hard floor on discounted weights.
    pub min_weight:   f64,
    /// Classes whose centroids act as pole anchors.
    pub anchor_classes: Vec<DevelopmentClass>,
}

impl Default for AttractivenessConfig {
    fn default() -> Self {
        Self {
            articulation:   DiscountRule::new(1_000.0, 0.4),
            emerging:       DiscountRule::new(2_000.0, 0.5),
            consolidated:   DiscountRule::new(1_500.0, 0.3),
            planned:        DiscountRule::new(1_000.0, 0.1),
            min_weight:     0.1,
            anchor_classes: vec![DevelopmentClass::Emerging, DevelopmentClass::Consolidated],
        }
    }
}

impl AttractivenessConfig {
    /// Pole rule for an anchor of class `class`; `None` class never discounts.
    pub fn rule_for(&self, class: DevelopmentClass) -> Option<DiscountRule> {
        match class {
            DevelopmentClass::None         => None,
            DevelopmentClass::Emerging     => Some(self.emerging),
            DevelopmentClass::Consolidated => Some(self.consolidated),
            DevelopmentClass::Planned      => Some(self.planned),
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        let rules = [
            ("articulation", self.articulation),
            ("emerging", self.emerging),
            ("consolidated", self.consolidated),
            ("planned", self.planned),
        ];
        for (name, rule) in rules {
            if !(rule.radius_m > 0.0) {
                return Err(CoreError::Config(format!("{name}: radius must be positive")));
            }
            if !(0.0..=1.0).contains(&rule.max_discount) {
                return Err(CoreError::Config(format!("{name}: max discount must be in [0, 1]")));
            }
        }
        if !(self.min_weight > 0.0) {
            return Err(CoreError::Config("min_weight must be positive".into()));
        }
        Ok(())
    }
}

// ── Pure functions ────────────────────────────────────────────────────────────

/// Probabilistic OR of two discounts; stays in [0, 1] when both inputs do.
#[inline]
pub fn combine_discounts(d_a: f64, d_p: f64) -> f64 {
    d_a + d_p - d_a * d_p
}

/// Apply `discount` to `raw_length`, never going below `min_weight`.
///
/// The floor wins even for segments shorter than `min_weight`, so no edge
/// is ever cheaper than the floor.
#[inline]
pub fn discounted_weight(raw_length: f64, discount: f64, min_weight: f64) -> f64 {
    (raw_length * (1.0 - discount)).max(min_weight)
}

// ── AttractivenessModel ───────────────────────────────────────────────────────

/// Weighting model bound to one set of articulation points and anchors.
pub struct AttractivenessModel {
    config:       AttractivenessConfig,
    articulation: RTreeIndex,
    articulation_pos: Vec<Coord<f64>>,
    anchors:      RTreeIndex,
    anchor_pos:   Vec<Coord<f64>>,
    anchor_class: Vec<DevelopmentClass>,
}

impl AttractivenessModel {
    /// Index the articulation points and the centroids of neighborhoods whose
    /// class is listed in `config.anchor_classes`.
    pub fn new(
        config: AttractivenessConfig,
        articulation: &[ArticulationPoint],
        neighborhoods: &[Neighborhood],
    ) -> Self {
        let articulation_pos: Vec<Coord<f64>> = articulation.iter().map(|p| p.position).collect();

        let mut anchor_pos = Vec::new();
        let mut anchor_class = Vec::new();
        for n in neighborhoods {
            let class = n.class();
            if !config.anchor_classes.contains(&class) {
                continue;
            }
            if let Some(c) = n.centroid() {
                anchor_pos.push(c);
                anchor_class.push(class);
            }
        }

        Self {
            articulation: RTreeIndex::new(articulation_pos.iter().copied()),
            anchors: RTreeIndex::new(anchor_pos.iter().copied()),
            config,
            articulation_pos,
            anchor_pos,
            anchor_class,
        }
    }

    pub fn config(&self) -> &AttractivenessConfig {
        &self.config
    }

    pub fn anchor_count(&self) -> usize {
        self.anchor_pos.len()
    }

    /// `d_a` at `at`; zero without articulation points.
    pub fn articulation_discount(&self, at: Coord<f64>) -> f64 {
        match self.articulation.nearest(at) {
            Ok(i) => self.config.articulation.discount(planar::distance(at, self.articulation_pos[i])),
            Err(_) => 0.0,
        }
    }

    /// `d_p` at `at`, using the rule of the nearest anchor's class.
    pub fn pole_discount(&self, at: Coord<f64>) -> f64 {
        let Ok(i) = self.anchors.nearest(at) else {
            return 0.0;
        };
        self.config
            .rule_for(self.anchor_class[i])
            .map_or(0.0, |rule| rule.discount(planar::distance(at, self.anchor_pos[i])))
    }

    /// Combined discount `d` at `at`.
    pub fn discount(&self, at: Coord<f64>) -> f64 {
        combine_discounts(self.articulation_discount(at), self.pole_discount(at))
    }

    /// Discounted weight of a segment of `raw_length` whose midpoint is `midpoint`.
    pub fn weight(&self, raw_length: f64, midpoint: Coord<f64>) -> f64 {
        discounted_weight(raw_length, self.discount(midpoint), self.config.min_weight)
    }
}
