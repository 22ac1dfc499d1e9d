//! Portfolio representation and genetic operators.
//!
//! A [`Portfolio`] is an ordered list of [`Gene`]s, each an (origin,
//! destination) pair of distinct neighborhood indices.  Operators never leave
//! a portfolio outside its [`PortfolioBounds`].

use std::fmt;

use tp_core::{NeighborhoodId, SearchRng};

use crate::config::PortfolioBounds;

// ── Gene ──────────────────────────────────────────────────────────────────────

/// One neighborhood pair to be connected by a route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gene {
    pub origin:      NeighborhoodId,
    pub destination: NeighborhoodId,
}

impl Gene {
    pub fn new(origin: NeighborhoodId, destination: NeighborhoodId) -> Self {
        Self { origin, destination }
    }

    /// Direction-independent key, lower index first.
    #[inline]
    pub fn key(&self) -> (u32, u32) {
        let (a, b) = (self.origin.0, self.destination.0);
        if a <= b { (a, b) } else { (b, a) }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin.0, self.destination.0)
    }
}

// ── Portfolio ─────────────────────────────────────────────────────────────────

/// A candidate route set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portfolio {
    pub genes: Vec<Gene>,
}

impl Portfolio {
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl fmt::Display for Portfolio {
    /// Genes joined by spaces, e.g. `0-3 2-5 1-4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, g) in self.genes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{g}")?;
        }
        Ok(())
    }
}

// ── GeneSampler ───────────────────────────────────────────────────────────────

/// Draws random genes over a universe of `n ≥ 2` neighborhoods.
#[derive(Copy, Clone, Debug)]
pub struct GeneSampler {
    universe: usize,
}

impl GeneSampler {
    /// `None` when fewer than two neighborhoods exist: no distinct pair can
    /// be drawn.
    pub fn new(universe: usize) -> Option<Self> {
        (universe >= 2 && u32::try_from(universe).is_ok()).then_some(Self { universe })
    }

    pub fn universe(&self) -> usize {
        self.universe
    }

    /// A uniformly random pair of distinct neighborhoods.
    pub fn gene(&self, rng: &mut SearchRng) -> Gene {
        // `universe >= 2` is checked in `new`.
        let (a, b) = rng.distinct_pair(self.universe).unwrap_or((0, 1));
        Gene::new(NeighborhoodId(a as u32), NeighborhoodId(b as u32))
    }

    /// A random portfolio whose length is uniform in `bounds`.
    pub fn portfolio(&self, bounds: PortfolioBounds, rng: &mut SearchRng) -> Portfolio {
        let len = rng.gen_range(bounds.min..=bounds.max);
        Portfolio::new((0..len).map(|_| self.gene(rng)).collect())
    }
}

// ── Crossover ─────────────────────────────────────────────────────────────────

/// Two-point crossover in place.
///
/// Two cut points `c1 < c2` are drawn within the shorter parent and the slice
/// `[c1, c2)` is swapped between the parents, so both keep their lengths.
/// Returns `false` (and leaves both untouched) when the shorter parent has
/// fewer than two genes.
pub fn two_point_crossover(a: &mut Portfolio, b: &mut Portfolio, rng: &mut SearchRng) -> bool {
    let size = a.len().min(b.len());
    if size < 2 {
        return false;
    }
    let c1 = rng.gen_range(1..=size);
    let mut c2 = rng.gen_range(1..size);
    let (lo, hi) = if c2 >= c1 {
        c2 += 1;
        (c1, c2)
    } else {
        (c2, c1)
    };
    a.genes[lo..hi].swap_with_slice(&mut b.genes[lo..hi]);
    true
}

// ── Mutation ──────────────────────────────────────────────────────────────────

/// The edit applied by [`mutate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    Delete,
    Append,
    Replace,
}

/// Apply exactly one randomly chosen edit allowed by `bounds`.
///
/// Delete needs `len > min`, append needs `len < max`; replace is always
/// allowed on a non-empty portfolio.  An empty portfolio can only grow.
pub fn mutate(
    portfolio: &mut Portfolio,
    sampler:   &GeneSampler,
    bounds:    PortfolioBounds,
    rng:       &mut SearchRng,
) -> Mutation {
    let len = portfolio.len();
    let mut allowed = Vec::with_capacity(3);
    if len > bounds.min {
        allowed.push(Mutation::Delete);
    }
    if len < bounds.max {
        allowed.push(Mutation::Append);
    }
    if len > 0 {
        allowed.push(Mutation::Replace);
    }

    let choice = rng.choose(&allowed).copied().unwrap_or(Mutation::Append);
    match choice {
        Mutation::Delete => {
            let i = rng.gen_range(0..len);
            portfolio.genes.remove(i);
        }
        Mutation::Append => {
            portfolio.genes.push(sampler.gene(rng));
        }
        Mutation::Replace => {
            let i = rng.gen_range(0..len);
            portfolio.genes[i] = sampler.gene(rng);
        }
    }
    choice
}
