//! TOML run configuration and command-line overrides.
//!
//! ```toml
//! [network]
//! attribute_policy  = "skip-and-warn"
//! hub               = "Centro"
//! subline_tolerance = 0.01
//! clip_to_study_area = true
//!
//! [attractiveness]
//! min_weight     = 0.1
//! anchor_classes = ["emerging", "consolidated"]
//! emerging       = { radius_m = 2000.0, max_discount = 0.5 }
//!
//! [search]
//! population  = 100
//! generations = 50
//! bounds      = { min = 20, max = 40 }
//! time_budget = { secs = 600, nanos = 0 }
//!
//! [output]
//! dir    = "output"
//! policy = "median"
//! ```
//!
//! Every section and key is optional; missing ones take their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use tp_network::{AttractivenessConfig, BuildConfig, Hub, RoadAttributePolicy};
use tp_search::{FrontPolicy, SearchConfig};

// ── Command line ──────────────────────────────────────────────────────────────

/// Design bus routes over a road network and pick a route portfolio.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Road layer CSV (`id,direction,length,wkt`).
    #[arg(long)]
    pub roads: PathBuf,

    /// Neighborhood layer CSV (`name,class,wkt`).
    #[arg(long)]
    pub neighborhoods: PathBuf,

    /// Articulation-point layer CSV (`wkt`).  Omit to disable the
    /// articulation discount.
    #[arg(long)]
    pub articulation: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Neighborhood every batch route converges on.  Defaults to the
    /// centroid of the whole study area.
    #[arg(long)]
    pub hub: Option<String>,

    /// Front member to materialize: min-cost, max-coverage or median.
    #[arg(long)]
    pub policy: Option<FrontPolicy>,

    /// Directory receiving every output table.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub generations: Option<usize>,

    #[arg(long)]
    pub population: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop the search after this many seconds.
    #[arg(long)]
    pub time_budget_secs: Option<u64>,

    /// Worker threads for fitness evaluation (`parallel` builds only).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Drop roads that touch no neighborhood polygon.
    #[arg(long)]
    pub clip: bool,

    /// Skip malformed road features instead of aborting.
    #[arg(long)]
    pub skip_bad_roads: bool,

    /// Tracing filter, e.g. `debug` or `tp_search=debug,info`.
    /// Falls back to `RUST_LOG`, then `info`.
    #[arg(long)]
    pub log_level: Option<String>,
}

// ── File sections ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkSection {
    pub attribute_policy:   RoadAttributePolicy,
    pub hub:                Option<String>,
    pub subline_tolerance:  f64,
    pub clip_to_study_area: bool,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            attribute_policy:   RoadAttributePolicy::default(),
            hub:                None,
            subline_tolerance:  0.01,
            clip_to_study_area: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputSection {
    pub dir:    PathBuf,
    pub policy: FrontPolicy,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self { dir: PathBuf::from("output"), policy: FrontPolicy::default() }
    }
}

/// The whole run configuration after file and command line are merged.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PlannerConfig {
    pub network:        NetworkSection,
    pub attractiveness: AttractivenessConfig,
    pub search:         SearchConfig,
    pub output:         OutputSection,
}

impl PlannerConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid planner configuration")
    }

    /// Read `path`, or return defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading {}", p.display()))?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    /// Command-line flags win over file values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(hub) = &args.hub {
            self.network.hub = Some(hub.clone());
        }
        if args.clip {
            self.network.clip_to_study_area = true;
        }
        if args.skip_bad_roads {
            self.network.attribute_policy = RoadAttributePolicy::SkipAndWarn;
        }
        if let Some(policy) = args.policy {
            self.output.policy = policy;
        }
        if let Some(dir) = &args.output {
            self.output.dir = dir.clone();
        }
        if let Some(g) = args.generations {
            self.search.generations = g;
        }
        if let Some(p) = args.population {
            self.search.population = p;
        }
        if let Some(s) = args.seed {
            self.search.seed = s;
        }
        if let Some(secs) = args.time_budget_secs {
            self.search.time_budget = Some(Duration::from_secs(secs));
        }
        if args.threads.is_some() {
            self.search.num_threads = args.threads;
        }
    }

    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            attractiveness:   self.attractiveness.clone(),
            attribute_policy: self.network.attribute_policy,
        }
    }

    pub fn hub(&self) -> Hub {
        match &self.network.hub {
            Some(name) if !name.trim().is_empty() => Hub::Named(name.trim().to_owned()),
            _ => Hub::StudyArea,
        }
    }
}
