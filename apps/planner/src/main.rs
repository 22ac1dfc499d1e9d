//! planner — end-to-end transit route design.
//!
//! Loads the road, neighborhood and articulation-point layers, builds the
//! attractiveness-weighted network, routes every neighborhood to and from the
//! hub, then searches for a route portfolio balancing distance and coverage.
//!
//! Output directory contents:
//!
//! | File                 | Content                                          |
//! |----------------------|--------------------------------------------------|
//! | `routes_inbound.csv` | hub → neighborhood routes, sublines removed      |
//! | `routes_outbound.csv`| neighborhood → hub routes, sublines removed      |
//! | `history.csv`        | per-generation objective statistics              |
//! | `front.csv`          | final Pareto front                               |
//! | `best_routes.csv`    | routes of the portfolio picked by `--policy`     |

mod config;

#[cfg(test)]
mod tests;

use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tp_io::{
    filter_roads_by_area, load_articulation_points, load_neighborhoods, load_roads,
    write_route_layer, FrontRow, FrontWriter, HistoryObserver, HistoryWriter, OutputWriter,
};
use tp_network::{
    ArticulationPoint, DijkstraRouter, NetworkBuilder, RoutePlanner, SublineFilter, TravelDirection,
};
use tp_search::RouteSetOptimizer;

use config::{Args, PlannerConfig};

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::new(l),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let mut cfg = PlannerConfig::load(args.config.as_deref())?;
    cfg.apply_args(&args);
    run(&args, &cfg)
}

/// Full pipeline; every table lands in `cfg.output.dir`.
fn run(args: &Args, cfg: &PlannerConfig) -> Result<()> {
    fs::create_dir_all(&cfg.output.dir)
        .with_context(|| format!("creating {}", cfg.output.dir.display()))?;
    let out = |name: &str| cfg.output.dir.join(name);

    // 1. Layers.
    let mut roads = load_roads(&args.roads)?;
    let neighborhoods = load_neighborhoods(&args.neighborhoods)?;
    let articulation: Vec<ArticulationPoint> = match &args.articulation {
        Some(path) => load_articulation_points(path)?,
        None => Vec::new(),
    };
    if cfg.network.clip_to_study_area {
        roads = filter_roads_by_area(roads, &neighborhoods);
    }

    // 2. Weighted network.
    let (network, report) = NetworkBuilder::new(cfg.build_config())
        .build_with_report(&roads, &neighborhoods, &articulation)?;
    if !report.rejected.is_empty() {
        warn!(rejected = report.rejected.len(), "malformed road features skipped");
    }

    // 3. Hub routes per direction, sublines removed.
    let planner = RoutePlanner::new(&network, DijkstraRouter)?;
    let hub = cfg.hub();
    let filter = SublineFilter::new(cfg.network.subline_tolerance);
    for (direction, file) in [
        (TravelDirection::Inbound, "routes_inbound.csv"),
        (TravelDirection::Outbound, "routes_outbound.csv"),
    ] {
        let routes = planner.batch_routes(&neighborhoods, &hub, direction)?;
        let kept = filter.filter(routes).kept;
        write_route_layer(&out(file), &kept, &neighborhoods)?;
    }

    // 4. Portfolio search.
    let optimizer = RouteSetOptimizer::new(&network, &neighborhoods, cfg.search.clone())?;
    let mut observer = HistoryObserver::new(HistoryWriter::new(&out("history.csv"))?);
    let t0 = Instant::now();
    let outcome = optimizer.run(&mut observer)?;
    let elapsed = t0.elapsed();
    if let Some(e) = observer.take_error() {
        warn!("history not written: {e}");
    }

    let mut front = FrontWriter::new(&out("front.csv"))?;
    front.write_rows(&FrontRow::from_outcome(&outcome))?;
    front.finish()?;

    // 5. Chosen portfolio.
    let best = outcome.select(cfg.output.policy)?;
    let routes = optimizer.materialize(best);
    write_route_layer(&out("best_routes.csv"), &routes, &neighborhoods)?;
    info!(
        policy = %cfg.output.policy,
        genes = best.portfolio.len(),
        routes = routes.len(),
        distance = best.fitness.distance,
        uncovered = best.fitness.uncovered,
        "portfolio chosen"
    );

    // 6. Summary.
    println!("Search complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "  generations: {}  |  front: {}  |  cached pairs: {}",
        outcome.completed_generations,
        outcome.front.len(),
        outcome.cache.entries
    );
    println!();
    println!("{:<6} {:<30} {:>8} {:>12}", "Route", "Origin", "Served", "Length (m)");
    println!("{}", "-".repeat(60));
    for route in &routes {
        let origin = route
            .origin
            .and_then(|id| neighborhoods.get(id.index()))
            .map_or("-", |n| n.name.as_str());
        println!("{:<6} {:<30} {:>8} {:>12.1}", route.id, origin, route.served.len(), route.length_m);
    }

    Ok(())
}
