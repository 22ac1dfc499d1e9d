//! Tests for the planner binary.

#[cfg(test)]
mod config_tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use tp_network::{DevelopmentClass, Hub, RoadAttributePolicy};
    use tp_search::{FrontPolicy, PortfolioBounds};

    use crate::config::{Args, PlannerConfig};

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = PlannerConfig::from_toml("").unwrap();
        assert_eq!(cfg.network.attribute_policy, RoadAttributePolicy::Abort);
        assert_eq!(cfg.network.subline_tolerance, 0.01);
        assert_eq!(cfg.output.dir, PathBuf::from("output"));
        assert_eq!(cfg.output.policy, FrontPolicy::Median);
        assert_eq!(cfg.search.population, 100);
        assert_eq!(cfg.hub(), Hub::StudyArea);
    }

    #[test]
    fn sections_parse() {
        let cfg = PlannerConfig::from_toml(
            r#"
            [network]
            attribute_policy = "skip-and-warn"
            hub = "  Centro "

            [attractiveness]
            min_weight = 0.2
            anchor_classes = ["planned"]

            [search]
            generations = 5
            bounds = { min = 2, max = 4 }
            time_budget = { secs = 30, nanos = 0 }

            [output]
            policy = "max-coverage"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.network.attribute_policy, RoadAttributePolicy::SkipAndWarn);
        assert_eq!(cfg.hub(), Hub::Named("Centro".into()));
        assert_eq!(cfg.attractiveness.min_weight, 0.2);
        assert_eq!(cfg.attractiveness.anchor_classes, vec![DevelopmentClass::Planned]);
        assert_eq!(cfg.search.generations, 5);
        assert_eq!(cfg.search.population, 100);
        assert_eq!(cfg.search.bounds, PortfolioBounds { min: 2, max: 4 });
        assert_eq!(cfg.search.time_budget, Some(Duration::from_secs(30)));
        assert_eq!(cfg.output.policy, FrontPolicy::MaxCoverage);
        assert_eq!(cfg.build_config().attribute_policy, RoadAttributePolicy::SkipAndWarn);
    }

    #[test]
    fn unknown_policy_rejected() {
        assert!(PlannerConfig::from_toml("[output]\npolicy = \"cheapest\"\n").is_err());
    }

    #[test]
    fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PlannerConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
        assert!(PlannerConfig::load(None).is_ok());
    }

    #[test]
    fn flags_override_file() {
        let mut cfg = PlannerConfig::from_toml("[search]\nseed = 1\ngenerations = 9\n").unwrap();
        let args = Args {
            hub: Some("Norte".into()),
            policy: Some(FrontPolicy::MinCost),
            seed: Some(7),
            time_budget_secs: Some(2),
            skip_bad_roads: true,
            clip: true,
            ..Args::default()
        };
        cfg.apply_args(&args);
        assert_eq!(cfg.search.seed, 7);
        assert_eq!(cfg.search.generations, 9);
        assert_eq!(cfg.search.time_budget, Some(Duration::from_secs(2)));
        assert_eq!(cfg.output.policy, FrontPolicy::MinCost);
        assert_eq!(cfg.network.attribute_policy, RoadAttributePolicy::SkipAndWarn);
        assert!(cfg.network.clip_to_study_area);
        assert_eq!(cfg.hub(), Hub::Named("Norte".into()));
    }

    #[test]
    fn blank_hub_means_study_area() {
        let cfg = PlannerConfig::from_toml("[network]\nhub = \"  \"\n").unwrap();
        assert_eq!(cfg.hub(), Hub::StudyArea);
    }
}

#[cfg(test)]
mod pipeline {
    use std::fs;
    use std::path::Path;

    use crate::config::{Args, PlannerConfig};
    use crate::run;

    const ROADS: &str = "\
id,direction,length,wkt
1,0,,\"LINESTRING (0 0, 100 0)\"
2,0,,\"LINESTRING (100 0, 200 0)\"
";

    const NEIGHBORHOODS: &str = "\
name,class,wkt
A,consolidated,\"POLYGON ((-10 -10, 10 -10, 10 10, -10 10, -10 -10))\"
B,,\"POLYGON ((90 -10, 110 -10, 110 10, 90 10, 90 -10))\"
C,emerging,\"POLYGON ((190 -10, 210 -10, 210 10, 190 10, 190 -10))\"
";

    fn rows(path: &Path) -> Vec<csv::StringRecord> {
        csv::Reader::from_path(path).unwrap().records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn end_to_end_writes_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        let roads = dir.path().join("roads.csv");
        let hoods = dir.path().join("neighborhoods.csv");
        fs::write(&roads, ROADS).unwrap();
        fs::write(&hoods, NEIGHBORHOODS).unwrap();

        let args = Args {
            roads,
            neighborhoods: hoods,
            hub: Some("A".into()),
            output: Some(dir.path().join("out")),
            population: Some(6),
            generations: Some(2),
            ..Args::default()
        };
        let mut cfg = PlannerConfig::from_toml("[search]\nbounds = { min = 1, max = 3 }\n").unwrap();
        cfg.apply_args(&args);
        run(&args, &cfg).unwrap();

        let out = dir.path().join("out");
        // B's route is a subline of C's in each direction.
        for file in ["routes_inbound.csv", "routes_outbound.csv"] {
            let routes = rows(&out.join(file));
            assert_eq!(routes.len(), 1, "{file}");
            assert_eq!(&routes[0][1], "C");
            assert_eq!(&routes[0][3], "A, B, C");
        }
        assert_eq!(rows(&out.join("history.csv")).len(), 3);
        assert!(!rows(&out.join("front.csv")).is_empty());
        assert!(!rows(&out.join("best_routes.csv")).is_empty());
    }

    #[test]
    fn unknown_hub_fails() {
        let dir = tempfile::tempdir().unwrap();
        let roads = dir.path().join("roads.csv");
        let hoods = dir.path().join("neighborhoods.csv");
        fs::write(&roads, ROADS).unwrap();
        fs::write(&hoods, NEIGHBORHOODS).unwrap();

        let args = Args {
            roads,
            neighborhoods: hoods,
            hub: Some("Z".into()),
            output: Some(dir.path().join("out")),
            ..Args::default()
        };
        let mut cfg = PlannerConfig::default();
        cfg.apply_args(&args);
        let err = run(&args, &cfg).unwrap_err();
        assert!(err.to_string().contains("Z"), "{err}");
    }
}
