#[cfg(test)]
mod tests {
    use crate::ClusterError;
    use crate::cluster::{
        ClusterTag, Clusterer, Coordinate, CoordinateCollection, DEFAULT_MIN_POINTS, Dbscan,
        NeighbourSearch, region_query,
    };
    use quickcheck::{QuickCheck, TestResult};

    const BASES: [(f64, f64); 4] = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)];

    /// 10 points on a 5x2 grid with 0.01 degree spacing around `base`
    fn square_cluster(base: (f64, f64)) -> Vec<Coordinate> {
        (0..10)
            .map(|i| {
                Coordinate::new(
                    base.0 + (i % 5) as f64 * 0.01,
                    base.1 + (i / 5) as f64 * 0.01,
                )
            })
            .collect()
    }

    fn four_squares() -> CoordinateCollection {
        BASES.iter().flat_map(|&b| square_cluster(b)).collect()
    }

    /// Deterministic pseudo-random points in a 1x1 degree box
    fn scattered(n: usize, seed: u64) -> CoordinateCollection {
        let mut state = seed;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..n).map(|_| Coordinate::new(30.0 + next(), 59.0 + next())).collect()
    }

    fn assert_partition(dbscan: &Dbscan, input: &CoordinateCollection) {
        let clustered: usize = dbscan.clusters().iter().map(|c| c.len()).sum();
        assert_eq!(clustered + dbscan.noise().len(), input.len());

        for (id, cluster) in dbscan.clusters().iter().enumerate() {
            assert!(cluster.iter().all(|c| c.tag() == ClusterTag::Cluster(id)));
        }
        assert!(dbscan.noise().iter().all(|c| c.is_noise()));

        let tagged_noise = input.iter().filter(|c| c.is_noise()).count();
        assert_eq!(tagged_noise, dbscan.noise().len());
        for (id, cluster) in dbscan.clusters().iter().enumerate() {
            let tagged = input.iter().filter(|c| c.cluster_id() == Some(id)).count();
            assert_eq!(tagged, cluster.len());
        }
    }

    #[test]
    fn test_four_square_clusters() {
        let mut coordinates = four_squares();
        let mut dbscan = Dbscan::new(0.01, 5);
        dbscan.analyse(&mut coordinates).unwrap();

        assert_eq!(dbscan.clusters().len(), 4);
        assert_eq!(dbscan.noise().len(), 0);
        for (cluster, base) in dbscan.clusters().iter().zip(BASES) {
            assert_eq!(cluster.len(), 10);
            let centroid = cluster.centroid().unwrap();
            assert!((centroid.longitude - (base.0 + 0.02)).abs() < 1e-9);
            assert!((centroid.latitude - (base.1 + 0.005)).abs() < 1e-9);
        }
        assert_partition(&dbscan, &coordinates);
    }

    #[test]
    fn test_interleaved_input_order() {
        let squares: Vec<Vec<Coordinate>> = BASES.iter().map(|&b| square_cluster(b)).collect();
        let mut coordinates: CoordinateCollection = (0..10)
            .flat_map(|i| squares.iter().map(move |s| s[i]))
            .collect();

        let mut dbscan = Dbscan::new(0.01, 5);
        dbscan.analyse(&mut coordinates).unwrap();

        assert_eq!(dbscan.clusters().len(), 4);
        assert!(dbscan.clusters().iter().all(|c| c.len() == 10));
        assert_eq!(dbscan.noise().len(), 0);
    }

    #[test]
    fn test_isolated_point_is_noise() {
        let mut coordinates: CoordinateCollection = vec![Coordinate::new(5.0, 5.0)].into();
        let mut dbscan = Dbscan::new(0.01, 2);
        dbscan.analyse(&mut coordinates).unwrap();

        assert_eq!(dbscan.clusters().len(), 0);
        assert_eq!(dbscan.noise().len(), 1);
        assert!(coordinates.get(0).unwrap().is_noise());
    }

    #[test]
    fn test_core_threshold_is_inclusive() {
        // the middle point has exactly 3 neighbours (itself included) at distance² 0.25
        let points = vec![
            Coordinate::new(0.0, 0.5),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, -0.5),
        ];

        let mut coordinates: CoordinateCollection = points.clone().into();
        let mut dbscan = Dbscan::new(0.25, 3);
        dbscan.analyse(&mut coordinates).unwrap();
        assert_eq!(dbscan.clusters().len(), 1);
        assert_eq!(dbscan.clusters()[0].len(), 3);
        assert_eq!(dbscan.noise().len(), 0);
        // visited first as noise, then absorbed as a border point
        assert_eq!(coordinates.get(0).unwrap().cluster_id(), Some(0));

        let mut coordinates: CoordinateCollection = points.into();
        let mut dbscan = Dbscan::new(0.25, 4);
        dbscan.analyse(&mut coordinates).unwrap();
        assert_eq!(dbscan.clusters().len(), 0);
        assert_eq!(dbscan.noise().len(), 3);
    }

    #[test]
    fn test_shared_border_point_goes_to_last_cluster() {
        let border = Coordinate::new(0.0, 0.0);
        let mut coordinates: CoordinateCollection = vec![
            Coordinate::new(-1.0, 0.0),
            Coordinate::new(-1.0, 0.5),
            Coordinate::new(-1.0, -0.5),
            border,
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 0.5),
            Coordinate::new(1.0, -0.5),
        ]
        .into();

        let mut dbscan = Dbscan::new(1.0, 4);
        dbscan.analyse(&mut coordinates).unwrap();

        assert_eq!(dbscan.clusters().len(), 2);
        assert_eq!(dbscan.clusters()[0].len(), 3);
        assert_eq!(dbscan.clusters()[1].len(), 4);
        assert_eq!(coordinates.get(3).unwrap().cluster_id(), Some(1));
        assert!(dbscan.clusters()[1].iter().any(|c| *c == border));
        assert_partition(&dbscan, &coordinates);
    }

    #[test]
    fn test_empty_input() {
        let mut coordinates = CoordinateCollection::new();
        let mut dbscan = Dbscan::with_epsilon(0.01);
        dbscan.analyse(&mut coordinates).unwrap();

        assert_eq!(dbscan.epsilon(), 0.01);
        assert_eq!(dbscan.min_points(), DEFAULT_MIN_POINTS);
        assert!(dbscan.clusters().is_empty());
        assert!(dbscan.noise().is_empty());
    }

    #[test]
    fn test_invalid_epsilon() {
        let mut coordinates = four_squares();
        for eps in [-0.1, f64::NAN, f64::INFINITY] {
            let mut dbscan = Dbscan::new(eps, 5);
            assert!(matches!(
                dbscan.analyse(&mut coordinates),
                Err(ClusterError::InvalidParameter { name: "epsilon", .. })
            ));
        }
        assert!(coordinates.iter().all(|c| !c.is_classified()));
    }

    #[test]
    fn test_rerun_after_reset_is_deterministic() {
        let mut coordinates = scattered(300, 7);
        let mut dbscan = Dbscan::new(0.005, 4);

        dbscan.analyse(&mut coordinates).unwrap();
        let first: Vec<ClusterTag> = coordinates.iter().map(|c| c.tag()).collect();
        let clusters = dbscan.clusters().len();

        coordinates.reset_tags();
        dbscan.analyse(&mut coordinates).unwrap();
        let second: Vec<ClusterTag> = coordinates.iter().map(|c| c.tag()).collect();

        assert_eq!(first, second);
        assert_eq!(clusters, dbscan.clusters().len());
        assert_partition(&dbscan, &coordinates);
    }

    #[test]
    fn test_non_finite_coordinate_is_rejected() {
        let mut coordinates = four_squares();
        coordinates.add(Coordinate::new(f64::NAN, 0.0));
        for search in [NeighbourSearch::BruteForce, NeighbourSearch::KdTree] {
            let mut dbscan = Dbscan::new(0.0005, 5).with_search(search);
            assert_eq!(
                dbscan.analyse(&mut coordinates).unwrap_err(),
                ClusterError::NonFiniteCoordinate { index: 40 }
            );
            assert!(dbscan.clusters().is_empty());
        }
        assert!(coordinates.iter().all(|c| !c.is_classified()));
    }

    #[test]
    fn test_prelabelled_input_is_kept_until_reset() {
        let mut coordinates = four_squares();
        coordinates.update_all_cluster_id(0);

        let mut dbscan = Dbscan::new(0.0005, 5);
        dbscan.analyse(&mut coordinates).unwrap();
        assert_eq!(dbscan.clusters().len(), 1);
        assert_eq!(dbscan.clusters()[0].len(), 40);
        assert!(dbscan.noise().is_empty());

        coordinates.reset_tags();
        dbscan.analyse(&mut coordinates).unwrap();
        assert_eq!(dbscan.clusters().len(), 4);
        assert_partition(&dbscan, &coordinates);
    }

    #[test]
    fn test_kd_tree_search_matches_brute_force() {
        for seed in [1, 2, 3] {
            let mut brute_input = scattered(400, seed);
            let mut tree_input = brute_input.clone();

            let mut brute = Dbscan::new(0.004, 5);
            brute.analyse(&mut brute_input).unwrap();
            let mut tree = Dbscan::new(0.004, 5).with_search(NeighbourSearch::KdTree);
            tree.analyse(&mut tree_input).unwrap();

            let brute_tags: Vec<ClusterTag> = brute_input.iter().map(|c| c.tag()).collect();
            let tree_tags: Vec<ClusterTag> = tree_input.iter().map(|c| c.tag()).collect();
            assert_eq!(brute_tags, tree_tags);
            assert_eq!(brute.noise().len(), tree.noise().len());
        }
    }

    #[test]
    fn test_region_query_includes_self() {
        let points = vec![
            Coordinate::new(30.244759, 59.955982),
            Coordinate::new(30.24472, 59.955975),
            Coordinate::new(30.244358, 59.96698),
            Coordinate::new(30.434124, 60.029499),
        ];
        assert_eq!(region_query(&points, &points[0], 1e-6), vec![0, 1]);
        assert_eq!(region_query(&points, &points[3], 1e-6), vec![3]);
        assert_eq!(region_query(&points, &points[0], 0.0), vec![0]);
    }

    fn prop_partition(points: Vec<(i8, i8)>, min_points: u8) -> TestResult {
        let mut coordinates: CoordinateCollection = points
            .iter()
            .map(|&(x, y)| Coordinate::new(x as f64 / 10.0, y as f64 / 10.0))
            .collect();
        let mut dbscan = Dbscan::new(0.05, (min_points % 6) as usize);
        if dbscan.analyse(&mut coordinates).is_err() {
            return TestResult::failed();
        }

        let clustered: usize = dbscan.clusters().iter().map(|c| c.len()).sum();
        let complete = clustered + dbscan.noise().len() == points.len();
        let no_empty = dbscan.clusters().iter().all(|c| !c.is_empty());
        let all_visited = coordinates.iter().all(|c| c.is_classified());
        TestResult::from_bool(complete && no_empty && all_visited)
    }

    #[test]
    fn test_partition_property() {
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_partition as fn(Vec<(i8, i8)>, u8) -> TestResult);
    }
}
