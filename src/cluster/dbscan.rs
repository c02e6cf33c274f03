use std::collections::VecDeque;

use tracing::{debug, info, warn};

use super::collection::CoordinateCollection;
use super::coordinate::{ClusterTag, Coordinate};
use super::distance::distance_squared;
use super::kdtree::KdTree;
use super::traits::Clusterer;
use crate::error::{ClusterError, Result};

// DBSCAN(D, eps, MinPts)
//    C = 0
//    for each unclassified point P in dataset D
//       if expandCluster(P, C) then C = next cluster
//
// expandCluster(P, C)
//    seeds = regionQuery(P, eps)
//    if sizeof(seeds) < MinPts
//       mark P as NOISE, return false
//    label every point in seeds with C
//    remove P from seeds
//    while seeds is not empty
//       P' = first of seeds
//       result = regionQuery(P', eps)
//       if sizeof(result) >= MinPts
//          for each Q in result that is unclassified or NOISE
//             if Q is unclassified, append Q to seeds
//             label Q with C
//       remove P' from seeds
//    return true
//
// regionQuery(P, eps)
//    return all points within P's eps-neighborhood (including P)

/// Minimum neighbourhood size used when none is given.
pub const DEFAULT_MIN_POINTS: usize = 4;

/// How DBSCAN answers region queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighbourSearch {
    /// Linear scan over every coordinate for each query.
    #[default]
    BruteForce,
    /// Query a K-D tree built once per run. Returns the same neighbours.
    KdTree,
}

/// Density-based clustering over squared planar distance on raw degrees
///
/// `epsilon` is in degree² and is compared with
/// [`distance_squared`](super::distance::distance_squared), not with a
/// geographic distance. A point whose region (itself included) holds at least
/// `min_points` coordinates is a core point.
#[derive(Debug, Clone)]
pub struct Dbscan {
    epsilon: f64,
    min_points: usize,
    search: NeighbourSearch,
    clusters: Vec<CoordinateCollection>,
    noise: CoordinateCollection,
}

enum Region<'a> {
    BruteForce(&'a [Coordinate]),
    KdTree(&'a [Coordinate], KdTree),
}

impl Region<'_> {
    fn query(&self, index: usize, eps: f64) -> Vec<usize> {
        match self {
            Region::BruteForce(points) => region_query(points, &points[index], eps),
            Region::KdTree(points, tree) => tree.in_range(&points[index], eps),
        }
    }
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Neighbourhood radius as a squared distance in degree²
    /// * `min_points` - Minimum number of points in the eps-neighbourhood, the point itself included
    pub fn new(epsilon: f64, min_points: usize) -> Self {
        Self {
            epsilon,
            min_points,
            search: NeighbourSearch::default(),
            clusters: Vec::new(),
            noise: CoordinateCollection::new(),
        }
    }

    /// Create a clusterer with [`DEFAULT_MIN_POINTS`].
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self::new(epsilon, DEFAULT_MIN_POINTS)
    }

    pub fn with_search(mut self, search: NeighbourSearch) -> Self {
        self.search = search;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Coordinates left as noise by the last run.
    pub fn noise(&self) -> &CoordinateCollection {
        &self.noise
    }

    /// Runs DBSCAN over `coordinates`
    ///
    /// Tags are read from and written back to the coordinates, so callers
    /// re-clustering the same data must call
    /// [`CoordinateCollection::reset_tags`] first. The previous run's clusters
    /// and noise are discarded.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if epsilon is negative or not finite.
    /// - `NonFiniteCoordinate` if any coordinate is NaN or infinite.
    pub fn analyse(&mut self, coordinates: &mut CoordinateCollection) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ClusterError::InvalidParameter {
                name: "epsilon",
                message: "must be finite and non-negative",
            });
        }
        coordinates.check_finite()?;

        self.clusters.clear();
        self.noise = CoordinateCollection::new();

        let mut tags: Vec<ClusterTag> = coordinates.iter().map(Coordinate::tag).collect();
        let preset = tags.iter().filter(|t| t.is_classified()).count();
        if preset > 0 {
            warn!(
                preset,
                points = tags.len(),
                "input already carries cluster tags, those points are skipped"
            );
        }
        {
            let points = coordinates.as_slice();
            let region = match self.search {
                NeighbourSearch::BruteForce => Region::BruteForce(points),
                NeighbourSearch::KdTree => Region::KdTree(points, KdTree::new(coordinates)),
            };

            let mut cluster_id = 0;
            for i in 0..points.len() {
                if tags[i].is_classified() {
                    continue;
                }
                if self.expand_cluster(&region, &mut tags, i, cluster_id) {
                    cluster_id += 1;
                }
            }
        }

        let mut clusters: Vec<Vec<Coordinate>> = Vec::new();
        let mut noise = Vec::new();
        for (i, tag) in tags.into_iter().enumerate() {
            coordinates.set_tag(i, tag)?;
            let Some(&c) = coordinates.get(i) else {
                continue;
            };
            match tag {
                ClusterTag::Cluster(id) => {
                    if clusters.len() <= id {
                        clusters.resize_with(id + 1, Vec::new);
                    }
                    clusters[id].push(c);
                }
                _ => noise.push(c),
            }
        }

        self.clusters = clusters.into_iter().map(CoordinateCollection::from).collect();
        self.noise = CoordinateCollection::from(noise);

        info!(
            points = coordinates.len(),
            clusters = self.clusters.len(),
            noise = self.noise.len(),
            "dbscan finished"
        );

        Ok(())
    }

    fn expand_cluster(
        &self,
        region: &Region<'_>,
        tags: &mut [ClusterTag],
        index: usize,
        id: usize,
    ) -> bool {
        let seeds = region.query(index, self.epsilon);
        if seeds.len() < self.min_points {
            tags[index] = ClusterTag::Noise;
            return false;
        }

        debug!(cluster = id, core = index, seeds = seeds.len(), "new cluster");

        for &s in &seeds {
            tags[s] = ClusterTag::Cluster(id);
        }

        let mut queue: VecDeque<usize> = seeds.into_iter().filter(|&s| s != index).collect();
        while let Some(p) = queue.pop_front() {
            let result = region.query(p, self.epsilon);
            if result.len() < self.min_points {
                continue;
            }
            for q in result {
                match tags[q] {
                    ClusterTag::Unassigned => {
                        queue.push_back(q);
                        tags[q] = ClusterTag::Cluster(id);
                    }
                    ClusterTag::Noise => tags[q] = ClusterTag::Cluster(id),
                    ClusterTag::Cluster(_) => {}
                }
            }
        }

        true
    }
}

impl Clusterer for Dbscan {
    fn analyse(&mut self, coordinates: &mut CoordinateCollection) -> Result<()> {
        Dbscan::analyse(self, coordinates)
    }

    fn clusters(&self) -> &[CoordinateCollection] {
        &self.clusters
    }
}

/// Simple O(N) way to find points in neighbourhood
///
/// Returns the indices, in input order, of every point whose squared planar
/// distance to `p` is at most `eps`. `p` itself is included when it is one
/// of `points`.
pub fn region_query(points: &[Coordinate], p: &Coordinate, eps: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| distance_squared(p, point) <= eps)
        .map(|(i, _)| i)
        .collect()
}
