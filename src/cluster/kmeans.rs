use tracing::{debug, info};

use super::collection::CoordinateCollection;
use super::coordinate::{ClusterTag, Coordinate};
use super::distance::haversine;
use super::traits::Clusterer;
use crate::error::{ClusterError, Result};

/// Pass ceiling used when none is given.
pub const DEFAULT_MAX_ITERATIONS: usize = 300;

/// Estimates a cluster count for `count` coordinates as `ceil(sqrt(count / 2))`.
pub fn estimate_k(count: usize) -> usize {
    (count as f64 / 2.0).sqrt().ceil() as usize
}

/// K-Means with contiguous seeding and online centroid updates
///
/// Initial clusters are [`CoordinateCollection::split`] chunks of the input
/// order. Each pass walks every member of every cluster and moves it to the
/// cluster with the nearest centroid by [`haversine`] distance. Centroids are
/// recomputed after each single move, so later members in a pass see the
/// updated centroids. A cluster is never emptied by a move. Runs stop after a
/// pass with no moves.
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Requested cluster count, 0 to estimate from the input size.
    k: usize,
    max_iterations: usize,
    clusters: Vec<CoordinateCollection>,
    iterations: usize,
}

impl KMeans {
    /// Create a K-Means clusterer producing `k` clusters.
    ///
    /// A `k` of 0 estimates the count with [`estimate_k`] at analysis time.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            clusters: Vec::new(),
            iterations: 0,
        }
    }

    /// Create a clusterer that estimates its cluster count from the input size.
    pub fn estimated() -> Self {
        Self::new(0)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of passes made by the last run, the final no-move pass included.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Runs K-Means over `coordinates`
    ///
    /// On success every input coordinate is tagged with the index of the
    /// cluster it ended in.
    ///
    /// # Errors
    ///
    /// - `InvalidClusterCount` if the effective K is 0 (empty input) or
    ///   exceeds the number of coordinates.
    /// - `NonFiniteCoordinate` if any coordinate is NaN or infinite.
    /// - `NotConverged` if moves are still happening after `max_iterations` passes.
    pub fn analyse(&mut self, coordinates: &mut CoordinateCollection) -> Result<()> {
        coordinates.check_finite()?;

        let items = coordinates.len();
        let k = if self.k == 0 { estimate_k(items) } else { self.k };
        if k == 0 || k > items {
            return Err(ClusterError::InvalidClusterCount {
                requested: k,
                items,
            });
        }

        self.clusters.clear();
        self.iterations = 0;

        let mut clusters = coordinates.split(k)?;
        // input index of every cluster member, kept in step with `clusters`
        let mut origins: Vec<Vec<usize>> = Vec::with_capacity(k);
        let mut offset = 0;
        for (id, cluster) in clusters.iter_mut().enumerate() {
            cluster.update_all_cluster_id(id);
            origins.push((offset..offset + cluster.len()).collect());
            offset += cluster.len();
        }

        loop {
            if self.iterations >= self.max_iterations {
                return Err(ClusterError::NotConverged {
                    iterations: self.iterations,
                });
            }
            self.iterations += 1;

            let changes = refine(&mut clusters, &mut origins)?;
            debug!(iteration = self.iterations, changes, "k-means pass");

            if changes == 0 {
                break;
            }
        }

        for (id, members) in origins.iter().enumerate() {
            for &origin in members {
                coordinates.set_tag(origin, ClusterTag::Cluster(id))?;
            }
        }
        self.clusters = clusters;

        info!(
            points = items,
            k,
            iterations = self.iterations,
            "k-means converged"
        );

        Ok(())
    }
}

impl Clusterer for KMeans {
    fn analyse(&mut self, coordinates: &mut CoordinateCollection) -> Result<()> {
        KMeans::analyse(self, coordinates)
    }

    fn clusters(&self) -> &[CoordinateCollection] {
        &self.clusters
    }
}

/// Makes one reassignment pass and returns the number of moves.
fn refine(clusters: &mut [CoordinateCollection], origins: &mut [Vec<usize>]) -> Result<usize> {
    let mut changes = 0;

    for from in 0..clusters.len() {
        let mut j = 0;
        while let Some(&c) = clusters[from].get(j) {
            match nearest_cluster(clusters, &c) {
                Some(to) if to != from && clusters[from].len() > 1 => {
                    let mut moved = clusters[from].remove_at(j)?;
                    moved.set_tag(ClusterTag::Cluster(to));
                    clusters[to].add(moved);

                    let origin = origins[from].remove(j);
                    origins[to].push(origin);
                    changes += 1;
                    // j now holds the next member
                }
                _ => j += 1,
            }
        }
    }

    Ok(changes)
}

/// Returns the index of the cluster whose centroid is nearest to `c`.
///
/// Ties go to the lowest index. Empty clusters have no centroid and are skipped.
fn nearest_cluster(clusters: &[CoordinateCollection], c: &Coordinate) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, cluster) in clusters.iter().enumerate() {
        let Ok(centroid) = cluster.centroid() else {
            continue;
        };
        let d = haversine(c, &centroid);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }

    best.map(|(i, _)| i)
}
