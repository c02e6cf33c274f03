//! This code is heavily based on <https://godoc.org/code.google.com/p/eaburns/kdtree>
//!
//! Original code is under New BSD License.
//! Author: Ethan Burns <burns.ethan@gmail.com>
//!
//! 2-d tree over raw `[longitude, latitude]` values.
//!
//! Answers the same question as a linear scan with [`distance_squared`]:
//! which coordinates lie within a squared planar radius of a query point.
//! Splits alternate between longitude (even depth) and latitude (odd depth).

use bitvec::prelude::*;

use super::collection::CoordinateCollection;
use super::coordinate::Coordinate;
use super::distance::distance_squared;

/// KD-Tree for radius queries under planar squared distance
///
/// Points are separated from nodes. Nodes hold only indices into the points
/// slice, which matches the member order of the source collection.
pub struct KdTree {
    points: Vec<Coordinate>,
    root: Option<Box<KdTreeNode>>,
}

/// A node in the K-D tree
struct KdTreeNode {
    point_id: usize,
    /// Indices of points equal to this node's point
    equal_ids: Vec<usize>,

    split: usize,
    left: Option<Box<KdTreeNode>>,
    right: Option<Box<KdTreeNode>>,
}

fn axis(c: &Coordinate, dim: usize) -> f64 {
    if dim == 0 { c.longitude } else { c.latitude }
}

impl KdTree {
    /// Builds a balanced tree from the positions of `coordinates`.
    pub fn new(coordinates: &CoordinateCollection) -> Self {
        let points = coordinates.as_slice().to_vec();
        let mut tree = KdTree { points, root: None };

        if !tree.points.is_empty() {
            let mut taken = bitvec![0; tree.points.len()];
            tree.root = build_tree(0, &tree.points, &pre_sort(&tree.points), &mut taken);
        }

        tree
    }

    /// Finds the indices of all points whose squared planar distance to `pt`
    /// is at most `eps`
    ///
    /// Indices come back in ascending order, the same order a linear scan
    /// produces.
    pub fn in_range(&self, pt: &Coordinate, eps: f64) -> Vec<usize> {
        let mut nodes = Vec::new();
        if eps < 0.0 {
            return nodes;
        }
        self.in_range_recursive(self.root.as_deref(), pt, eps, &mut nodes);
        nodes.sort_unstable();
        nodes
    }

    fn in_range_recursive(
        &self,
        t: Option<&KdTreeNode>,
        pt: &Coordinate,
        eps: f64,
        nodes: &mut Vec<usize>,
    ) {
        let Some(t) = t else { return };
        let node_pt = &self.points[t.point_id];

        let diff = axis(pt, t.split) - axis(node_pt, t.split);

        let (this_side, other_side) = if diff < 0.0 {
            (t.left.as_deref(), t.right.as_deref())
        } else {
            (t.right.as_deref(), t.left.as_deref())
        };

        self.in_range_recursive(this_side, pt, eps, nodes);
        if diff * diff <= eps {
            if distance_squared(pt, node_pt) <= eps {
                nodes.push(t.point_id);
                nodes.extend_from_slice(&t.equal_ids);
            }
            self.in_range_recursive(other_side, pt, eps, nodes);
        }
    }

    /// Returns the height of the K-D tree
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.height())
    }
}

impl KdTreeNode {
    fn height(&self) -> usize {
        let lht = self.left.as_ref().map_or(0, |l| l.height());
        let rht = self.right.as_ref().map_or(0, |r| r.height());
        lht.max(rht) + 1
    }
}

/// Builds a tree node by finding the median point and recursively building left and right subtrees
fn build_tree(
    depth: usize,
    points: &[Coordinate],
    nodes: &PreSorted,
    taken: &mut BitVec,
) -> Option<Box<KdTreeNode>> {
    let split = depth % 2;
    match nodes.cur[split].len() {
        0 => None,
        1 => Some(Box::new(KdTreeNode {
            point_id: nodes.cur[split][0],
            equal_ids: Vec::new(),
            split,
            left: None,
            right: None,
        })),
        _ => {
            let (med, equal, left, right) = nodes.split_med(split, points, taken);
            Some(Box::new(KdTreeNode {
                point_id: med,
                equal_ids: equal,
                split,
                left: build_tree(depth + 1, points, &left, taken),
                right: build_tree(depth + 1, points, &right, taken),
            }))
        }
    }
}

/// Point ids sorted on each dimension
struct PreSorted {
    cur: [Vec<usize>; 2],
}

fn pre_sort(points: &[Coordinate]) -> PreSorted {
    let mut cur = [Vec::new(), Vec::new()];
    for (dim, ids) in cur.iter_mut().enumerate() {
        *ids = (0..points.len()).collect();
        ids.sort_by(|&a, &b| {
            axis(&points[a], dim)
                .total_cmp(&axis(&points[b], dim))
                .then_with(|| axis(&points[a], 1 - dim).total_cmp(&axis(&points[b], 1 - dim)))
        });
    }
    PreSorted { cur }
}

impl PreSorted {
    /// Returns the median point on the split dimension, the points equal to it,
    /// and two PreSorted sets (still sorted on each dimension) holding the points
    /// less than and greater than or equal to the median on that dimension.
    ///
    /// `taken` is scratch space; it is left all-zero on return.
    fn split_med(
        &self,
        dim: usize,
        points: &[Coordinate],
        taken: &mut BitVec,
    ) -> (usize, Vec<usize>, PreSorted, PreSorted) {
        let ids = &self.cur[dim];
        let mut m = ids.len() / 2;
        while m > 0 && axis(&points[ids[m - 1]], dim) == axis(&points[ids[m]], dim) {
            m -= 1;
        }
        let mut mh = m;
        while mh < ids.len() - 1 && points[ids[mh + 1]] == points[ids[m]] {
            mh += 1;
        }
        let med = ids[m];
        let equal = ids[m + 1..=mh].to_vec();
        let pivot = axis(&points[med], dim);

        let mut left = PreSorted {
            cur: [Vec::new(), Vec::new()],
        };
        left.cur[dim] = ids[..m].to_vec();

        let mut right = PreSorted {
            cur: [Vec::new(), Vec::new()],
        };
        right.cur[dim] = ids[mh + 1..].to_vec();

        for &id in ids[m..=mh].iter() {
            taken.set(id, true);
        }

        let other = 1 - dim;
        for &n in &self.cur[other] {
            if taken[n] {
                continue;
            }
            if axis(&points[n], dim) < pivot {
                left.cur[other].push(n);
            } else {
                right.cur[other].push(n);
            }
        }

        for &id in ids[m..=mh].iter() {
            taken.set(id, false);
        }

        (med, equal, left, right)
    }
}
