//! An arena-backed k-d tree with approximate-median splits, rebuilt
//! from scratch on every relaxation sweep.
//!
//! Pivots are estimated from a random sample instead of an exact
//! median, so the tree is only probabilistically balanced; degenerate
//! splits (small inputs, duplicate coordinates) are valid and merely
//! cost query time.

use crate::geometry::distance_sq;
use crate::geometry::Point2D;

use rand::Rng;

#[derive(Debug, Clone, Copy)]
struct Node {
    position: Point2D,
    /// Index of the originating point in the build slice; stable
    /// across tree shapes, used as accumulator key and tie-break.
    point: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// Result of a nearest-neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index of the winning point in the slice the tree was built from.
    pub point: usize,
    pub position: Point2D,
    pub distance_sq: f64,
}

/// A binary spatial partition of a point set, splitting along the x
/// axis at even depths and the y axis at odd depths.
#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl KdTree {
    /// Builds a tree holding exactly one node per input point. An empty
    /// slice yields the empty tree, which answers no queries.
    pub fn build<R>(points: &[Point2D], rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut nodes = Vec::with_capacity(points.len());
        let items: Vec<(usize, Point2D)> = points.iter().copied().enumerate().collect();
        let root = build_subtree(&mut nodes, items, 0, rng);
        Self { nodes, root }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the point minimizing the squared Euclidean distance to
    /// `target`, or `None` for the empty tree.
    ///
    /// Exact ties resolve to the lowest point index among the
    /// candidates the pruned search visits, so results do not depend
    /// on the random tree shape.
    pub fn nearest(&self, target: &Point2D) -> Option<Nearest> {
        let mut best = None;
        self.descend(self.root?, 0, target, &mut best);
        best
    }

    fn descend(&self, node_id: usize, depth: usize, target: &Point2D, best: &mut Option<Nearest>) {
        let node = &self.nodes[node_id];
        let d = distance_sq(&node.position, target);
        let better = match best {
            None => true,
            Some(b) => d < b.distance_sq || (d == b.distance_sq && node.point < b.point),
        };
        if better {
            *best = Some(Nearest {
                point: node.point,
                position: node.position,
                distance_sq: d,
            });
        }

        let axis = depth % 2;
        let (near, far) = if target[axis] < node.position[axis] {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        if let Some(near) = near {
            self.descend(near, depth + 1, target, best);
        }
        if let Some(far) = far {
            let plane = target[axis] - node.position[axis];
            // best was set above, so map_or never sees the None arm.
            if plane * plane < best.map_or(f64::INFINITY, |b| b.distance_sq) {
                self.descend(far, depth + 1, target, best);
            }
        }
    }
}

fn build_subtree<R>(
    nodes: &mut Vec<Node>,
    items: Vec<(usize, Point2D)>,
    depth: usize,
    rng: &mut R,
) -> Option<usize>
where
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    let axis = depth % 2;
    let (pivot, pivot_position) = pick_pivot(&items, axis, rng);
    let pivot_coord = pivot_position[axis];

    // Strictly-less goes left; everything else except the one pivot
    // instance goes right, so duplicate coordinates survive.
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (point, position) in items {
        if point == pivot {
            continue;
        }
        if position[axis] < pivot_coord {
            left.push((point, position));
        } else {
            right.push((point, position));
        }
    }

    let left = build_subtree(nodes, left, depth + 1, rng);
    let right = build_subtree(nodes, right, depth + 1, rng);
    let id = nodes.len();
    nodes.push(Node {
        position: pivot_position,
        point: pivot,
        left,
        right,
    });
    Some(id)
}

/// Approximate median: the middle of a random sample (drawn with
/// replacement, `ceil(n / (log10(n) + 1))` entries, at least one)
/// sorted along `axis`.
fn pick_pivot<R>(items: &[(usize, Point2D)], axis: usize, rng: &mut R) -> (usize, Point2D)
where
    R: Rng + ?Sized,
{
    let n = items.len();
    let sample_size = ((n as f64) / ((n as f64).log10() + 1.0)).ceil().max(1.0) as usize;
    let mut sample: Vec<usize> = (0..sample_size).map(|_| rng.gen_range(0..n)).collect();
    sample.sort_unstable_by(|a, b| crate::partial_cmp(&items[*a].1[axis], &items[*b].1[axis]));
    items[sample[sample_size / 2]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build_seeded(points: &[Point2D], seed: u64) -> KdTree {
        KdTree::build(points, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn empty_build_is_a_sentinel_not_an_error() {
        let tree = build_seeded(&[], 0);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.nearest(&Point2D::new(1.0, 2.0)), None);
    }

    #[test]
    fn one_node_per_input_point_with_duplicates() {
        let points = vec![Point2D::new(3.0, 3.0); 50];
        for seed in 0..8 {
            let tree = build_seeded(&points, seed);
            assert_eq!(tree.len(), 50);
        }
    }

    #[test]
    fn two_points_split_the_plane() {
        let points = [Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)];
        for seed in 0..32 {
            let tree = build_seeded(&points, seed);
            let near_origin = tree.nearest(&Point2D::new(4.0, 4.0)).unwrap();
            assert_eq!(near_origin.point, 0);
            assert_eq!(near_origin.position, points[0]);
            let near_far = tree.nearest(&Point2D::new(6.0, 6.0)).unwrap();
            assert_eq!(near_far.point, 1);
            assert_eq!(near_far.position, points[1]);
        }
    }

    #[test]
    fn exact_tie_prefers_lower_index() {
        // (5, 5) is equidistant from both points; the winner must not
        // depend on which one became the root.
        let points = [Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)];
        for seed in 0..32 {
            let tree = build_seeded(&points, seed);
            let tie = tree.nearest(&Point2D::new(5.0, 5.0)).unwrap();
            assert_eq!(tie.point, 0);
            assert_eq!(tie.distance_sq, 50.0);
        }
    }

    #[test]
    fn descends_into_only_right_child() {
        // Equal x coordinates force an empty left subtree at the root
        // whichever point is picked as pivot. A query closer to the
        // child must still reach it; a leaf check that looks at the
        // same child twice returns the root instead.
        let points = [Point2D::new(5.0, 5.0), Point2D::new(5.0, 9.0)];
        for seed in 0..32 {
            let tree = build_seeded(&points, seed);
            let hit = tree.nearest(&Point2D::new(5.0, 10.0)).unwrap();
            assert_eq!(hit.point, 1);
            assert_eq!(hit.distance_sq, 1.0);
            // Same tree, target on the empty-left side of the plane.
            let hit = tree.nearest(&Point2D::new(4.0, 9.0)).unwrap();
            assert_eq!(hit.point, 1);
            assert_eq!(hit.distance_sq, 1.0);
        }
    }

    #[test]
    fn member_queries_return_zero_distance() {
        let points: Vec<Point2D> = (0..40)
            .map(|i| Point2D::new((i * 7 % 13) as f64, (i * 11 % 17) as f64))
            .collect();
        let tree = build_seeded(&points, 42);
        for q in &points {
            let hit = tree.nearest(q).unwrap();
            assert_eq!(hit.distance_sq, 0.0);
            assert_eq!(hit.position, *q);
        }
    }

    proptest!(
        #![proptest_config(ProptestConfig {
            timeout: 10000,
            ..ProptestConfig::default()
        })]

        #[test]
        fn node_count_equals_input_len(
            coords in prop::collection::vec((-100i32..100, -100i32..100), 1..200),
            seed in any::<u64>(),
        ) {
            // Integer coordinates keep duplicates likely.
            let points: Vec<Point2D> = coords
                .iter()
                .map(|&(x, y)| Point2D::new(f64::from(x), f64::from(y)))
                .collect();
            let tree = KdTree::build(&points, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(tree.len(), points.len());
        }

        /// The pruned search must agree with the exhaustive scan.
        #[test]
        fn nearest_matches_brute_force(
            coords in prop::collection::vec((-1000.0..1000.0f64, -1000.0..1000.0f64), 1..500),
            target in (-1000.0..1000.0f64, -1000.0..1000.0f64),
            seed in any::<u64>(),
        ) {
            let points: Vec<Point2D> = coords
                .iter()
                .map(|&(x, y)| Point2D::new(x, y))
                .collect();
            let target = Point2D::new(target.0, target.1);
            let tree = KdTree::build(&points, &mut StdRng::seed_from_u64(seed));
            let found = tree.nearest(&target).unwrap();
            let best = points
                .iter()
                .map(|p| distance_sq(p, &target))
                .fold(f64::INFINITY, f64::min);
            prop_assert!(
                (found.distance_sq - best).abs() <= 1e-9 * best.max(1.0),
                "pruned: {}, brute force: {}", found.distance_sq, best,
            );
        }
    );
}
