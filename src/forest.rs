//! From-scratch isolation forest: randomized partition trees over subsampled
//! feature vectors. Anomalous points take fewer random splits to isolate, so
//! shorter average paths mean higher anomaly scores.

use rand::Rng;

use crate::features::{FeatureVector, FEATURE_COUNT};

const EULER_MASCHERONI: f64 = 0.5772156649;

/// One node of a partition tree. A leaf records how many points it absorbed
/// so path lengths can be bias-corrected for unresolved groups.
#[derive(Debug)]
pub enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Expected average path length `c(n)` of an unsuccessful BST search over n
/// points; used both to credit multi-point leaves and to normalize scores.
pub fn expected_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    2.0 * ((n - 1.0).ln() + EULER_MASCHERONI) - 2.0 * (n - 1.0) / n
}

fn build_node<R: Rng>(data: &[FeatureVector], depth: usize, max_depth: usize, rng: &mut R) -> Node {
    if depth >= max_depth || data.len() <= 1 {
        return Node::Leaf { size: data.len() };
    }

    let feature = rng.gen_range(0..FEATURE_COUNT);
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for row in data {
        lo = lo.min(row[feature]);
        hi = hi.max(row[feature]);
    }
    if lo >= hi {
        // Feature is constant across this subset; nothing left to split on.
        return Node::Leaf { size: data.len() };
    }

    // Continuous threshold drawn uniformly between the observed extremes,
    // deliberately not a midpoint split.
    let value = rng.gen_range(lo..hi);
    let (left, right): (Vec<FeatureVector>, Vec<FeatureVector>) =
        data.iter().partition(|row| row[feature] < value);
    if left.is_empty() || right.is_empty() {
        return Node::Leaf { size: data.len() };
    }

    Node::Split {
        feature,
        value,
        left: Box::new(build_node(&left, depth + 1, max_depth, rng)),
        right: Box::new(build_node(&right, depth + 1, max_depth, rng)),
    }
}

/// Root-to-leaf edge count for `point`, plus the `c(size)` correction at the
/// leaf it lands in.
pub fn path_length(root: &Node, point: &FeatureVector) -> f64 {
    let mut node = root;
    let mut depth = 0.0;
    loop {
        match node {
            Node::Leaf { size } => return depth + expected_path_length(*size),
            Node::Split {
                feature,
                value,
                left,
                right,
            } => {
                node = if point[*feature] < *value { left } else { right };
                depth += 1.0;
            }
        }
    }
}

/// An ordered ensemble of independently built trees. Replaced wholesale on
/// retrain; never mutated in place.
#[derive(Debug)]
pub struct IsolationForest {
    trees: Vec<Node>,
    subsample_size: usize,
}

impl IsolationForest {
    /// A forest with no trees; scores everything as neutral 0.5.
    pub fn empty() -> Self {
        Self {
            trees: Vec::new(),
            subsample_size: 0,
        }
    }

    /// Build `n_trees` trees, each over its own uniform subsample drawn
    /// without replacement. Each tree samples independently; diversity comes
    /// from the sampling plus feature/split randomness.
    pub fn fit<R: Rng>(
        features: &[FeatureVector],
        n_trees: usize,
        subsample_size: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> Self {
        let subsample_size = subsample_size.min(features.len());
        let mut trees = Vec::with_capacity(n_trees);
        for _ in 0..n_trees {
            let sample: Vec<FeatureVector> =
                rand::seq::index::sample(rng, features.len(), subsample_size)
                    .iter()
                    .map(|i| features[i])
                    .collect();
            trees.push(build_node(&sample, 0, max_depth, rng));
        }
        Self {
            trees,
            subsample_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Normalized anomaly score in [0, 1]: `2^(−avg_path / c(subsample))`.
    /// Near 1 means isolated quickly; ≤ 0.5 means typical.
    pub fn score(&self, point: &FeatureVector) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let total: f64 = self.trees.iter().map(|t| path_length(t, point)).sum();
        let avg = total / self.trees.len() as f64;
        let c = expected_path_length(self.subsample_size);
        if c == 0.0 {
            return 0.5;
        }
        2.0_f64.powf(-avg / c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn clustered_features() -> Vec<FeatureVector> {
        // Tight cluster with mild jitter across the calendar fields.
        (0..200)
            .map(|i| {
                [
                    (500.0 + (i % 7) as f64).ln(),
                    (1 + i % 28) as f64,
                    (i % 7) as f64,
                    (1 + i % 12) as f64,
                    12.0,
                ]
            })
            .collect()
    }

    #[test]
    fn test_expected_path_length_values() {
        assert_eq!(expected_path_length(0), 0.0);
        assert_eq!(expected_path_length(1), 0.0);
        assert!((expected_path_length(2) - (2.0 * EULER_MASCHERONI - 1.0)).abs() < 1e-9);
        // c(256) ≈ 10.244
        assert!((expected_path_length(256) - 10.244770920116851).abs() < 1e-6);
    }

    #[test]
    fn test_empty_forest_scores_neutral() {
        let forest = IsolationForest::empty();
        assert_eq!(forest.score(&[1.0, 2.0, 3.0, 4.0, 5.0]), 0.5);
    }

    #[test]
    fn test_scores_within_unit_interval() {
        let features = clustered_features();
        let mut rng = StdRng::seed_from_u64(7);
        let forest = IsolationForest::fit(&features, 50, 64, 10, &mut rng);
        for point in &features {
            let s = forest.score(point);
            assert!((0.0..=1.0).contains(&s), "score {s} out of range");
        }
    }

    #[test]
    fn test_outlier_scores_higher_than_inliers() {
        // Amounts spread over roughly 100..1000, one record at 50k.
        let mut features: Vec<FeatureVector> = (0..200)
            .map(|i| {
                [
                    (100.0 + i as f64 * 4.5).ln(),
                    (1 + i % 28) as f64,
                    (i % 7) as f64,
                    (1 + i % 12) as f64,
                    12.0,
                ]
            })
            .collect();
        let outlier: FeatureVector = [50_001.0_f64.ln(), 15.0, 3.0, 6.0, 12.0];
        features.push(outlier);

        let mut rng = StdRng::seed_from_u64(42);
        let forest = IsolationForest::fit(&features, 100, 128, 10, &mut rng);

        let inlier = features[100];
        assert!(forest.score(&outlier) > forest.score(&inlier));
        assert!(forest.score(&outlier) > 0.5);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let features = clustered_features();
        let forest_a =
            IsolationForest::fit(&features, 20, 32, 10, &mut StdRng::seed_from_u64(99));
        let forest_b =
            IsolationForest::fit(&features, 20, 32, 10, &mut StdRng::seed_from_u64(99));
        let probe: FeatureVector = [9.0, 4.0, 2.0, 11.0, 12.0];
        assert_eq!(forest_a.score(&probe), forest_b.score(&probe));
    }

    #[test]
    fn test_constant_data_collapses_to_leaves() {
        let features: Vec<FeatureVector> = vec![[5.0, 1.0, 0.0, 1.0, 12.0]; 32];
        let mut rng = StdRng::seed_from_u64(1);
        let root = build_node(&features, 0, 10, &mut rng);
        match root {
            Node::Leaf { size } => assert_eq!(size, 32),
            Node::Split { .. } => panic!("constant features must not split"),
        }
    }

    #[test]
    fn test_max_depth_bounds_tree() {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        let features = clustered_features();
        let mut rng = StdRng::seed_from_u64(3);
        let root = build_node(&features, 0, 4, &mut rng);
        assert!(depth_of(&root) <= 4);
    }

    #[test]
    fn test_subsample_capped_to_corpus() {
        let features = clustered_features();
        let mut rng = StdRng::seed_from_u64(5);
        let forest = IsolationForest::fit(&features, 10, 100_000, 10, &mut rng);
        assert_eq!(forest.tree_count(), 10);
        assert_eq!(forest.subsample_size, features.len());
    }
}
