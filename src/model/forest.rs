use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::features::{FeatureVector, FEATURE_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RegressionTree {
    root: Node,
    /// Total squared-error reduction contributed by each feature.
    impurity_decrease: Vec<f64>,
}

struct TreeBuilder<'a> {
    samples: &'a [FeatureVector],
    targets: &'a [f64],
    params: ForestParams,
    impurity_decrease: Vec<f64>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, indices: Vec<usize>) -> RegressionTree {
        let root = self.grow(indices, 0);
        RegressionTree {
            root,
            impurity_decrease: self.impurity_decrease,
        }
    }

    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> Node {
        let (sum, sum_sq) = sums(self.targets, &indices);
        let count = indices.len() as f64;
        let mean = if indices.is_empty() { 0.0 } else { sum / count };
        let node_sse = sum_sq - sum * sum / count.max(1.0);

        if depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split.max(2)
            || node_sse <= f64::EPSILON
        {
            return Node::Leaf { value: mean };
        }

        let Some(split) = self.best_split(&indices, node_sse) else {
            return Node::Leaf { value: mean };
        };

        self.impurity_decrease[split.feature] += split.gain;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&index| self.samples[index][split.feature] <= split.threshold);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(left, depth + 1)),
            right: Box::new(self.grow(right, depth + 1)),
        }
    }

    fn best_split(&self, indices: &[usize], node_sse: f64) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;
        let (total_sum, total_sq) = sums(self.targets, indices);
        let total = indices.len() as f64;

        for feature in 0..FEATURE_COUNT {
            let mut ordered = indices.to_vec();
            ordered.sort_by(|a, b| {
                self.samples[*a][feature].total_cmp(&self.samples[*b][feature])
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for position in 0..ordered.len() - 1 {
                let target = self.targets[ordered[position]];
                left_sum += target;
                left_sq += target * target;

                let current = self.samples[ordered[position]][feature];
                let next = self.samples[ordered[position + 1]][feature];
                if next <= current {
                    continue;
                }

                let left_count = (position + 1) as f64;
                let right_count = total - left_count;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / left_count;
                let right_sse = right_sq - right_sum * right_sum / right_count;
                let gain = node_sse - left_sse - right_sse;

                if gain > best.as_ref().map_or(f64::EPSILON, |split| split.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (current + next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

fn sums(targets: &[f64], indices: &[usize]) -> (f64, f64) {
    indices.iter().fold((0.0, 0.0), |(sum, sum_sq), &index| {
        let value = targets[index];
        (sum + value, sum_sq + value * value)
    })
}

/// Bagged regression trees over the city feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fits `params.trees` trees, each on a bootstrap sample drawn from a generator seeded
    /// with `params.seed`. Callers guarantee at least one sample.
    pub fn fit(samples: &[FeatureVector], targets: &[f64], params: ForestParams) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let tree_count = params.trees.max(1);
        let mut trees = Vec::with_capacity(tree_count);

        for _ in 0..tree_count {
            let indices: Vec<usize> = (0..samples.len())
                .map(|_| rng.gen_range(0..samples.len()))
                .collect();
            let builder = TreeBuilder {
                samples,
                targets,
                params,
                impurity_decrease: vec![0.0; FEATURE_COUNT],
            };
            trees.push(builder.build(indices));
        }

        Self { params, trees }
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|tree| tree.root.predict(features)).sum();
        total / self.trees.len() as f64
    }

    /// Mean impurity decrease per feature, normalized per tree and then overall to sum to 1.
    /// All zeros when no tree found a useful split.
    pub fn feature_importance(&self) -> [f64; FEATURE_COUNT] {
        let mut importance = [0.0; FEATURE_COUNT];
        for tree in &self.trees {
            let tree_total: f64 = tree.impurity_decrease.iter().sum();
            if tree_total <= 0.0 {
                continue;
            }
            for (slot, decrease) in importance.iter_mut().zip(&tree.impurity_decrease) {
                *slot += decrease / tree_total;
            }
        }

        let total: f64 = importance.iter().sum();
        if total > 0.0 {
            for slot in importance.iter_mut() {
                *slot /= total;
            }
        }
        importance
    }
}
