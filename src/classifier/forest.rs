//! A random forest of CART decision trees using Gini impurity.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::classifier::tfidf::SparseVector;

/// Controls how a [RandomForest] is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestConfig {
    /// The number of trees in the forest.
    pub tree_count: usize,
    /// Seed for bootstrap sampling and feature selection, making fits reproducible.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            tree_count: 100,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct DecisionTree {
    nodes: Vec<Node>,
}

fn feature_value(vector: &SparseVector, feature: usize) -> f64 {
    vector
        .binary_search_by_key(&feature, |(index, _)| *index)
        .map(|position| vector[position].1)
        .unwrap_or(0.0)
}

impl DecisionTree {
    fn predict_distribution(&self, vector: &SparseVector) -> &[f64] {
        let mut node_index = 0;

        loop {
            match &self.nodes[node_index] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node_index = if feature_value(vector, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// The dense training matrix shared by every tree.
struct TrainingSet<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [usize],
    class_count: usize,
    feature_count: usize,
    max_features: usize,
}

struct CandidateSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&count| {
            let proportion = count as f64 / total;
            proportion * proportion
        })
        .sum::<f64>()
}

impl TrainingSet<'_> {
    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.class_count];
        for &sample in samples {
            counts[self.labels[sample]] += 1;
        }
        counts
    }

    /// The lowest impurity split on `feature`, or `None` if the feature is constant over `samples`.
    fn best_split_on(&self, feature: usize, samples: &[usize]) -> Option<CandidateSplit> {
        let mut pairs: Vec<(f64, usize)> = samples
            .iter()
            .map(|&sample| (self.rows[sample][feature], self.labels[sample]))
            .collect();

        let first = pairs.first()?.0;
        if pairs.iter().all(|(value, _)| *value == first) {
            return None;
        }

        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = pairs.len();
        let mut left_counts = vec![0; self.class_count];
        let mut right_counts = vec![0; self.class_count];
        for (_, label) in &pairs {
            right_counts[*label] += 1;
        }

        let mut best: Option<CandidateSplit> = None;

        for i in 0..total - 1 {
            let (value, label) = pairs[i];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let next_value = pairs[i + 1].0;
            if value == next_value {
                continue;
            }

            let left_total = i + 1;
            let right_total = total - left_total;
            let impurity = (left_total as f64 * gini(&left_counts, left_total)
                + right_total as f64 * gini(&right_counts, right_total))
                / total as f64;

            if best
                .as_ref()
                .is_none_or(|best_split| impurity < best_split.impurity)
            {
                best = Some(CandidateSplit {
                    feature,
                    threshold: (value + next_value) / 2.0,
                    impurity,
                });
            }
        }

        best
    }

    fn grow(&self, samples: &[usize], rng: &mut StdRng, nodes: &mut Vec<Node>) -> usize {
        let counts = self.class_counts(samples);
        let is_pure = counts.iter().filter(|&&count| count > 0).count() <= 1;

        let split = if samples.len() < 2 || is_pure {
            None
        } else {
            self.choose_split(samples, rng)
        };

        let node_index = nodes.len();

        let Some(split) = split else {
            let total = samples.len().max(1) as f64;
            nodes.push(Node::Leaf {
                distribution: counts.iter().map(|&count| count as f64 / total).collect(),
            });
            return node_index;
        };

        // Reserve the slot so children are pushed after their parent.
        nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&sample| self.rows[sample][split.feature] <= split.threshold);

        let left = self.grow(&left_samples, rng, nodes);
        let right = self.grow(&right_samples, rng, nodes);

        nodes[node_index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };

        node_index
    }

    /// Try features in random order until `max_features` non-constant features have been
    /// evaluated, carrying on past that only while no split has been found.
    fn choose_split(&self, samples: &[usize], rng: &mut StdRng) -> Option<CandidateSplit> {
        let mut features: Vec<usize> = (0..self.feature_count).collect();
        features.shuffle(rng);

        let mut best: Option<CandidateSplit> = None;
        let mut evaluated = 0;

        for feature in features {
            if evaluated >= self.max_features && best.is_some() {
                break;
            }

            let Some(split) = self.best_split_on(feature, samples) else {
                continue;
            };
            evaluated += 1;

            if best
                .as_ref()
                .is_none_or(|best_split| split.impurity < best_split.impurity)
            {
                best = Some(split);
            }
        }

        best
    }
}

/// An ensemble of decision trees fitted on bootstrap samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on `vectors` labelled with `labels`.
    ///
    /// `vectors` and `labels` must be the same length and non-empty.
    pub fn fit(
        vectors: &[SparseVector],
        labels: &[String],
        feature_count: usize,
        config: ForestConfig,
    ) -> Self {
        let mut classes = labels.to_vec();
        classes.sort();
        classes.dedup();

        let label_indices: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let rows: Vec<Vec<f64>> = vectors
            .iter()
            .map(|vector| {
                let mut row = vec![0.0; feature_count];
                for &(index, value) in vector {
                    row[index] = value;
                }
                row
            })
            .collect();

        let training_set = TrainingSet {
            rows: &rows,
            labels: &label_indices,
            class_count: classes.len(),
            feature_count,
            max_features: ((feature_count as f64).sqrt() as usize).max(1),
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let sample_count = rows.len();

        let trees = (0..config.tree_count.max(1))
            .map(|_| {
                let mut tree_rng = StdRng::seed_from_u64(rng.r#gen());
                let bootstrap: Vec<usize> = (0..sample_count)
                    .map(|_| tree_rng.gen_range(0..sample_count))
                    .collect();

                let mut nodes = Vec::new();
                training_set.grow(&bootstrap, &mut tree_rng, &mut nodes);

                DecisionTree { nodes }
            })
            .collect();

        Self { classes, trees }
    }

    /// The class labels the forest can predict, sorted.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Predict the most probable class for `vector`.
    ///
    /// Class probabilities are averaged over all trees. Ties go to the class that sorts first.
    pub fn predict(&self, vector: &SparseVector) -> &str {
        let mut probabilities = vec![0.0; self.classes.len()];

        for tree in &self.trees {
            for (total, probability) in probabilities
                .iter_mut()
                .zip(tree.predict_distribution(vector))
            {
                *total += probability;
            }
        }

        let mut best_class = 0;
        for (class, probability) in probabilities.iter().enumerate() {
            if *probability > probabilities[best_class] {
                best_class = class;
            }
        }

        &self.classes[best_class]
    }
}

#[cfg(test)]
mod tests {
    use super::{DecisionTree, ForestConfig, Node, RandomForest};

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|label| label.to_string()).collect()
    }

    #[test]
    fn separates_classes_on_distinct_features() {
        let vectors = vec![
            vec![(0, 1.0)],
            vec![(0, 0.8)],
            vec![(1, 1.0)],
            vec![(1, 0.9)],
        ];
        let labels = labels(&["Food", "Food", "Transport", "Transport"]);

        let forest = RandomForest::fit(&vectors, &labels, 2, ForestConfig::default());

        assert_eq!(forest.predict(&vec![(0, 1.0)]), "Food");
        assert_eq!(forest.predict(&vec![(1, 1.0)]), "Transport");
        assert_eq!(forest.classes(), ["Food", "Transport"]);
    }

    #[test]
    fn same_seed_gives_same_forest() {
        let vectors = vec![vec![(0, 1.0)], vec![(1, 1.0)], vec![(0, 0.5), (1, 0.5)]];
        let labels = labels(&["A", "B", "A"]);
        let config = ForestConfig {
            tree_count: 10,
            seed: 7,
        };

        let first = RandomForest::fit(&vectors, &labels, 2, config);
        let second = RandomForest::fit(&vectors, &labels, 2, config);

        assert_eq!(first, second);
    }

    #[test]
    fn ties_go_to_first_class() {
        let forest = RandomForest {
            classes: labels(&["Art", "Zoo"]),
            trees: vec![DecisionTree {
                nodes: vec![Node::Leaf {
                    distribution: vec![0.5, 0.5],
                }],
            }],
        };

        assert_eq!(forest.predict(&Vec::new()), "Art");
    }
}
