//! Bundled estimator families.
//!
//! An artifact describes its estimator as [`EstimatorSpec`] (column names,
//! as written to disk). [`EstimatorSpec::build`] checks it against the
//! artifact's column layout once and resolves every column name to an index,
//! so scoring never looks anything up by name.

use crate::scorer::{FeatureRow, RawScore, ScoreError, Scorer};
use incidentx_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// On-disk estimator description, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorSpec {
    /// `intercept + coefficients · x`
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    /// `sigmoid(intercept + coefficients · x)` as `[1 - p, p]`
    Logistic {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    /// Mean of the tree outputs
    RandomForestRegressor { trees: Vec<TreeSpec> },
    /// `sigmoid(init + learning_rate * Σ tree)` as `[1 - p, p]`
    GradientBoostingClassifier {
        init: f64,
        learning_rate: f64,
        trees: Vec<TreeSpec>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

/// A split goes to `left` when `x[column] <= threshold`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NodeSpec {
    Split {
        column: String,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl EstimatorSpec {
    pub fn type_name(&self) -> &'static str {
        match self {
            EstimatorSpec::Linear { .. } => "linear",
            EstimatorSpec::Logistic { .. } => "logistic",
            EstimatorSpec::RandomForestRegressor { .. } => "random_forest_regressor",
            EstimatorSpec::GradientBoostingClassifier { .. } => "gradient_boosting_classifier",
        }
    }

    /// Whether this family yields class probabilities rather than a value
    pub fn is_classifier(&self) -> bool {
        matches!(
            self,
            EstimatorSpec::Logistic { .. } | EstimatorSpec::GradientBoostingClassifier { .. }
        )
    }

    /// Check against `columns` and resolve into a scorer
    pub fn build(self, columns: &[String]) -> Result<Estimator> {
        let family = self.type_name();
        let kind = match self {
            EstimatorSpec::Linear { intercept, coefficients } => {
                EstimatorKind::Linear(LinearModel::new(intercept, coefficients, columns)?)
            }
            EstimatorSpec::Logistic { intercept, coefficients } => {
                EstimatorKind::Logistic(LinearModel::new(intercept, coefficients, columns)?)
            }
            EstimatorSpec::RandomForestRegressor { trees } => {
                EstimatorKind::Forest(build_trees(trees, columns)?)
            }
            EstimatorSpec::GradientBoostingClassifier { init, learning_rate, trees } => {
                if !init.is_finite() || !learning_rate.is_finite() {
                    return Err(Error::InvalidArtifact(
                        "gradient boosting init and learning_rate must be finite".into(),
                    ));
                }
                EstimatorKind::Boosted {
                    init,
                    learning_rate,
                    trees: build_trees(trees, columns)?,
                }
            }
        };
        Ok(Estimator {
            family,
            n_features: columns.len(),
            kind,
        })
    }
}

/// A resolved, ready-to-score estimator
#[derive(Debug, Clone)]
pub struct Estimator {
    family: &'static str,
    n_features: usize,
    kind: EstimatorKind,
}

#[derive(Debug, Clone)]
enum EstimatorKind {
    Linear(LinearModel),
    Logistic(LinearModel),
    Forest(Vec<Tree>),
    Boosted {
        init: f64,
        learning_rate: f64,
        trees: Vec<Tree>,
    },
}

#[derive(Debug, Clone)]
struct LinearModel {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    fn new(intercept: f64, coefficients: Vec<f64>, columns: &[String]) -> Result<Self> {
        if coefficients.len() != columns.len() {
            return Err(Error::InvalidArtifact(format!(
                "{} coefficients for {} columns",
                coefficients.len(),
                columns.len()
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidArtifact("non-finite coefficient".into()));
        }
        Ok(Self { intercept, coefficients })
    }

    fn margin(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn build(spec: TreeSpec, tree_idx: usize, columns: &[String]) -> Result<Self> {
        let invalid = |node: usize, detail: String| {
            Error::InvalidArtifact(format!("tree {} node {}: {}", tree_idx, node, detail))
        };

        if spec.nodes.is_empty() {
            return Err(Error::InvalidArtifact(format!("tree {} has no nodes", tree_idx)));
        }

        let len = spec.nodes.len();
        let mut nodes = Vec::with_capacity(len);
        for (idx, node) in spec.nodes.into_iter().enumerate() {
            let node = match node {
                NodeSpec::Split { column, threshold, left, right } => {
                    let feature = columns
                        .iter()
                        .position(|c| *c == column)
                        .ok_or_else(|| invalid(idx, format!("unknown column '{}'", column)))?;
                    // Children strictly after their parent, so traversal terminates
                    for child in [left, right] {
                        if child <= idx || child >= len {
                            return Err(invalid(idx, format!("child {} out of order", child)));
                        }
                    }
                    if threshold.is_nan() {
                        return Err(invalid(idx, "NaN threshold".into()));
                    }
                    Node::Split { feature, threshold, left, right }
                }
                NodeSpec::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid(idx, "non-finite leaf".into()));
                    }
                    Node::Leaf(value)
                }
            };
            nodes.push(node);
        }
        Ok(Self { nodes })
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    fn count_splits(&self, counts: &mut [f64]) {
        for node in &self.nodes {
            if let Node::Split { feature, .. } = node {
                counts[*feature] += 1.0;
            }
        }
    }
}

fn build_trees(trees: Vec<TreeSpec>, columns: &[String]) -> Result<Vec<Tree>> {
    if trees.is_empty() {
        return Err(Error::InvalidArtifact("tree ensemble has no trees".into()));
    }
    trees
        .into_iter()
        .enumerate()
        .map(|(idx, tree)| Tree::build(tree, idx, columns))
        .collect()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn normalized(weights: Vec<f64>) -> Option<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        Some(weights.into_iter().map(|w| w / total).collect())
    } else {
        None
    }
}

impl Scorer for Estimator {
    fn score(&self, row: &FeatureRow<'_>) -> std::result::Result<RawScore, ScoreError> {
        if row.len() != self.n_features {
            return Err(ScoreError(format!(
                "{} expects {} features, got {}",
                self.family,
                self.n_features,
                row.len()
            )));
        }
        let x = row.values;

        let score = match &self.kind {
            EstimatorKind::Linear(model) => RawScore::Value(model.margin(x)),
            EstimatorKind::Logistic(model) => {
                let p = sigmoid(model.margin(x));
                RawScore::ClassProbabilities(vec![1.0 - p, p])
            }
            EstimatorKind::Forest(trees) => {
                let sum: f64 = trees.iter().map(|t| t.predict(x)).sum();
                RawScore::Value(sum / trees.len() as f64)
            }
            EstimatorKind::Boosted { init, learning_rate, trees } => {
                let sum: f64 = trees.iter().map(|t| t.predict(x)).sum();
                let p = sigmoid(init + learning_rate * sum);
                RawScore::ClassProbabilities(vec![1.0 - p, p])
            }
        };

        let finite = match &score {
            RawScore::Value(v) => v.is_finite(),
            RawScore::ClassProbabilities(ps) => ps.iter().all(|p| p.is_finite()),
        };
        if !finite {
            return Err(ScoreError(format!("{} produced a non-finite score", self.family)));
        }
        Ok(score)
    }

    fn feature_importance(&self) -> Option<Vec<f64>> {
        match &self.kind {
            EstimatorKind::Linear(model) | EstimatorKind::Logistic(model) => {
                normalized(model.coefficients.iter().map(|c| c.abs()).collect())
            }
            EstimatorKind::Forest(trees) | EstimatorKind::Boosted { trees, .. } => {
                let mut counts = vec![0.0; self.n_features];
                for tree in trees {
                    tree.count_splits(&mut counts);
                }
                normalized(counts)
            }
        }
    }

    fn family(&self) -> &str {
        self.family
    }
}
