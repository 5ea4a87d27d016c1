use crate::domain::errors::TrainingError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use std::fmt;
use tracing::debug;

type Tree = DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

/// Hyper-parameters of the bagged tree ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParameters {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParameters {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Serialize, Deserialize)]
enum Member {
    Tree(Box<Tree>),
    /// Bootstrap sample held a single class
    Constant(u32),
}

/// Bootstrap-aggregated decision trees for the binary Target.
///
/// Each member is fit on a sample drawn with replacement (seeded with
/// `seed + member index`); class probability is the fraction of members
/// voting for the class.
#[derive(Serialize, Deserialize)]
pub struct BaggedForest {
    members: Vec<Member>,
}

impl fmt::Debug for BaggedForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constant = self
            .members
            .iter()
            .filter(|m| matches!(m, Member::Constant(_)))
            .count();
        f.debug_struct("BaggedForest")
            .field("members", &self.members.len())
            .field("constant_members", &constant)
            .finish()
    }
}

impl BaggedForest {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[u32],
        params: &ForestParameters,
    ) -> Result<Self, TrainingError> {
        if x.is_empty() || y.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(TrainingError::Classifier {
                reason: format!("{} feature rows but {} targets", x.len(), y.len()),
            });
        }

        let n = x.len();
        let n_trees = params.n_trees.max(1);
        let tree_params = DecisionTreeClassifierParameters::default()
            .with_max_depth(params.max_depth)
            .with_min_samples_split(params.min_samples_split);

        let mut members = Vec::with_capacity(n_trees);
        for i in 0..n_trees {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
            let indices: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();

            let sample_y: Vec<u32> = indices.iter().map(|&idx| y[idx]).collect();
            if let Some(class) = single_class(&sample_y) {
                members.push(Member::Constant(class));
                continue;
            }

            let sample_x: Vec<Vec<f64>> = indices.iter().map(|&idx| x[idx].clone()).collect();
            let matrix = to_matrix(&sample_x)?;
            let tree = Tree::fit(&matrix, &sample_y, tree_params.clone()).map_err(|e| {
                TrainingError::Classifier {
                    reason: format!("tree {} failed to fit: {}", i, e),
                }
            })?;
            members.push(Member::Tree(Box::new(tree)));
        }

        debug!(
            "Fitted {} ensemble members on {} samples ({} constant)",
            members.len(),
            n,
            members
                .iter()
                .filter(|m| matches!(m, Member::Constant(_)))
                .count()
        );

        Ok(Self { members })
    }

    /// Ensemble that always predicts `class` with full confidence.
    pub fn constant(class: u32) -> Self {
        Self {
            members: vec![Member::Constant(class)],
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Probability of class 1 for each row.
    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, TrainingError> {
        if x.is_empty() {
            return Ok(Vec::new());
        }
        if self.members.is_empty() {
            return Err(TrainingError::Classifier {
                reason: "ensemble has no members".to_string(),
            });
        }

        let matrix = to_matrix(x)?;
        let mut positive_votes = vec![0usize; x.len()];

        for member in &self.members {
            match member {
                Member::Constant(class) => {
                    if *class == 1 {
                        positive_votes.iter_mut().for_each(|v| *v += 1);
                    }
                }
                Member::Tree(tree) => {
                    let predictions = tree.predict(&matrix).map_err(|e| {
                        TrainingError::Classifier {
                            reason: format!("prediction failed: {}", e),
                        }
                    })?;
                    for (votes, class) in positive_votes.iter_mut().zip(predictions) {
                        if class == 1 {
                            *votes += 1;
                        }
                    }
                }
            }
        }

        let total = self.members.len() as f64;
        Ok(positive_votes
            .into_iter()
            .map(|v| v as f64 / total)
            .collect())
    }

    /// Majority class per row. An exact tie resolves to class 0.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<u32>, TrainingError> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u32::from(p > 0.5))
            .collect())
    }
}

fn single_class(y: &[u32]) -> Option<u32> {
    let first = *y.first()?;
    y.iter().all(|&c| c == first).then_some(first)
}

fn to_matrix(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>, TrainingError> {
    DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(|e| TrainingError::Classifier {
        reason: format!("Matrix creation failed: {}", e),
    })
}
