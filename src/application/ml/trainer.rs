use super::ensemble::{BaggedForest, ForestParameters};
use super::labeling::LabeledDataset;
use super::metrics::ClassificationReport;
use crate::domain::errors::TrainingError;
use crate::domain::ml::feature_registry::FEATURE_COUNT;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerSettings {
    pub forest: ForestParameters,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            forest: ForestParameters::default(),
            test_fraction: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub test_samples: usize,
    /// Held-out metrics; `None` when nothing was held out
    pub evaluation: Option<ClassificationReport>,
    /// Set when every label had the same class and the model is constant
    pub degenerate: Option<u32>,
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub classifier: BaggedForest,
    pub report: TrainingReport,
}

/// Fits the bagged tree ensemble on a labeled dataset and evaluates it on a
/// deterministic shuffled hold-out.
pub struct ClassifierTrainer {
    settings: TrainerSettings,
}

impl ClassifierTrainer {
    pub fn new(settings: TrainerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    pub fn train(&self, dataset: &LabeledDataset) -> Result<TrainingOutcome, TrainingError> {
        if dataset.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }

        let x = dataset.features();
        let y = dataset.targets();
        if let Some((row, found)) = x
            .iter()
            .enumerate()
            .find(|(_, f)| f.len() != FEATURE_COUNT)
            .map(|(i, f)| (i, f.len()))
        {
            return Err(TrainingError::RaggedFeatures {
                row,
                found,
                expected: FEATURE_COUNT,
            });
        }

        let (train_idx, test_idx) = self.split_indices(x.len());
        let pick_x = |idx: &[usize]| idx.iter().map(|&i| x[i].clone()).collect::<Vec<_>>();
        let pick_y = |idx: &[usize]| idx.iter().map(|&i| y[i]).collect::<Vec<_>>();
        let (x_train, y_train) = (pick_x(&train_idx), pick_y(&train_idx));
        let (x_test, y_test) = (pick_x(&test_idx), pick_y(&test_idx));

        let degenerate = single_class(&y);
        let classifier = match degenerate {
            Some(class) => {
                warn!(
                    "{}: degenerate training set, all {} labels are class {}. Predictions will be constant.",
                    dataset.symbol,
                    y.len(),
                    class
                );
                BaggedForest::constant(class)
            }
            None => {
                info!(
                    "{}: training {} trees (depth {}) on {} samples...",
                    dataset.symbol,
                    self.settings.forest.n_trees,
                    self.settings.forest.max_depth,
                    x_train.len()
                );
                BaggedForest::fit(&x_train, &y_train, &self.settings.forest)?
            }
        };

        let evaluation = if x_test.is_empty() {
            info!("{}: no rows held out, skipping evaluation", dataset.symbol);
            None
        } else {
            let predicted = classifier.predict(&x_test)?;
            let report = ClassificationReport::from_predictions(&y_test, &predicted);
            info!(
                "{}: held-out evaluation (n={})\n{}",
                dataset.symbol, report.samples, report
            );
            Some(report)
        };

        Ok(TrainingOutcome {
            classifier,
            report: TrainingReport {
                train_samples: x_train.len(),
                test_samples: x_test.len(),
                evaluation,
                degenerate,
            },
        })
    }

    /// Shuffled train/test indices. The held-out size is rounded up and at
    /// least one row always stays in training.
    fn split_indices(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.settings.forest.seed);
        indices.shuffle(&mut rng);

        let fraction = self.settings.test_fraction.clamp(0.0, 1.0);
        let test_size = ((n as f64 * fraction).ceil() as usize).min(n.saturating_sub(1));
        let train = indices.split_off(test_size);
        (train, indices)
    }
}

fn single_class(y: &[u32]) -> Option<u32> {
    let first = *y.first()?;
    y.iter().all(|&c| c == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::labeling::LabeledRow;
    use crate::domain::ml::feature_registry::FeatureVector;

    fn dataset(n: usize, label: impl Fn(usize) -> u32) -> LabeledDataset {
        LabeledDataset {
            symbol: "TEST".to_string(),
            rows: (0..n)
                .map(|i| {
                    let v = i as f64;
                    LabeledRow {
                        timestamp: i as i64,
                        features: FeatureVector([v, v * 0.5, v, v * 0.5, 50.0, v / 10.0, 0.0]),
                        target: label(i),
                    }
                })
                .collect(),
        }
    }

    fn small_trainer() -> ClassifierTrainer {
        ClassifierTrainer::new(TrainerSettings {
            forest: ForestParameters {
                n_trees: 10,
                ..Default::default()
            },
            test_fraction: 0.2,
        })
    }

    #[test]
    fn test_split_is_80_20() {
        let outcome = small_trainer()
            .train(&dataset(100, |i| u32::from(i >= 50)))
            .unwrap();
        assert_eq!(outcome.report.train_samples, 80);
        assert_eq!(outcome.report.test_samples, 20);
        assert!(outcome.report.evaluation.is_some());
        assert!(outcome.report.degenerate.is_none());
    }

    #[test]
    fn test_split_is_deterministic() {
        let trainer = small_trainer();
        assert_eq!(trainer.split_indices(50), trainer.split_indices(50));
    }

    #[test]
    fn test_single_class_is_degenerate_not_fatal() {
        let outcome = small_trainer().train(&dataset(40, |_| 0)).unwrap();
        assert_eq!(outcome.report.degenerate, Some(0));

        let proba = outcome
            .classifier
            .predict_proba(&[vec![1.0, 2.0, 3.0, 4.0, 50.0, 0.1, 0.0]])
            .unwrap();
        assert_eq!(proba, vec![0.0]);
    }

    #[test]
    fn test_two_rows_train_without_crashing() {
        let outcome = small_trainer()
            .train(&dataset(2, |i| i as u32))
            .unwrap();
        assert_eq!(outcome.report.train_samples, 1);
        assert_eq!(outcome.report.test_samples, 1);
    }

    #[test]
    fn test_single_row_skips_evaluation() {
        let outcome = small_trainer().train(&dataset(1, |_| 1)).unwrap();
        assert_eq!(outcome.report.test_samples, 0);
        assert!(outcome.report.evaluation.is_none());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        assert!(matches!(
            small_trainer().train(&dataset(0, |_| 0)),
            Err(TrainingError::EmptyTrainingSet)
        ));
    }
}
