//! Evaluation pipeline: fetch → indicators → {rule scorer | label → train → predict}.
//!
//! Every entry point takes its inputs as explicit parameters; interactive
//! prompting lives in `interfaces::console`.

use crate::application::indicators::IndicatorEngine;
use crate::application::indicators::engine::WARMUP_ROWS;
use crate::application::ml::labeling::{LabelGenerator, LabelingSettings};
use crate::application::ml::lifecycle::{ModelLifecycle, ModelSource, StoredModel};
use crate::application::ml::predictor::{ForestPredictor, MlPredictor};
use crate::application::ml::trainer::{ClassifierTrainer, TrainerSettings, TrainingReport};
use crate::application::scoring::RuleBasedScorer;
use crate::domain::analysis::indicator_frame::{IndicatorFrame, IndicatorRow};
use crate::domain::analysis::recommendation::{MlRecommendation, ScoreBreakdown};
use crate::domain::errors::EvaluationError;
use crate::domain::market::period::Period;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::repositories::ModelRepository;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// History used to train the classifier, independent of the requested period
    pub training_period: Period,
    /// Reuse a stored model whose schema tag matches instead of retraining
    pub reuse_models: bool,
    pub labeling: LabelingSettings,
    pub trainer: TrainerSettings,
    /// Recent rows returned for display
    pub tail_rows: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            training_period: Period::Years(5),
            reuse_models: false,
            labeling: LabelingSettings::default(),
            trainer: TrainerSettings::default(),
            tail_rows: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleEvaluation {
    pub symbol: String,
    pub period: Period,
    pub breakdown: ScoreBreakdown,
    pub recent: Vec<IndicatorRow>,
}

#[derive(Debug, Clone)]
pub struct MlEvaluation {
    pub symbol: String,
    pub period: Period,
    pub recommendation: MlRecommendation,
    pub source: ModelSource,
    pub report: TrainingReport,
    pub recent: Vec<IndicatorRow>,
}

pub struct EvaluationPipeline {
    provider: Box<dyn PriceHistoryProvider>,
    models: Box<dyn ModelRepository>,
    engine: IndicatorEngine,
    scorer: RuleBasedScorer,
    trainer: ClassifierTrainer,
    settings: PipelineSettings,
}

impl EvaluationPipeline {
    pub fn new(
        provider: Box<dyn PriceHistoryProvider>,
        models: Box<dyn ModelRepository>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            provider,
            models,
            engine: IndicatorEngine::new(),
            scorer: RuleBasedScorer::new(),
            trainer: ClassifierTrainer::new(settings.trainer.clone()),
            settings,
        }
    }

    /// Rule-based verdict on the latest row of `period`'s history.
    pub async fn evaluate_rules(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<RuleEvaluation, EvaluationError> {
        let symbol = normalize_symbol(symbol);
        let frame = self.load_frame(&symbol, &period).await?;
        let breakdown = self.scorer.score(&frame)?;

        info!(
            "{}: rule-based verdict {} (score {:+.2})",
            symbol, breakdown.verdict, breakdown.total
        );

        Ok(RuleEvaluation {
            recent: frame.tail(self.settings.tail_rows).to_vec(),
            symbol,
            period,
            breakdown,
        })
    }

    /// Classifier verdict on the latest complete row of `period`'s history.
    ///
    /// The model is trained on `training_period` history unless a stored model
    /// with a matching schema may be reused.
    pub async fn evaluate_ml(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<MlEvaluation, EvaluationError> {
        let symbol = normalize_symbol(symbol);
        let frame = self.load_frame(&symbol, &period).await?;
        // Fail before touching stored models when there is nothing to predict on
        if frame.latest_complete().is_none() {
            return Err(EvaluationError::InsufficientData {
                stage: "prediction",
                required: WARMUP_ROWS,
                available: frame.len(),
            });
        }

        let (artifact, source) = self.obtain_model(&symbol).await?;
        let report = artifact.report.clone();
        let predictor = ForestPredictor::new(artifact)?;
        let recommendation = predictor.predict(&frame)?;

        Ok(MlEvaluation {
            recent: frame.tail(self.settings.tail_rows).to_vec(),
            symbol,
            period,
            recommendation,
            source,
            report,
        })
    }

    /// Trains and stores a fresh model, replacing whatever was stored.
    pub async fn retrain(&self, symbol: &str) -> Result<TrainingReport, EvaluationError> {
        let symbol = normalize_symbol(symbol);
        let lifecycle = self.lifecycle();
        lifecycle.invalidate(&symbol)?;

        let training = self
            .load_frame(&symbol, &self.settings.training_period)
            .await?;
        let artifact = lifecycle.train_and_store(&symbol, &training)?;
        Ok(artifact.report)
    }

    async fn obtain_model(
        &self,
        symbol: &str,
    ) -> Result<(ModelArtifact, ModelSource), EvaluationError> {
        let lifecycle = self.lifecycle();

        let source = if self.settings.reuse_models {
            match lifecycle.load_current(symbol)? {
                StoredModel::Usable(artifact) => return Ok((artifact, ModelSource::Reused)),
                StoredModel::Discarded { stale_schema } => {
                    ModelSource::Retrained { stale_schema }
                }
                StoredModel::Missing => ModelSource::Trained,
            }
        } else {
            // Each run trains from scratch; drop the previous artifact first.
            lifecycle.invalidate(symbol)?;
            ModelSource::Trained
        };

        info!(
            "{}: training model on {} of history...",
            symbol, self.settings.training_period
        );
        let training = self
            .load_frame(symbol, &self.settings.training_period)
            .await?;
        let artifact = lifecycle.train_and_store(symbol, &training)?;
        Ok((artifact, source))
    }

    async fn load_frame(
        &self,
        symbol: &str,
        period: &Period,
    ) -> Result<IndicatorFrame, EvaluationError> {
        let series = self.provider.fetch(symbol, period).await?;
        if series.is_empty() {
            return Err(EvaluationError::NoData {
                symbol: symbol.to_string(),
                period: period.to_string(),
            });
        }

        info!(
            "{}: {} rows over {} from {}",
            symbol,
            series.len(),
            period,
            self.provider.name()
        );
        Ok(self.engine.compute(&series)?)
    }

    fn lifecycle(&self) -> ModelLifecycle<'_> {
        ModelLifecycle::new(
            self.models.as_ref(),
            LabelGenerator::new(self.settings.labeling),
            &self.trainer,
        )
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
