use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use stockscore::application::ml::ensemble::{BaggedForest, ForestParameters};
use stockscore::application::ml::labeling::LabelingSettings;
use stockscore::application::ml::lifecycle::ModelSource;
use stockscore::application::ml::trainer::{TrainerSettings, TrainingReport};
use stockscore::application::pipeline::{EvaluationPipeline, PipelineSettings};
use stockscore::domain::analysis::recommendation::{MlDecision, Verdict};
use stockscore::domain::errors::EvaluationError;
use stockscore::domain::market::period::Period;
use stockscore::domain::market::price_series::{PriceBar, PriceSeries};
use stockscore::domain::ml::artifact::ModelArtifact;
use stockscore::domain::ml::feature_registry::FeatureSchema;
use stockscore::domain::repositories::ModelRepository;
use stockscore::infrastructure::InMemoryPriceProvider;
use stockscore::infrastructure::persistence::InMemoryModelRepository;

const DAY: i64 = 86_400;

fn series(symbol: &str, closes: impl IntoIterator<Item = f64>) -> PriceSeries {
    let bars = closes
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let price = Decimal::from_f64(c).unwrap();
            PriceBar {
                timestamp: 1_500_000_000 + i as i64 * DAY,
                open: price,
                high: price,
                low: price,
                close: price,
                volume: Decimal::new(10_000, 0),
            }
        })
        .collect();
    PriceSeries::new(symbol, bars).unwrap()
}

fn fast_settings(reuse_models: bool) -> PipelineSettings {
    PipelineSettings {
        reuse_models,
        trainer: TrainerSettings {
            forest: ForestParameters {
                n_trees: 10,
                ..ForestParameters::default()
            },
            test_fraction: 0.2,
        },
        ..PipelineSettings::default()
    }
}

fn pipeline(
    series: PriceSeries,
    settings: PipelineSettings,
) -> (EvaluationPipeline, InMemoryPriceProvider, InMemoryModelRepository) {
    let provider = InMemoryPriceProvider::with_series(series);
    let models = InMemoryModelRepository::new();
    let pipeline = EvaluationPipeline::new(
        Box::new(provider.clone()),
        Box::new(models.clone()),
        settings,
    );
    (pipeline, provider, models)
}

/// A model that always answers BUY, tagged with `schema`.
fn constant_artifact(symbol: &str, schema: FeatureSchema) -> ModelArtifact {
    ModelArtifact {
        symbol: symbol.to_string(),
        schema,
        trained_at: chrono::Utc::now(),
        forest: ForestParameters::default(),
        labeling: LabelingSettings::default(),
        report: TrainingReport {
            train_samples: 1,
            test_samples: 0,
            evaluation: None,
            degenerate: Some(1),
        },
        classifier: BaggedForest::constant(1),
    }
}

#[tokio::test]
async fn test_flat_series_is_not_a_good_investment() {
    let (pipeline, _, _) = pipeline(
        series("FLAT", std::iter::repeat_n(100.0, 300)),
        PipelineSettings::default(),
    );

    let evaluation = pipeline.evaluate_rules("flat", Period::Years(1)).await.unwrap();
    let b = &evaluation.breakdown;

    assert_eq!(evaluation.symbol, "FLAT");
    assert_eq!(b.sma_trend, -0.25);
    assert_eq!(b.ema_trend, -0.25);
    assert_eq!(b.rsi, 0.0);
    assert_eq!(b.macd, -0.5);
    assert_eq!(b.total, -1.0);
    assert_eq!(b.verdict, Verdict::NotAGoodInvestment);
    assert_eq!(evaluation.recent.len(), 5);
}

#[tokio::test]
async fn test_steady_uptrend_is_buy() {
    let (pipeline, _, _) = pipeline(
        series("UP", (0..250).map(|i| 100.0 + i as f64)),
        PipelineSettings::default(),
    );

    let evaluation = pipeline.evaluate_rules("UP", Period::Years(1)).await.unwrap();
    let b = &evaluation.breakdown;

    assert_eq!(b.sma_trend, 1.0);
    assert_eq!(b.ema_trend, 1.0);
    // Uninterrupted gains pin RSI at 100
    assert_eq!(b.rsi, -0.5);
    assert!(b.total >= 1.5);
    assert_eq!(b.verdict, Verdict::Buy);
}

#[tokio::test]
async fn test_short_history_is_insufficient() {
    let (pipeline, _, models) = pipeline(
        series("NEW", (0..150).map(|i| 50.0 + i as f64 * 0.1)),
        fast_settings(false),
    );

    let rules = pipeline.evaluate_rules("NEW", Period::Months(6)).await;
    assert!(matches!(
        rules,
        Err(EvaluationError::InsufficientData { required: 200, available: 150, .. })
    ));

    let ml = pipeline.evaluate_ml("NEW", Period::Months(6)).await;
    assert!(matches!(
        ml,
        Err(EvaluationError::InsufficientData { stage: "prediction", available: 150, .. })
    ));
    assert!(!models.contains("NEW"));
}

#[tokio::test]
async fn test_short_history_leaves_stored_model_alone() {
    let (pipeline, provider, models) = pipeline(
        series("NEW", (0..150).map(|i| 50.0 + i as f64 * 0.1)),
        fast_settings(false),
    );
    models.save(&constant_artifact("NEW", FeatureSchema::current())).unwrap();

    let ml = pipeline.evaluate_ml("NEW", Period::Years(1)).await;

    assert!(matches!(
        ml,
        Err(EvaluationError::InsufficientData { stage: "prediction", .. })
    ));
    assert!(models.contains("NEW"));
    // Training history was never fetched
    assert_eq!(provider.fetch_count(), 1);
}

#[tokio::test]
async fn test_unknown_symbol_is_no_data() {
    let (pipeline, _, _) = pipeline(series("TCS", std::iter::repeat_n(10.0, 5)), fast_settings(false));

    let result = pipeline.evaluate_rules("NOSUCH", Period::Years(1)).await;
    assert!(matches!(result, Err(EvaluationError::NoData { .. })));

    let result = pipeline.evaluate_ml("NOSUCH", Period::Years(1)).await;
    assert!(matches!(result, Err(EvaluationError::NoData { .. })));
}

#[tokio::test]
async fn test_never_rising_five_percent_predicts_no_buy() {
    let (pipeline, _, models) = pipeline(
        series("SLOW", (0..1250).map(|i| 100.0 + i as f64 * 0.01)),
        fast_settings(false),
    );

    let evaluation = pipeline.evaluate_ml("SLOW", Period::Years(1)).await.unwrap();

    assert_eq!(evaluation.source, ModelSource::Trained);
    assert_eq!(evaluation.report.degenerate, Some(0));
    // 1051 complete rows, the last 10 have no future close
    assert_eq!(
        evaluation.report.train_samples + evaluation.report.test_samples,
        1041
    );
    assert_eq!(evaluation.recommendation.decision, MlDecision::NoBuy);
    assert_eq!(evaluation.recommendation.confidence, 1.0);
    assert!(models.contains("SLOW"));
}

#[tokio::test]
async fn test_mixed_labels_train_a_real_forest() {
    let (pipeline, _, _) = pipeline(
        series("WAVE", (0..1250).map(|i| 100.0 + 10.0 * (i as f64 / 8.0).sin())),
        fast_settings(false),
    );

    let evaluation = pipeline.evaluate_ml("WAVE", Period::Years(1)).await.unwrap();

    assert_eq!(evaluation.report.degenerate, None);
    assert_eq!(evaluation.report.test_samples, 209);
    assert!(evaluation.report.evaluation.is_some());
    let confidence = evaluation.recommendation.confidence;
    assert!((0.5..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_each_run_retrains_by_default() {
    let (pipeline, provider, _) = pipeline(
        series("SLOW", (0..400).map(|i| 100.0 + i as f64 * 0.01)),
        fast_settings(false),
    );

    let first = pipeline.evaluate_ml("SLOW", Period::Years(1)).await.unwrap();
    let second = pipeline.evaluate_ml("SLOW", Period::Years(1)).await.unwrap();

    assert_eq!(first.source, ModelSource::Trained);
    assert_eq!(second.source, ModelSource::Trained);
    // Prediction history plus training history, per run
    assert_eq!(provider.fetch_count(), 4);
}

#[tokio::test]
async fn test_stale_schema_is_discarded_then_reused() {
    let (pipeline, provider, models) = pipeline(
        series("TCS", (0..400).map(|i| 100.0 + i as f64 * 0.01)),
        fast_settings(true),
    );

    let stale = constant_artifact(
        "TCS",
        FeatureSchema {
            version: 1,
            names: vec!["SMA_50".into(), "SMA_200".into(), "RSI".into()],
        },
    );
    models.save(&stale).unwrap();

    let first = pipeline.evaluate_ml("TCS", Period::Years(1)).await.unwrap();
    assert_eq!(
        first.source,
        ModelSource::Retrained {
            stale_schema: "v1:SMA_50,SMA_200,RSI".to_string()
        }
    );
    // The stale constant-BUY model was not used
    assert_eq!(first.recommendation.decision, MlDecision::NoBuy);
    let stored = models.load("TCS").unwrap().unwrap();
    assert_eq!(stored.schema, FeatureSchema::current());

    let second = pipeline.evaluate_ml("TCS", Period::Years(1)).await.unwrap();
    assert_eq!(second.source, ModelSource::Reused);
    assert_eq!(second.recommendation, first.recommendation);
    assert_eq!(provider.fetch_count(), 3);
}

#[tokio::test]
async fn test_older_artifact_layout_is_replaced() {
    let (pipeline, _, models) = pipeline(
        series("TCS", (0..400).map(|i| 100.0 + i as f64 * 0.01)),
        fast_settings(true),
    );
    models.insert_raw(
        "TCS",
        r#"{"symbol":"TCS","schema":{"version":1,"names":["SMA_50","RSI"]},"classifier":{"trees":[]}}"#
            .to_string(),
    );

    let first = pipeline.evaluate_ml("TCS", Period::Years(1)).await.unwrap();
    assert_eq!(
        first.source,
        ModelSource::Retrained {
            stale_schema: "v1:SMA_50,RSI".to_string()
        }
    );
    let stored = models.load("TCS").unwrap().unwrap();
    assert_eq!(stored.schema, FeatureSchema::current());

    let second = pipeline.evaluate_ml("TCS", Period::Years(1)).await.unwrap();
    assert_eq!(second.source, ModelSource::Reused);
}

#[tokio::test]
async fn test_retrain_replaces_stored_model() {
    let (pipeline, _, models) = pipeline(
        series("INFY", (0..400).map(|i| 100.0 + i as f64 * 0.01)),
        fast_settings(true),
    );

    let report = pipeline.retrain("infy").await.unwrap();
    assert_eq!(report.degenerate, Some(0));

    let stored = models.load("INFY").unwrap().unwrap();
    assert_eq!(stored.report.train_samples, report.train_samples);
    assert_eq!(stored.report.degenerate, Some(0));
    assert_eq!(stored.forest.n_trees, 10);
}
