//! Thin text adapter over the evaluation pipeline.
//!
//! Reads whatever the command line did not supply and renders results as
//! plain text. Rendering returns `String`s so the binaries own stdout.

use crate::application::ml::lifecycle::ModelSource;
use crate::application::ml::trainer::TrainingReport;
use crate::application::pipeline::{MlEvaluation, RuleEvaluation};
use crate::domain::analysis::indicator_frame::IndicatorRow;
use crate::domain::market::period::Period;
use anyhow::{Context, Result};
use chrono::DateTime;
use std::fmt::Write as _;
use std::io::{BufRead, Write};

pub const DEFAULT_PERIOD: &str = "1y";

/// Prints `message` and reads one trimmed line.
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<String> {
    write!(output, "{}", message).context("Failed to write prompt")?;
    output.flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim().to_string())
}

/// Uses `given` when present, otherwise asks for a symbol. Empty answers are rejected.
pub fn resolve_symbol<R: BufRead, W: Write>(
    given: Option<String>,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    let raw = match given {
        Some(symbol) => symbol,
        None => prompt_line(input, output, "Enter stock ID (e.g., RELIANCE): ")?,
    };
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        anyhow::bail!("A stock symbol is required");
    }
    Ok(symbol)
}

/// Uses `given` when present, otherwise asks for a period; blank means `1y`.
pub fn resolve_period<R: BufRead, W: Write>(
    given: Option<String>,
    input: &mut R,
    output: &mut W,
) -> Result<Period> {
    let raw = match given {
        Some(period) => period,
        None => prompt_line(
            input,
            output,
            &format!("Enter period (e.g., 1y, 5y, 6mo, max) [{}]: ", DEFAULT_PERIOD),
        )?,
    };
    let raw = if raw.trim().is_empty() {
        DEFAULT_PERIOD.to_string()
    } else {
        raw
    };
    raw.parse::<Period>()
        .with_context(|| format!("Cannot use period '{}'", raw.trim()))
}

fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{:.2}", v))
}

pub fn render_indicator_table(rows: &[IndicatorRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8} {:>11}",
        "Date", "Close", "SMA_50", "SMA_200", "EMA_50", "EMA_200", "RSI", "MACD", "Signal_Line"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<10} {:>10.2} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8} {:>11}",
            format_date(row.timestamp),
            row.close,
            cell(row.sma_50),
            cell(row.sma_200),
            cell(row.ema_50),
            cell(row.ema_200),
            cell(row.rsi),
            cell(row.macd),
            cell(row.signal_line)
        );
    }
    out
}

pub fn render_rule_evaluation(evaluation: &RuleEvaluation) -> String {
    let b = &evaluation.breakdown;
    let mut out = String::new();
    let _ = writeln!(out, "\nRecommendation: {}", b.verdict);
    let _ = writeln!(
        out,
        "Score {:+.2} as of {} (SMA {:+.1}, EMA {:+.1}, RSI {:+.1}, MACD {:+.2})",
        b.total,
        format_date(b.as_of),
        b.sma_trend,
        b.ema_trend,
        b.rsi,
        b.macd
    );
    let _ = writeln!(out, "\nRecent Stock Data for Analysis:");
    out.push_str(&render_indicator_table(&evaluation.recent));
    out
}

pub fn render_training_report(report: &TrainingReport) -> String {
    let mut out = String::new();
    if let Some(class) = report.degenerate {
        let _ = writeln!(
            out,
            "Training data held only class {}; the model always predicts it.",
            class
        );
    }
    let _ = writeln!(
        out,
        "Trained on {} rows, evaluated on {}.",
        report.train_samples, report.test_samples
    );
    match &report.evaluation {
        Some(evaluation) => {
            let _ = writeln!(out, "Model Evaluation:\n{}", evaluation);
        }
        None => {
            let _ = writeln!(out, "Model Evaluation: no held-out rows.");
        }
    }
    out
}

pub fn render_ml_evaluation(evaluation: &MlEvaluation) -> String {
    let mut out = String::new();
    match &evaluation.source {
        ModelSource::Reused => {
            let _ = writeln!(out, "Using stored model for {}.", evaluation.symbol);
        }
        ModelSource::Trained => {
            out.push_str(&render_training_report(&evaluation.report));
        }
        ModelSource::Retrained { stale_schema } => {
            let _ = writeln!(
                out,
                "Discarded stored model with feature schema {}.",
                stale_schema
            );
            out.push_str(&render_training_report(&evaluation.report));
        }
    }

    let rec = &evaluation.recommendation;
    let _ = writeln!(out, "Confidence: {:.2}%", rec.confidence * 100.0);
    let _ = writeln!(
        out,
        "\nML Recommendation for {} (as of {}): {}",
        evaluation.symbol,
        format_date(rec.as_of),
        rec.decision
    );
    out
}
