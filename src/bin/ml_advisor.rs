use anyhow::Result;
use clap::Parser;
use stockscore::application::pipeline::EvaluationPipeline;
use stockscore::config::Config;
use stockscore::infrastructure::ServiceFactory;
use stockscore::interfaces::console;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Classifier verdict: will the price rise 5% within 10 trading days?
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stock symbol, e.g. RELIANCE (prompted when omitted)
    #[arg(long)]
    symbol: Option<String>,

    /// History window used for the prediction, e.g. 1y (prompted when omitted)
    #[arg(long)]
    period: Option<String>,

    /// Reuse a stored model when its feature schema still matches
    #[arg(long)]
    reuse_model: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let symbol = console::resolve_symbol(args.symbol, &mut input, &mut output)?;
    let period = console::resolve_period(args.period, &mut input, &mut output)?;

    let mut settings = config.pipeline_settings();
    settings.reuse_models |= args.reuse_model;
    info!(
        "ML advisor {} for {} (training on {})",
        env!("CARGO_PKG_VERSION"),
        symbol,
        settings.training_period
    );

    let pipeline = EvaluationPipeline::new(
        ServiceFactory::create_provider(&config),
        ServiceFactory::create_model_repository(&config)?,
        settings,
    );

    let evaluation = pipeline.evaluate_ml(&symbol, period).await?;
    print!("{}", console::render_ml_evaluation(&evaluation));
    Ok(())
}
