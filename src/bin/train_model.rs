use anyhow::Result;
use clap::Parser;
use stockscore::application::pipeline::EvaluationPipeline;
use stockscore::config::Config;
use stockscore::infrastructure::ServiceFactory;
use stockscore::interfaces::console;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Train and store a classifier for one or more symbols
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Symbols to train, e.g. RELIANCE TCS
    #[arg(required = true)]
    symbols: Vec<String>,

    /// Training history, overrides TRAINING_PERIOD
    #[arg(long)]
    period: Option<String>,

    /// Number of trees, overrides N_TREES
    #[arg(long)]
    n_trees: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let mut settings = config.pipeline_settings();
    if let Some(period) = args.period {
        settings.training_period = period.parse()?;
    }
    if let Some(n_trees) = args.n_trees.filter(|&n| n > 0) {
        settings.trainer.forest.n_trees = n_trees;
    }

    let pipeline = EvaluationPipeline::new(
        ServiceFactory::create_provider(&config),
        ServiceFactory::create_model_repository(&config)?,
        settings,
    );

    for symbol in &args.symbols {
        info!("Training model for {}...", symbol);
        match pipeline.retrain(symbol).await {
            Ok(report) => {
                println!("\n{}", symbol.to_uppercase());
                print!("{}", console::render_training_report(&report));
            }
            Err(e) => println!("\n{}: training failed: {}", symbol.to_uppercase(), e),
        }
    }
    Ok(())
}
