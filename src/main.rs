use anyhow::Result;
use clap::Parser;
use stockscore::application::pipeline::EvaluationPipeline;
use stockscore::config::Config;
use stockscore::infrastructure::ServiceFactory;
use stockscore::infrastructure::persistence::InMemoryModelRepository;
use stockscore::interfaces::console;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Rule-based verdict from SMA, EMA, RSI and MACD signals
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stock symbol, e.g. RELIANCE (prompted when omitted)
    #[arg(long)]
    symbol: Option<String>,

    /// History window, e.g. 1y, 6mo, max (prompted when omitted)
    #[arg(long)]
    period: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(stdout_layer)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let symbol = console::resolve_symbol(args.symbol, &mut input, &mut output)?;
    let period = console::resolve_period(args.period, &mut input, &mut output)?;

    info!("stockscore {} evaluating {} over {}", env!("CARGO_PKG_VERSION"), symbol, period);

    // The rule path never touches stored models
    let pipeline = EvaluationPipeline::new(
        ServiceFactory::create_provider(&config),
        Box::new(InMemoryModelRepository::new()),
        config.pipeline_settings(),
    );

    let evaluation = pipeline.evaluate_rules(&symbol, period).await?;
    print!("{}", console::render_rule_evaluation(&evaluation));
    Ok(())
}
