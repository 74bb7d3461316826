mod config;

use anyhow::Context;
use aspectra_ai::{PosTaggerModel, SentimentClassifier};
use aspectra_core::Pipeline;
use aspectra_server::{AppState, FeedbackLog, Metrics};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Cli, Command, ModelArgs};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    info!("aspectra v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = load_pipeline(&cli.models)?;

    match cli.command {
        Command::Serve { bind, feedback_log } => {
            let metrics = Metrics::new().context("registering metrics")?;
            let feedback = FeedbackLog::new(feedback_log);
            info!(path = %feedback.path().display(), "feedback log");
            let state = AppState::new(pipeline, feedback, metrics);

            tokio::runtime::Runtime::new()
                .context("starting tokio runtime")?
                .block_on(aspectra_server::serve(state, bind))
        }
        Command::Analyze { text } => {
            let result = pipeline.analyze(&text)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

fn load_pipeline(models: &ModelArgs) -> anyhow::Result<Pipeline> {
    let classifier = SentimentClassifier::load(&models.sentiment_model)
        .with_context(|| format!("loading sentiment model from {:?}", models.sentiment_model))?;
    let tagger = PosTaggerModel::load(&models.tagger_model)
        .with_context(|| format!("loading tagger model from {:?}", models.tagger_model))?;

    let pipeline = Pipeline::new(classifier, tagger, usize::from(models.workers))
        .context("building worker pool")?;
    info!(workers = pipeline.workers(), "pipeline ready");
    Ok(pipeline)
}
