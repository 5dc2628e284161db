use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tradelogit::application::TrainingService;
use tradelogit::application::ml::{PipelinePredictor, reporting};
use tradelogit::config::Config;
use tradelogit::infrastructure::DataSourceFactory;
use tradelogit::infrastructure::model_store::load_artifact;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score the next queued trade with a saved model", long_about = None)]
struct Args {
    /// Path to a model produced by train_ml (overrides MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let model_path = args.model.unwrap_or(config.training.model_path.clone());

    let artifact = load_artifact(&model_path)?;
    let predictor = PipelinePredictor::from_artifact(artifact)
        .with_context(|| format!("Model {:?} is not compatible with this build", model_path))?;

    let source = DataSourceFactory::create(&config.data_source).await?;
    let service = TrainingService::new(
        source,
        config.derivation.derivation,
        config.training.clone(),
    );

    match service.predict_queued(&predictor).await? {
        Some(result) => reporting::print_prediction(&result),
        None => println!("No queued trade to predict."),
    }

    Ok(())
}
