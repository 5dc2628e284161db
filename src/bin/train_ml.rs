use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tradelogit::application::TrainingService;
use tradelogit::application::ml::{PipelinePredictor, reporting};
use tradelogit::config::Config;
use tradelogit::infrastructure::csv_store::write_features_csv;
use tradelogit::infrastructure::model_store::save_artifact;
use tradelogit::infrastructure::DataSourceFactory;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the trade outcome classifier", long_about = None)]
struct Args {
    /// Path to output model file (overrides MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Fraction of trades held out for evaluation (overrides TEST_FRACTION)
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Also export the derived feature vectors to this CSV file
    #[arg(long)]
    features_out: Option<PathBuf>,

    /// Do not score the queued trade after training
    #[arg(long, default_value_t = false)]
    skip_prediction: bool,
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

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(model) = args.model {
        config.training.model_path = model;
    }
    if let Some(fraction) = args.test_fraction {
        if !(0.0..1.0).contains(&fraction) {
            anyhow::bail!("--test-fraction must be within [0, 1), got {}", fraction);
        }
        config.training.test_fraction = fraction;
    }

    let source = DataSourceFactory::create(&config.data_source).await?;
    let service = TrainingService::new(
        source,
        config.derivation.derivation,
        config.training.clone(),
    );

    info!("=============== Training model ===============");
    let outcome = service.train().await?;

    println!("\n{}", reporting::format_dataset_summary(&outcome.dataset.features));
    if !outcome.dataset.skipped.is_empty() {
        println!("Skipped {} trades:", outcome.dataset.skipped.len());
        for skipped in &outcome.dataset.skipped {
            println!("  #{}: {}", skipped.trade_id, skipped.reason);
        }
    }

    if let Some(path) = &args.features_out {
        write_features_csv(path, &outcome.dataset.features)?;
    }

    match &outcome.artifact.test_metrics {
        Some(metrics) => reporting::print_metrics(metrics),
        None => warn!("No test metrics available (empty test set)"),
    }

    save_artifact(&config.training.model_path, &outcome.artifact)?;

    if args.skip_prediction {
        return Ok(());
    }

    let predictor = PipelinePredictor::from_artifact(outcome.artifact)?;
    match service.predict_queued(&predictor).await? {
        Some(result) => reporting::print_prediction(&result),
        None => println!("No queued trade to predict."),
    }

    Ok(())
}
