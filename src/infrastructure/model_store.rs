use crate::application::ml::ModelArtifact;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Writes `artifact` as pretty JSON, creating parent directories as needed.
pub fn save_artifact(path: &Path, artifact: &ModelArtifact) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create model directory {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(artifact).context("Failed to serialize model")?;
    fs::write(path, json).with_context(|| format!("Failed to write model to {:?}", path))?;

    info!("Model saved to {:?}", path);
    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read model from {:?}", path))?;
    let artifact: ModelArtifact =
        serde_json::from_str(&json).with_context(|| format!("Invalid model file {:?}", path))?;

    info!(
        "Model loaded from {:?} (trained {})",
        path, artifact.trained_at
    );
    Ok(artifact)
}
