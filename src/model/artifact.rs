use super::ScoreModel;
use crate::error::{PlanscopeError, Result};
use crate::types::record::Record;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// On-disk form of the single active model. Retraining overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: ScoreModel,
    pub trained_at: String,
    pub dataset_sha256: String,
    pub train_size: usize,
    pub test_size: usize,
    pub mse: f64,
    pub r2: f64,
}

pub fn save_model(path: &Path, artifact: &ModelArtifact) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let bytes = bincode::serialize(artifact)?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    fs::write(&staging, bytes)?;
    fs::rename(&staging, path)?;
    tracing::info!(path = %path.display(), "saved model artifact");
    Ok(())
}

pub fn load_model(path: &Path) -> Result<ModelArtifact> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PlanscopeError::ModelNotFound(path.display().to_string()));
        }
        Err(e) => {
            return Err(PlanscopeError::ReadFailure {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
        }
    };
    bincode::deserialize(&bytes).map_err(|e| PlanscopeError::ReadFailure {
        path: path.display().to_string(),
        reason: format!("not a model artifact: {e}"),
    })
}

/// SHA-256 over the training rows' scores, tiers and names, in order.
pub fn dataset_fingerprint(records: &[Record]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        for score in record.features() {
            hasher.update(score.to_le_bytes());
        }
        hasher.update(record.track.as_bytes());
        hasher.update([0u8]);
        hasher.update(record.award_tier.as_bytes());
        hasher.update([0u8]);
        hasher.update(record.project_name.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
