use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serialized result of one fitting run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BehaviorModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// RNG seed the run used; rerunning with the same seed and data
    /// reproduces the model exactly.
    pub seed: u64,
    pub final_loss: f64,
    pub iterations: usize,
    pub weights: Vec<TrainedWeight>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainedWeight {
    pub id: String,
    pub weight: f64,
}
