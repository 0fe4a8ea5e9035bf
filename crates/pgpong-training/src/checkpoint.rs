//! What a training run hands to durable storage.

use pgpong_policy::network::PolicyParameters;
use serde::{Deserialize, Serialize};

/// Average score of the episodes in one batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Mean points lost per episode.
    pub losses: f64,
    /// Mean points won per episode.
    pub wins: f64,
}

/// Destination for periodic snapshots of a training run.
///
/// Implementations decide the storage format; the trainer only promises the current weights
/// and the full, ordered outcome history.
pub trait CheckpointSink {
    type Error;

    fn save(
        &mut self,
        batch: usize,
        params: &PolicyParameters,
        history: &[BatchOutcome],
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_json_shape() {
        let outcome = BatchOutcome {
            losses: 20.5,
            wins: 3.0,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"losses":20.5,"wins":3.0}"#);
        assert_eq!(serde_json::from_str::<BatchOutcome>(&json).unwrap(), outcome);
    }
}
