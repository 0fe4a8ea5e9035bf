use chrono::{DateTime, Utc};
use pgpong_policy::network::PolicyParameters;
use pgpong_training::checkpoint::BatchOutcome;
use serde::{Deserialize, Serialize};

/// Weights saved during or after training.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeightsFile {
    pub trained_at: DateTime<Utc>,
    /// Zero-based index of the last batch included in these weights.
    pub batch: usize,
    pub params: PolicyParameters,
}

/// Mean episode score of every batch so far.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HistoryFile {
    pub batches: Vec<BatchOutcome>,
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_weights_file_roundtrip_keeps_shapes() {
        let params = PolicyParameters::from_matrices(
            array![[0.1, -0.2, 0.3], [0.0, 1.5, -2.5]],
            array![[0.25, -0.75]],
        )
        .unwrap();
        let file = WeightsFile {
            trained_at: Utc::now(),
            batch: 40,
            params,
        };
        let json = serde_json::to_string_pretty(&file).unwrap();
        let back: WeightsFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.batch, 40);
        assert_eq!(back.params, file.params);
        assert_eq!(back.trained_at, file.trained_at);
    }

    #[test]
    fn test_history_file_format() {
        let history = HistoryFile {
            batches: vec![
                BatchOutcome {
                    losses: 21.0,
                    wins: 0.5,
                },
                BatchOutcome {
                    losses: 20.0,
                    wins: 2.0,
                },
            ],
        };
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(
            json,
            r#"{"batches":[{"losses":21.0,"wins":0.5},{"losses":20.0,"wins":2.0}]}"#
        );
    }
}
