//! Training hyper-parameters.

/// A [`TrainingConfig`] value that cannot be trained with.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{name} must be at least 1")]
    Zero { name: &'static str },
    #[display("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[display("momentum must be in [0, 1), got {value}")]
    Momentum { value: f64 },
}

/// Hyper-parameters of a REINFORCE training run.
///
/// Defaults follow the settings that train a working paddle policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    /// Hidden units `H`.
    pub num_hidden: usize,
    /// Standard deviation of the initial weights.
    pub initial_std: f64,
    /// Episodes sampled per parameter update.
    pub batch_size: usize,
    /// Hard cap on steps per episode.
    pub max_episode_length: usize,
    /// Step size of the first update.
    pub initial_step_size: f64,
    /// Velocity decay `γ`.
    pub momentum: f64,
    /// The step size is halved once every this many updates.
    pub halving_period: usize,
    /// Checkpoint after every this many batches.
    pub checkpoint_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_hidden: 10,
            initial_std: 1e-3,
            batch_size: 10,
            max_episode_length: 2000,
            initial_step_size: 1e-3,
            momentum: 0.5,
            halving_period: 50,
            checkpoint_interval: 10,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("num_hidden", self.num_hidden),
            ("batch_size", self.batch_size),
            ("max_episode_length", self.max_episode_length),
            ("halving_period", self.halving_period),
            ("checkpoint_interval", self.checkpoint_interval),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { name });
            }
        }
        for (name, value) in [
            ("initial_std", self.initial_std),
            ("initial_step_size", self.initial_step_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(ConfigError::Momentum {
                value: self.momentum,
            });
        }
        Ok(())
    }

    /// Returns `true` if the batch with zero-based index `batch` should be checkpointed.
    #[must_use]
    pub fn checkpoint_due(&self, batch: usize) -> bool {
        batch.is_multiple_of(self.checkpoint_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TrainingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let config = TrainingConfig {
            batch_size: 0,
            ..TrainingConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "batch_size must be at least 1");
    }

    #[test]
    fn test_rejects_bad_step_size() {
        for step in [0.0, -1e-3, f64::NAN, f64::INFINITY] {
            let config = TrainingConfig {
                initial_step_size: step,
                ..TrainingConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::NotPositive {
                    name: "initial_step_size",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_rejects_bad_momentum() {
        for momentum in [1.0, -0.1, f64::NAN] {
            let config = TrainingConfig {
                momentum,
                ..TrainingConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Momentum { .. })
            ));
        }
    }

    #[test]
    fn test_checkpoint_cadence() {
        let config = TrainingConfig::default();
        let due = (0..25).filter(|b| config.checkpoint_due(*b)).collect::<Vec<_>>();
        assert_eq!(due, vec![0, 10, 20]);
    }
}
