//! Credit assignment: turning sparse point outcomes into a per-step training signal.
//!
//! The game only rewards the step at which a point is decided (`+1` or `-1`); every other step
//! is `0`. Shaping gives each step the outcome of the point it belongs to:
//!
//! 1. **Normalize** - the nonzero rewards of the episode are shifted to zero mean and, when
//!    they have any spread, scaled to unit standard deviation
//! 2. **Propagate** - every step of a point receives the normalized value of the step that
//!    ended the point
//!
//! A point is the span after the previous scoring step up to and including the next one.
//! Steps after the last scoring step (an episode cut off by the length limit) belong to no
//! point and keep their raw value.
//!
//! ```text
//! raw:     0  0  +1  0  0  -1  0
//! shaped: +1 +1  +1 -1 -1  -1  0
//! ```

use pgpong_stats::descriptive::DescriptiveStats;

/// Indices of the steps that end a point (nonzero reward).
#[must_use]
pub fn scoring_steps(rewards: &[f64]) -> Vec<usize> {
    rewards
        .iter()
        .enumerate()
        .filter(|(_, r)| **r != 0.0)
        .map(|(t, _)| t)
        .collect()
}

/// Standardizes the nonzero rewards, leaving zero rewards untouched.
///
/// The mean is always subtracted. Division by the standard deviation is skipped when it is
/// not usable (fewer than two scoring steps, identical outcomes, or a non-finite value).
#[must_use]
pub fn normalize_rewards(rewards: &[f64]) -> Vec<f64> {
    let mut normalized = rewards.to_vec();
    let scoring = scoring_steps(rewards);
    let Some(stats) = DescriptiveStats::new(scoring.iter().map(|&t| rewards[t])) else {
        return normalized;
    };

    let scale = if stats.has_spread() {
        stats.std_dev
    } else {
        log::debug!(
            "reward normalization: {} scoring step(s) with std {}, skipping division",
            stats.count,
            stats.std_dev
        );
        1.0
    };
    for &t in &scoring {
        normalized[t] = (rewards[t] - stats.mean) / scale;
    }
    normalized
}

/// Backward-fills each point with the value at its scoring step.
///
/// `scoring` must be the ascending indices returned by [`scoring_steps`] for the raw rewards.
pub fn propagate_point_rewards(values: &mut [f64], scoring: &[usize]) {
    let mut start = 0;
    for &end in scoring {
        let outcome = values[end];
        values[start..=end].fill(outcome);
        start = end + 1;
    }
}

/// Normalizes and propagates raw per-step rewards.
///
/// # Example
///
/// ```
/// use pgpong_policy::reward::shape_rewards;
///
/// let shaped = shape_rewards(&[0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0]);
/// assert_eq!(shaped, vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 0.0]);
/// ```
#[must_use]
pub fn shape_rewards(rewards: &[f64]) -> Vec<f64> {
    let mut shaped = normalize_rewards(rewards);
    propagate_point_rewards(&mut shaped, &scoring_steps(rewards));
    shaped
}
