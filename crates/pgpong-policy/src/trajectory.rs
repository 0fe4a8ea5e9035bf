//! Episode trajectories and the per-episode policy-gradient estimate.
//!
//! A [`Trajectory`] records `(state, action, reward)` for every step of one episode. Once the
//! episode ends, [`Trajectory::policy_gradient`] turns it into a Monte-Carlo estimate of the
//! gradient of the expected return:
//!
//! ```text
//! g = 1/T · Σ_t  shaped_reward[t] · ∇ log π(action[t] | state[t])
//! ```
//!
//! where the shaped rewards come from [`reward::shape_rewards`](crate::reward::shape_rewards).
//! Estimates of a batch are summed by [`batch_policy_gradient`].

use pgpong_engine::Action;

use crate::{
    gradient::{self, Gradients},
    network::PolicyParameters,
    preprocess::FeatureVector,
    reward,
};

/// One recorded step of an episode.
#[derive(Debug, Clone)]
pub struct Step {
    pub state: FeatureVector,
    pub action: Action,
    pub reward: f64,
}

/// Wins and losses of one episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeScore {
    /// Points the opponent scored.
    pub lost: usize,
    /// Points the agent scored.
    pub won: usize,
}

/// Ordered steps of one episode.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    steps: Vec<Step>,
}

impl Trajectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            steps: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, state: FeatureVector, action: Action, reward: f64) {
        self.steps.push(Step {
            state,
            action,
            reward,
        });
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Raw per-step rewards.
    #[must_use]
    pub fn rewards(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.reward).collect()
    }

    /// Sum of the raw rewards (agent points minus opponent points).
    #[must_use]
    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|s| s.reward).sum()
    }

    #[must_use]
    pub fn score(&self) -> EpisodeScore {
        self.steps
            .iter()
            .fold(EpisodeScore::default(), |mut score, step| {
                if step.reward > 0.0 {
                    score.won += 1;
                } else if step.reward < 0.0 {
                    score.lost += 1;
                }
                score
            })
    }

    /// Estimates the policy gradient of this episode under `params`.
    ///
    /// `params` must be the parameters that produced the trajectory. An empty trajectory
    /// yields zero gradients.
    #[must_use]
    pub fn policy_gradient(&self, params: &PolicyParameters) -> Gradients {
        let mut sum = Gradients::zeros_like(params);
        if self.steps.is_empty() {
            return sum;
        }

        let shaped = reward::shape_rewards(&self.rewards());
        for (step, shaped_reward) in self.steps.iter().zip(shaped) {
            if shaped_reward == 0.0 {
                continue;
            }
            let log_grad = gradient::log_prob_gradient(&step.state, params, step.action);
            sum.add_scaled(shaped_reward, &log_grad);
        }

        #[expect(clippy::cast_precision_loss)]
        let len = self.steps.len() as f64;
        sum.scale(1.0 / len);
        sum
    }
}

/// Sums the per-episode gradient estimates of a batch.
#[must_use]
pub fn batch_policy_gradient<'a, I>(trajectories: I, params: &PolicyParameters) -> Gradients
where
    I: IntoIterator<Item = &'a Trajectory>,
{
    trajectories
        .into_iter()
        .fold(Gradients::zeros_like(params), |mut acc, trajectory| {
            acc.add_scaled(1.0, &trajectory.policy_gradient(params));
            acc
        })
}
