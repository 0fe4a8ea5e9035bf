//! Momentum gradient ascent with a step-size halving schedule.
//!
//! Each update `i` (zero-based) does:
//!
//! ```text
//! if i % halving_period == halving_period - 1 { step_size /= 2 }
//! V = γ·V + step_size·g
//! W = W + V
//! ```
//!
//! The rule ascends: `g` is the gradient of the expected reward, not of a loss.

use pgpong_policy::{gradient::Gradients, network::PolicyParameters};

/// Velocity and step-size state carried across updates.
#[derive(Debug, Clone)]
pub struct MomentumOptimizer {
    momentum: f64,
    step_size: f64,
    halving_period: usize,
    iteration: usize,
    velocity: Gradients,
}

impl MomentumOptimizer {
    /// Creates an optimizer with zero velocity shaped like `params`.
    ///
    /// # Panics
    ///
    /// Panics if `halving_period` is zero.
    #[must_use]
    pub fn new(
        params: &PolicyParameters,
        momentum: f64,
        step_size: f64,
        halving_period: usize,
    ) -> Self {
        assert!(halving_period > 0, "halving period must be positive");
        Self {
            momentum,
            step_size,
            halving_period,
            iteration: 0,
            velocity: Gradients::zeros_like(params),
        }
    }

    /// Fast-forwards the schedule as if `iteration` updates had already been applied.
    ///
    /// Velocity is not part of a checkpoint, so it stays zero.
    #[must_use]
    pub fn resumed_at(mut self, iteration: usize) -> Self {
        let halvings = iteration / self.halving_period;
        for _ in 0..halvings {
            self.step_size /= 2.0;
        }
        self.iteration = iteration;
        self
    }

    /// Step size the next update will use before any halving it triggers.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Updates applied so far.
    #[must_use]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    #[must_use]
    pub fn velocity(&self) -> &Gradients {
        &self.velocity
    }

    /// Applies one ascent step to `params` along `gradient`.
    pub fn apply(&mut self, params: &mut PolicyParameters, gradient: &Gradients) {
        if self.iteration % self.halving_period == self.halving_period - 1 {
            self.step_size /= 2.0;
            log::info!(
                "update {}: step size halved to {:e}",
                self.iteration,
                self.step_size
            );
        }
        self.velocity.scale(self.momentum);
        self.velocity.add_scaled(self.step_size, gradient);
        params.apply_delta(&self.velocity);
        self.iteration += 1;
    }
}
