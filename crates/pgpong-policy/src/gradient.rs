//! Analytic gradients of the policy output.
//!
//! The network has one fixed architecture, so its backward pass is written out by hand
//! instead of going through an automatic-differentiation graph. Writing `p = P(UP)`:
//!
//! ```text
//! dp/dfc2   = p (1 - p)
//! dp/dW2    = dp/dfc2 · relu1ᵀ                      [1, H]
//! dp/drelu1 = dp/dfc2 · W2ᵀ                         [H]
//! dp/dfc1   = dp/drelu1 ⊙ 1[fc1 > 0]                [H]
//! dp/dW1    = dp/dfc1 ⊗ stateᵀ                      [H, D]
//! ```
//!
//! Row `i` of `W1` only feeds hidden unit `i`, so `dp/dW1` is the outer product of the
//! hidden-unit gradient and the input.
//!
//! # Score Function
//!
//! REINFORCE needs `∇ log π(a|s)` rather than `∇p`. For UP this is `∇p / p`; for DOWN,
//! `∇ log(1 - p) = -∇p / (1 - p)`. [`StepGradient::for_action`] applies the sign flip and the
//! complement, and [`Gradients::score`] divides by the chosen probability plus [`PROB_EPSILON`].

use ndarray::{Array2, Axis};
use pgpong_engine::Action;

use crate::{
    network::{self, PolicyParameters},
    preprocess::FeatureVector,
};

/// Added to the action probability before dividing by it.
pub const PROB_EPSILON: f64 = 1e-8;

/// A pair of matrices shaped like `W1` and `W2`.
///
/// Used for raw output gradients, log-probability gradients, per-episode and per-batch
/// accumulators, and optimizer velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub w1: Array2<f64>,
    pub w2: Array2<f64>,
}

impl Gradients {
    /// Zero matrices with the shapes of `params`.
    #[must_use]
    pub fn zeros_like(params: &PolicyParameters) -> Self {
        Self {
            w1: Array2::zeros(params.w1().raw_dim()),
            w2: Array2::zeros(params.w2().raw_dim()),
        }
    }

    /// `self += alpha · other`.
    pub fn add_scaled(&mut self, alpha: f64, other: &Gradients) {
        self.w1.scaled_add(alpha, &other.w1);
        self.w2.scaled_add(alpha, &other.w2);
    }

    /// `self *= alpha`.
    pub fn scale(&mut self, alpha: f64) {
        self.w1 *= alpha;
        self.w2 *= alpha;
    }

    /// Largest absolute entry across both matrices.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.w1
            .iter()
            .chain(&self.w2)
            .fold(0.0, |acc, v| f64::max(acc, v.abs()))
    }

    /// Converts an action-probability gradient into a log-probability gradient.
    #[must_use]
    pub fn score(mut self, prob: f64) -> Self {
        self.scale(1.0 / (prob + PROB_EPSILON));
        self
    }
}

/// Gradient of one probability with respect to all weights, for one state.
#[derive(Debug, Clone, PartialEq)]
pub struct StepGradient {
    pub grads: Gradients,
    /// The probability the gradient belongs to.
    pub prob: f64,
}

impl StepGradient {
    /// Re-targets a `P(UP)` gradient at the action that was actually taken.
    ///
    /// For [`Action::Down`] the gradient is negated and the probability becomes `1 - p`.
    #[must_use]
    pub fn for_action(mut self, action: Action) -> Self {
        match action {
            Action::Up => self,
            Action::Down => {
                self.grads.scale(-1.0);
                self.prob = 1.0 - self.prob;
                self
            }
        }
    }

    /// `∇ log π(a|s)` for the action this gradient was targeted at.
    #[must_use]
    pub fn into_log_prob(self) -> Gradients {
        self.grads.score(self.prob)
    }
}

/// Computes `∂P(UP)/∂W1`, `∂P(UP)/∂W2` and `P(UP)` by backpropagation.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use pgpong_policy::{gradient::prob_up_gradient, network::PolicyParameters};
///
/// let params = PolicyParameters::from_matrices(array![[1.0, 0.0]], array![[0.0]]).unwrap();
/// let step = prob_up_gradient(&array![2.0, 3.0], &params);
/// assert_eq!(step.prob, 0.5);
/// // dp/dW2 = p(1 - p) · relu1 = 0.25 · 2
/// assert_eq!(step.grads.w2, array![[0.5]]);
/// ```
#[must_use]
pub fn prob_up_gradient(state: &FeatureVector, params: &PolicyParameters) -> StepGradient {
    let act = network::evaluate(state, params);
    let p = act.prob_up;

    let dp_dfc2 = p * (1.0 - p);
    let dp_dw2 = (&act.relu1 * dp_dfc2).insert_axis(Axis(0));

    let dp_drelu1 = params.w2().row(0).to_owned() * dp_dfc2;
    let relu_mask = act.fc1.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
    let dp_dfc1 = dp_drelu1 * relu_mask;

    let dp_dw1 = dp_dfc1
        .insert_axis(Axis(1))
        .dot(&state.view().insert_axis(Axis(0)));

    StepGradient {
        grads: Gradients {
            w1: dp_dw1,
            w2: dp_dw2,
        },
        prob: p,
    }
}

/// `∇ log π(action | state)` with the score-function epsilon applied.
#[must_use]
pub fn log_prob_gradient(
    state: &FeatureVector,
    params: &PolicyParameters,
    action: Action,
) -> Gradients {
    prob_up_gradient(state, params)
        .for_action(action)
        .into_log_prob()
}
