//! Two-layer stochastic policy for the paddle game, with hand-derived gradients.
//!
//! This crate is the numerical core of REINFORCE training. Everything in it is a pure function
//! of its inputs: no hidden state, no globals, and randomness only where an RNG is passed in.
//!
//! # Pipeline
//!
//! ```text
//! Frame pair ──preprocess──▶ FeatureVector ──network──▶ P(UP) ──sample──▶ Action
//!                                                                   │
//!                     Trajectory (state, action, reward) ◀──────────┘
//!                                   │
//!               reward shaping ─────┤
//!                                   ▼
//!                 Σ shaped_reward · ∇ log π   (gradient, per step)
//!                                   ▼
//!                      per-episode policy gradient
//! ```
//!
//! # Modules
//!
//! - [`preprocess`] - Motion-difference encoding of raw frames
//! - [`network`] - [`PolicyParameters`](network::PolicyParameters), forward pass, action sampling
//! - [`gradient`] - Analytic `∂P(UP)/∂W` and the score-function conversion
//! - [`gradient_check`] - Central finite differences for verifying [`gradient`]
//! - [`reward`] - Normalization and point-wise propagation of sparse rewards
//! - [`trajectory`] - Episode records and the per-episode / per-batch gradient estimates
//!
//! # Example
//!
//! ```
//! use pgpong_engine::Action;
//! use pgpong_policy::{network::PolicyParameters, preprocess::FeatureVector, trajectory::Trajectory};
//!
//! let params = PolicyParameters::zeros(4, 3);
//! let mut trajectory = Trajectory::new();
//! trajectory.push(FeatureVector::from_vec(vec![1.0, 0.0, -1.0]), Action::Up, 1.0);
//! trajectory.push(FeatureVector::from_vec(vec![0.0, 2.0, 0.0]), Action::Down, -1.0);
//!
//! let grads = trajectory.policy_gradient(&params);
//! assert_eq!(grads.w1.dim(), (4, 3));
//! assert_eq!(grads.w2.dim(), (1, 4));
//! ```
//!
//! # Current Limitations
//!
//! - **Fixed architecture**: exactly one hidden `ReLU` layer and one sigmoid output, no biases.
//!   Changing the topology means re-deriving [`gradient::prob_up_gradient`].
//! - **Two actions**: the output is a single Bernoulli probability.

pub mod gradient;
pub mod gradient_check;
pub mod network;
pub mod preprocess;
pub mod reward;
pub mod trajectory;
