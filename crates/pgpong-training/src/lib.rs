//! REINFORCE training of the paddle-game policy.
//!
//! This crate owns the mutable side of training: parameters, momentum velocity, step-size
//! schedule and per-batch history. The numerical pieces it drives live in `pgpong-policy`.
//!
//! # How Training Works
//!
//! 1. **Sample** - Play a batch of episodes against an [`Environment`](pgpong_engine::Environment)
//!    with the current stochastic policy
//! 2. **Shape** - Spread every point's outcome over the steps of that point and normalize
//! 3. **Estimate** - Per episode, average `shaped_reward · ∇ log π(action | state)` over steps
//! 4. **Update** - Sum the batch's estimates and take one momentum ascent step
//! 5. **Repeat** - Halving the step size every `halving_period` updates
//!
//! # Architecture
//!
//! ```text
//! Trainer (owns parameters, optimizer, history)
//!     ↓ plays
//! Environment (pgpong-engine)
//!     ↓ records
//! Trajectory → policy gradient (pgpong-policy)
//!     ↓ consumed by
//! MomentumOptimizer
//!     ↓ snapshots via
//! CheckpointSink
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pgpong_engine::{PongConfig, PongEnvironment};
//! use pgpong_policy::preprocess::PreprocessConfig;
//! use pgpong_training::{config::TrainingConfig, trainer::Trainer};
//!
//! let mut rng = rand::rng();
//! let mut env = PongEnvironment::new(PongConfig::default());
//! let preprocess = PreprocessConfig::default();
//! let inputs = preprocess.feature_len(210, 160);
//! let mut trainer = Trainer::new(TrainingConfig::default(), preprocess, inputs, &mut rng).unwrap();
//!
//! for _ in 0..100 {
//!     let report = trainer.train_batch(&mut env, &mut rng, false).unwrap();
//!     println!("{}: {:?}", report.batch, report.outcome);
//! }
//! ```
//!
//! # Current Limitations
//!
//! - **Sequential sampling**: episodes of a batch run one after another on one environment.
//! - **No baseline**: variance is only controlled by reward normalization, not by a learned
//!   value function.
//! - **Velocity is not checkpointed**: a resumed run restarts momentum from zero.

pub mod checkpoint;
pub mod config;
pub mod optimizer;
pub mod trainer;
