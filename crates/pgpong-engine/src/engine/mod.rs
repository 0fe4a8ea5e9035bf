//! Episodic game environments.
//!
//! - [`Environment`] - The capability interface consumed by training (`reset`, `step`, `render`)
//! - [`StepOutcome`] / [`StepInfo`] - What a single step reports back
//! - [`PongEnvironment`] - A deterministic, seedable paddle game rendering Atari-sized frames
//!
//! # Episode Flow
//!
//! 1. [`Environment::reset`] returns the first frame
//! 2. [`Environment::step`] applies an [`Action`](crate::Action) and returns the next frame,
//!    the reward and the termination flag
//! 3. Repeat until `done`, then reset again

pub use self::{environment::*, pong::*};

mod environment;
mod pong;
