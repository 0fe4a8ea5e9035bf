//! Paddle game environment for policy-gradient training.
//!
//! - [`core`] - Raw RGB [`Frame`]s and the two-valued [`Action`] space
//! - [`engine`] - The [`Environment`] capability trait and the bundled [`PongEnvironment`]
//!
//! Training code only talks to [`Environment`], so any simulator (or a scripted fake in tests)
//! can be plugged in.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("frame buffer has {actual} bytes, expected {expected} for {height}x{width} RGB")]
pub struct FrameSizeError {
    pub height: usize,
    pub width: usize,
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("episode already finished; call reset before stepping again")]
pub struct EpisodeFinishedError;
