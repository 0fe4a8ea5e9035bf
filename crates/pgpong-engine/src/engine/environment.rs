use crate::core::{Action, Frame};

/// Side information returned with every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// Points scored by the agent in the current episode.
    pub agent_score: u32,
    /// Points scored by the opponent in the current episode.
    pub opponent_score: u32,
    /// Steps taken since the last reset.
    pub frame_number: u64,
}

/// Result of applying one action.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Frame rendered after the action was applied.
    pub observation: Frame,
    /// `+1.0` when the agent scores, `-1.0` when the opponent scores, `0.0` otherwise.
    pub reward: f64,
    /// `true` once the episode is over; the environment must be reset before stepping again.
    pub done: bool,
    pub info: StepInfo,
}

/// Capability interface of an episodic, frame-rendering game.
///
/// Training code holds an environment exclusively and drives it synchronously: one
/// [`reset`](Environment::reset) per episode followed by [`step`](Environment::step) calls until
/// `done` or the episode length cap. Errors are fatal to the training loop.
pub trait Environment {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Begins a new episode and returns its first frame.
    fn reset(&mut self) -> Result<Frame, Self::Error>;

    /// Applies `action` and advances the game by one step.
    fn step(&mut self, action: Action) -> Result<StepOutcome, Self::Error>;

    /// Shows the current state to a human. Does nothing by default.
    fn render(&mut self) {}
}

impl<E> Environment for &mut E
where
    E: Environment + ?Sized,
{
    type Error = E::Error;

    fn reset(&mut self) -> Result<Frame, Self::Error> {
        (**self).reset()
    }

    fn step(&mut self, action: Action) -> Result<StepOutcome, Self::Error> {
        (**self).step(action)
    }

    fn render(&mut self) {
        (**self).render();
    }
}
