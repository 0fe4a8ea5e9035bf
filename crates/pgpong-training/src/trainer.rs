//! The REINFORCE training loop.
//!
//! A [`Trainer`] owns everything that changes during a run: the policy parameters, the
//! optimizer state, the batch counter and the outcome history. Each call to
//! [`Trainer::train_batch`]:
//!
//! 1. Plays `batch_size` episodes sequentially with the current parameters
//! 2. Estimates the policy gradient of every episode against that same parameter snapshot
//! 3. Sums the estimates and applies one momentum update
//!
//! The environment is borrowed for the duration of the batch; its errors abort the batch and
//! are returned unchanged.

use pgpong_engine::Environment;
use pgpong_policy::{
    network::{self, PolicyParameters},
    preprocess::PreprocessConfig,
    trajectory::{self, EpisodeScore, Trajectory},
};
use pgpong_stats::descriptive::DescriptiveStats;
use rand::Rng;

use crate::{
    checkpoint::{BatchOutcome, CheckpointSink},
    config::{ConfigError, TrainingConfig},
    optimizer::MomentumOptimizer,
};

/// Score and length of one sampled episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeReport {
    pub score: EpisodeScore,
    pub length: usize,
}

/// Summary of one training batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Zero-based batch index.
    pub batch: usize,
    pub episodes: Vec<EpisodeReport>,
    pub outcome: BatchOutcome,
    pub mean_length: f64,
    /// Step size used by this batch's update.
    pub step_size: f64,
    /// Largest absolute entry of the summed gradient.
    pub gradient_max_abs: f64,
}

/// Plays one episode with `params` and records it.
///
/// The episode ends when the environment reports `done` or after `max_length` steps,
/// whichever comes first. With `render` set, the environment is rendered before every step.
pub fn run_episode<E, R>(
    env: &mut E,
    params: &PolicyParameters,
    preprocess: &PreprocessConfig,
    max_length: usize,
    rng: &mut R,
    render: bool,
) -> Result<Trajectory, E::Error>
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let mut trajectory = Trajectory::with_capacity(max_length.min(4096));
    let mut observation = env.reset()?;
    let mut previous = None;

    for _ in 0..max_length {
        if render {
            env.render();
        }
        let state = preprocess.encode(&observation, previous.as_ref());
        let prob_up = network::evaluate(&state, params).prob_up;
        let action = network::sample_action(prob_up, rng);

        let outcome = env.step(action)?;
        trajectory.push(state, action, outcome.reward);
        previous = Some(observation);
        observation = outcome.observation;
        if outcome.done {
            break;
        }
    }
    Ok(trajectory)
}

/// Owned state of a training run.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    preprocess: PreprocessConfig,
    params: PolicyParameters,
    optimizer: MomentumOptimizer,
    batches_completed: usize,
    history: Vec<BatchOutcome>,
}

impl Trainer {
    /// Starts a run from randomly initialized weights for `inputs`-dimensional features.
    pub fn new<R>(
        config: TrainingConfig,
        preprocess: PreprocessConfig,
        inputs: usize,
        rng: &mut R,
    ) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;
        let params = PolicyParameters::random(rng, config.num_hidden, inputs, config.initial_std);
        Self::resume(config, preprocess, params, 0, vec![])
    }

    /// Continues a run from saved weights after `batches_completed` batches.
    ///
    /// The hidden size of `params` takes precedence over `config.num_hidden`. Velocity restarts
    /// at zero; the step-size schedule continues where it left off.
    pub fn resume(
        mut config: TrainingConfig,
        preprocess: PreprocessConfig,
        params: PolicyParameters,
        batches_completed: usize,
        history: Vec<BatchOutcome>,
    ) -> Result<Self, ConfigError> {
        config.num_hidden = params.hidden();
        config.validate()?;
        let optimizer = MomentumOptimizer::new(
            &params,
            config.momentum,
            config.initial_step_size,
            config.halving_period,
        )
        .resumed_at(batches_completed);
        Ok(Self {
            config,
            preprocess,
            params,
            optimizer,
            batches_completed,
            history,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn params(&self) -> &PolicyParameters {
        &self.params
    }

    #[must_use]
    pub fn optimizer(&self) -> &MomentumOptimizer {
        &self.optimizer
    }

    #[must_use]
    pub fn batches_completed(&self) -> usize {
        self.batches_completed
    }

    /// Per-batch outcomes, oldest first.
    #[must_use]
    pub fn history(&self) -> &[BatchOutcome] {
        &self.history
    }

    /// Samples one batch of episodes and applies one parameter update.
    ///
    /// With `render_first` set, the first episode of the batch is rendered.
    pub fn train_batch<E, R>(
        &mut self,
        env: &mut E,
        rng: &mut R,
        render_first: bool,
    ) -> Result<BatchReport, E::Error>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
    {
        let batch = self.batches_completed;
        let mut trajectories = Vec::with_capacity(self.config.batch_size);
        for i in 0..self.config.batch_size {
            let trajectory = run_episode(
                env,
                &self.params,
                &self.preprocess,
                self.config.max_episode_length,
                rng,
                render_first && i == 0,
            )?;
            let score = trajectory.score();
            log::debug!(
                "episode {batch}.{i}: {} steps, lost {} - won {}",
                trajectory.len(),
                score.lost,
                score.won
            );
            trajectories.push(trajectory);
        }

        let episodes = trajectories
            .iter()
            .map(|t| EpisodeReport {
                score: t.score(),
                length: t.len(),
            })
            .collect::<Vec<_>>();
        let outcome = mean_outcome(&episodes);

        let gradient = trajectory::batch_policy_gradient(&trajectories, &self.params);
        self.optimizer.apply(&mut self.params, &gradient);
        self.batches_completed += 1;
        self.history.push(outcome);

        let report = BatchReport {
            batch,
            mean_length: mean(episodes.iter().map(|e| e.length)),
            episodes,
            outcome,
            step_size: self.optimizer.step_size(),
            gradient_max_abs: gradient.max_abs(),
        };
        log::info!(
            "batch {batch}: mean length {:.1}, mean score {:.2} - {:.2}, |g|max {:e}",
            report.mean_length,
            outcome.losses,
            outcome.wins,
            report.gradient_max_abs
        );
        Ok(report)
    }

    /// Hands the current weights and history to `sink`, labelled with the last finished batch.
    pub fn save_checkpoint<S>(&self, sink: &mut S) -> Result<(), S::Error>
    where
        S: CheckpointSink + ?Sized,
    {
        let batch = self.batches_completed.saturating_sub(1);
        sink.save(batch, &self.params, &self.history)
    }
}

#[expect(clippy::cast_precision_loss)]
fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = usize>,
{
    DescriptiveStats::new(values.into_iter().map(|v| v as f64)).map_or(0.0, |s| s.mean)
}

fn mean_outcome(episodes: &[EpisodeReport]) -> BatchOutcome {
    BatchOutcome {
        losses: mean(episodes.iter().map(|e| e.score.lost)),
        wins: mean(episodes.iter().map(|e| e.score.won)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use pgpong_engine::{Action, Frame, StepInfo, StepOutcome};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[derive(Debug, derive_more::Display, derive_more::Error)]
    #[display("scripted environment ran out of steps")]
    struct ScriptExhausted;

    /// Replays a fixed reward script. Frames encode the step number so consecutive states differ.
    struct ScriptedEnv {
        script: Vec<f64>,
        remaining: VecDeque<f64>,
        frame_number: u8,
        resets: usize,
        renders: usize,
        actions: Vec<Action>,
    }

    impl ScriptedEnv {
        fn new(script: &[f64]) -> Self {
            Self {
                script: script.to_vec(),
                remaining: VecDeque::new(),
                frame_number: 0,
                resets: 0,
                renders: 0,
                actions: vec![],
            }
        }

        fn frame(&self) -> Frame {
            let mut frame = Frame::filled(6, 4, [0, 0, 0]);
            let col = usize::from(self.frame_number % 2) * 2;
            frame.set_pixel(1 + usize::from(self.frame_number % 3) % 2 * 2, col, [90, 90, 90]);
            frame
        }
    }

    impl Environment for ScriptedEnv {
        type Error = ScriptExhausted;

        fn reset(&mut self) -> Result<Frame, Self::Error> {
            self.remaining = self.script.iter().copied().collect();
            self.frame_number = 0;
            self.resets += 1;
            Ok(self.frame())
        }

        fn step(&mut self, action: Action) -> Result<StepOutcome, Self::Error> {
            let reward = self.remaining.pop_front().ok_or(ScriptExhausted)?;
            self.actions.push(action);
            self.frame_number = self.frame_number.wrapping_add(1);
            Ok(StepOutcome {
                observation: self.frame(),
                reward,
                done: self.remaining.is_empty(),
                info: StepInfo::default(),
            })
        }

        fn render(&mut self) {
            self.renders += 1;
        }
    }

    /// Never reports `done`.
    struct EndlessEnv;

    impl Environment for EndlessEnv {
        type Error = ScriptExhausted;

        fn reset(&mut self) -> Result<Frame, Self::Error> {
            Ok(Frame::filled(6, 4, [0, 0, 0]))
        }

        fn step(&mut self, _action: Action) -> Result<StepOutcome, Self::Error> {
            Ok(StepOutcome {
                observation: Frame::filled(6, 4, [0, 0, 0]),
                reward: 0.0,
                done: false,
                info: StepInfo::default(),
            })
        }
    }

    fn small_preprocess() -> PreprocessConfig {
        PreprocessConfig {
            crop_top: 1,
            crop_bottom: 1,
            stride: 2,
        }
    }

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            num_hidden: 3,
            initial_std: 0.5,
            batch_size: 2,
            max_episode_length: 50,
            initial_step_size: 0.1,
            ..TrainingConfig::default()
        }
    }

    #[derive(Default)]
    struct MemorySink {
        saved: Vec<(usize, PolicyParameters, Vec<BatchOutcome>)>,
    }

    impl CheckpointSink for MemorySink {
        type Error = std::convert::Infallible;

        fn save(
            &mut self,
            batch: usize,
            params: &PolicyParameters,
            history: &[BatchOutcome],
        ) -> Result<(), Self::Error> {
            self.saved.push((batch, params.clone(), history.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_episode_records_script_until_done() {
        let script = [0.0, 0.0, 1.0, 0.0, -1.0];
        let mut env = ScriptedEnv::new(&script);
        let mut rng = Pcg32::seed_from_u64(1);
        let params = PolicyParameters::random(&mut rng, 3, 4, 0.5);

        let trajectory =
            run_episode(&mut env, &params, &small_preprocess(), 100, &mut rng, false).unwrap();
        assert_eq!(trajectory.rewards(), script.to_vec());
        assert_eq!(env.resets, 1);
        assert!(trajectory.steps()[0].state.iter().all(|v| *v == 0.0));
        assert!(trajectory.steps()[1].state.iter().any(|v| *v != 0.0));
        let recorded = trajectory.steps().iter().map(|s| s.action).collect::<Vec<_>>();
        assert_eq!(recorded, env.actions);
    }

    #[test]
    fn test_episode_length_is_capped() {
        let mut rng = Pcg32::seed_from_u64(2);
        let params = PolicyParameters::zeros(2, 4);
        let trajectory =
            run_episode(&mut EndlessEnv, &params, &small_preprocess(), 17, &mut rng, false)
                .unwrap();
        assert_eq!(trajectory.len(), 17);
    }

    #[test]
    fn test_environment_errors_are_fatal() {
        let mut env = ScriptedEnv::new(&[]);
        let mut rng = Pcg32::seed_from_u64(3);
        let params = PolicyParameters::zeros(2, 4);
        let result = run_episode(&mut env, &params, &small_preprocess(), 10, &mut rng, false);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_only_first_episode() {
        let mut env = ScriptedEnv::new(&[0.0, 1.0, 0.0]);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut trainer = Trainer::new(small_config(), small_preprocess(), 4, &mut rng).unwrap();
        trainer.train_batch(&mut env, &mut rng, true).unwrap();
        assert_eq!(env.resets, 2);
        assert_eq!(env.renders, 3);
    }

    #[test]
    fn test_batch_updates_state() {
        let mut env = ScriptedEnv::new(&[0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 1.0]);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut trainer = Trainer::new(small_config(), small_preprocess(), 4, &mut rng).unwrap();
        let before = trainer.params().clone();

        let report = trainer.train_batch(&mut env, &mut rng, false).unwrap();
        assert_eq!(report.batch, 0);
        assert_eq!(report.episodes.len(), 2);
        assert_eq!(report.mean_length, 7.0);
        assert_eq!(report.outcome, BatchOutcome { losses: 1.0, wins: 2.0 });
        assert_eq!(trainer.batches_completed(), 1);
        assert_eq!(trainer.history(), &[report.outcome]);
        assert_eq!(trainer.optimizer().iteration(), 1);
        assert!(report.gradient_max_abs > 0.0);
        assert_ne!(trainer.params(), &before);

        let report = trainer.train_batch(&mut env, &mut rng, false).unwrap();
        assert_eq!(report.batch, 1);
        assert_eq!(trainer.history().len(), 2);
    }

    #[test]
    fn test_rewardless_batch_keeps_parameters() {
        let mut env = ScriptedEnv::new(&[0.0; 5]);
        let mut rng = Pcg32::seed_from_u64(6);
        let mut trainer = Trainer::new(small_config(), small_preprocess(), 4, &mut rng).unwrap();
        let before = trainer.params().clone();
        let report = trainer.train_batch(&mut env, &mut rng, false).unwrap();
        assert_eq!(report.gradient_max_abs, 0.0);
        assert_eq!(trainer.params(), &before);
    }

    #[test]
    fn test_checkpoint_receives_history() {
        let mut env = ScriptedEnv::new(&[1.0]);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut trainer = Trainer::new(small_config(), small_preprocess(), 4, &mut rng).unwrap();
        trainer.train_batch(&mut env, &mut rng, false).unwrap();
        trainer.train_batch(&mut env, &mut rng, false).unwrap();

        let mut sink = MemorySink::default();
        trainer.save_checkpoint(&mut sink).unwrap();
        let (batch, params, history) = &sink.saved[0];
        assert_eq!(*batch, 1);
        assert_eq!(params, trainer.params());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_resume_keeps_schedule_and_hidden_size() {
        let params = PolicyParameters::zeros(7, 4);
        let trainer = Trainer::resume(
            TrainingConfig::default(),
            small_preprocess(),
            params,
            100,
            vec![],
        )
        .unwrap();
        assert_eq!(trainer.config().num_hidden, 7);
        assert_eq!(trainer.batches_completed(), 100);
        assert_eq!(trainer.optimizer().step_size(), 1e-3 / 4.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut rng = Pcg32::seed_from_u64(8);
        let config = TrainingConfig {
            batch_size: 0,
            ..small_config()
        };
        assert!(Trainer::new(config, small_preprocess(), 4, &mut rng).is_err());
    }
}
