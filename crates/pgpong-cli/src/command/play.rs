use std::path::PathBuf;

use anyhow::{Context as _, bail};
use pgpong_engine::{FRAME_HEIGHT, FRAME_WIDTH, PongConfig, PongEnvironment};
use pgpong_policy::preprocess::PreprocessConfig;
use pgpong_stats::descriptive::DescriptiveStats;
use pgpong_training::trainer;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Weights file written by `train`
    #[arg(long)]
    weights: PathBuf,
    /// Number of episodes to play
    #[arg(long, default_value_t = 10)]
    episodes: usize,
    /// Maximum steps per episode
    #[arg(long, default_value_t = 2000)]
    max_episode_length: usize,
    /// Render every step to stderr
    #[arg(long)]
    render: bool,
    /// Seed for the game and the action sampler
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        weights,
        episodes,
        max_episode_length,
        render,
        seed,
    } = arg;

    let file = util::read_weights_file(weights)?;
    let preprocess = PreprocessConfig::default();
    let inputs = preprocess.feature_len(FRAME_HEIGHT, FRAME_WIDTH);
    if file.params.inputs() != inputs {
        bail!(
            "{} holds weights for {} inputs, but frames produce {inputs} features",
            weights.display(),
            file.params.inputs()
        );
    }
    log::info!(
        "loaded {} hidden units from batch {} ({})",
        file.params.hidden(),
        file.batch,
        file.trained_at
    );

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut env = PongEnvironment::with_seed(PongConfig::default(), seed);
    let mut rng = Pcg32::seed_from_u64(seed.wrapping_add(1));

    let mut totals = Vec::with_capacity(*episodes);
    for _ in 0..*episodes {
        let trajectory = trainer::run_episode(
            &mut env,
            &file.params,
            &preprocess,
            *max_episode_length,
            &mut rng,
            *render,
        )
        .context("Game environment failed")?;
        let total = trajectory.total_reward();
        println!("Reward for episode: {total}");
        totals.push(total);
    }

    if let Some(stats) = DescriptiveStats::new(totals) {
        eprintln!(
            "Average reward over {} episodes: {:.2} (min {}, max {})",
            stats.count, stats.mean, stats.min, stats.max
        );
    }
    Ok(())
}
