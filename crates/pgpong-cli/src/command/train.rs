use std::path::PathBuf;

use anyhow::{Context as _, bail};
use chrono::Utc;
use pgpong_engine::{FRAME_HEIGHT, FRAME_WIDTH, PongConfig, PongEnvironment};
use pgpong_policy::preprocess::PreprocessConfig;
use pgpong_training::{
    config::TrainingConfig,
    trainer::{BatchReport, Trainer},
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    schema::checkpoint::WeightsFile,
    util::{self, JsonCheckpointDir},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of batches to train for
    #[arg(long, default_value_t = 1000)]
    batches: usize,
    /// Hidden units of a freshly initialized network
    #[arg(long, default_value_t = 10)]
    num_hidden: usize,
    /// Standard deviation of the initial weights
    #[arg(long, default_value_t = 1e-3)]
    initial_std: f64,
    /// Episodes per parameter update
    #[arg(long, default_value_t = 10)]
    batch_size: usize,
    /// Maximum steps per episode
    #[arg(long, default_value_t = 2000)]
    max_episode_length: usize,
    /// Step size of the first update
    #[arg(long, default_value_t = 1e-3)]
    step_size: f64,
    /// Velocity decay of the momentum optimizer
    #[arg(long, default_value_t = 0.5)]
    momentum: f64,
    /// Halve the step size every this many updates
    #[arg(long, default_value_t = 50)]
    halving_period: usize,
    /// Seed for the game and the action sampler
    #[arg(long)]
    seed: Option<u64>,
    /// Directory to write weight checkpoints and the score history to
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,
    /// Write a checkpoint every this many batches
    #[arg(long, default_value_t = 10)]
    checkpoint_interval: usize,
    /// Render the first episode of every batch
    #[arg(long)]
    render: bool,
    /// Continue training from a weights file
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Output file path for the final weights
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        batches,
        num_hidden,
        initial_std,
        batch_size,
        max_episode_length,
        step_size,
        momentum,
        halving_period,
        seed,
        checkpoint_dir,
        checkpoint_interval,
        render,
        resume,
        output,
    } = arg;

    let config = TrainingConfig {
        num_hidden: *num_hidden,
        initial_std: *initial_std,
        batch_size: *batch_size,
        max_episode_length: *max_episode_length,
        initial_step_size: *step_size,
        momentum: *momentum,
        halving_period: *halving_period,
        checkpoint_interval: *checkpoint_interval,
    };
    let preprocess = PreprocessConfig::default();
    let inputs = preprocess.feature_len(FRAME_HEIGHT, FRAME_WIDTH);

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Seed: {seed}");
    let mut env = PongEnvironment::with_seed(PongConfig::default(), seed);
    let mut rng = Pcg32::seed_from_u64(seed.wrapping_add(1));

    let mut trainer = match resume {
        Some(path) => {
            let weights = util::read_weights_file(path)?;
            if weights.params.inputs() != inputs {
                bail!(
                    "{} holds weights for {} inputs, but frames produce {inputs} features",
                    path.display(),
                    weights.params.inputs()
                );
            }
            let batches_completed = weights.batch + 1;
            let history = match checkpoint_dir {
                Some(dir) if dir.join("history.json").exists() => {
                    let mut history = util::read_history_file(&dir.join("history.json"))?.batches;
                    history.truncate(batches_completed);
                    history
                }
                _ => vec![],
            };
            eprintln!(
                "Resuming from {} (trained at {}, {batches_completed} batches)",
                path.display(),
                weights.trained_at
            );
            Trainer::resume(config, preprocess, weights.params, batches_completed, history)
                .context("Invalid training configuration")?
        }
        None => Trainer::new(config, preprocess, inputs, &mut rng)
            .context("Invalid training configuration")?,
    };

    let mut sink = checkpoint_dir
        .clone()
        .map(JsonCheckpointDir::create)
        .transpose()?;

    for _ in 0..*batches {
        let report = trainer
            .train_batch(&mut env, &mut rng, *render)
            .context("Game environment failed")?;
        print_report(&report);

        if let Some(sink) = &mut sink
            && trainer.config().checkpoint_due(report.batch)
        {
            trainer.save_checkpoint(sink)?;
        }
    }

    let weights = WeightsFile {
        trained_at: Utc::now(),
        batch: trainer.batches_completed().saturating_sub(1),
        params: trainer.params().clone(),
    };
    util::save_json(&weights, output.as_deref())?;
    Ok(())
}

fn print_report(report: &BatchReport) {
    for (i, episode) in report.episodes.iter().enumerate() {
        eprintln!(
            "Episode {}.{i}   AI: {} - {} : RL   ({} steps)",
            report.batch, episode.score.lost, episode.score.won, episode.length
        );
    }
    eprintln!(
        "Batch {}: average length {:.1}, average score AI: {:.2} - {:.2} : RL, step size {:e}",
        report.batch,
        report.mean_length,
        report.outcome.losses,
        report.outcome.wins,
        report.step_size
    );
}
