use clap::{Parser, Subcommand};

use self::{check_gradient::CheckGradientArg, play::PlayArg, train::TrainArg};

mod check_gradient;
mod play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a policy with REINFORCE
    Train(#[clap(flatten)] TrainArg),
    /// Play episodes with a trained policy
    Play(#[clap(flatten)] PlayArg),
    /// Compare the analytic gradient with finite differences
    CheckGradient(#[clap(flatten)] CheckGradientArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::CheckGradient(arg) => check_gradient::run(&arg)?,
    }
    Ok(())
}
