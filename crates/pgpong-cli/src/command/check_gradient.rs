use anyhow::ensure;
use ndarray::Array1;
use pgpong_policy::{
    gradient,
    gradient_check::{self, relative_error},
    network::PolicyParameters,
    preprocess::FeatureVector,
};
use rand::{Rng, SeedableRng as _};
use rand_distr::StandardNormal;
use rand_pcg::Pcg32;

const WEIGHT_STD: f64 = 0.1;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CheckGradientArg {
    /// Length of the random input vector
    #[arg(long, default_value_t = 100)]
    inputs: usize,
    /// Hidden units of the random network
    #[arg(long, default_value_t = 2)]
    hidden: usize,
    /// Finite-difference step
    #[arg(long, default_value_t = 1e-6)]
    eps: f64,
    /// Largest acceptable relative error
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,
    /// Seed for the random network and input
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &CheckGradientArg) -> anyhow::Result<()> {
    let CheckGradientArg {
        inputs,
        hidden,
        eps,
        tolerance,
        seed,
    } = arg;
    ensure!(*inputs > 0 && *hidden > 0, "inputs and hidden must be at least 1");
    ensure!(
        eps.is_finite() && *eps > 0.0,
        "eps must be positive, got {eps}"
    );

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);
    let GradientComparison {
        prob_up,
        w1_error,
        w2_error,
    } = compare_gradients(&mut rng, *hidden, *inputs, *eps);
    println!("P(UP) = {prob_up:.6} (seed {seed})");
    println!("W1 relative error: {w1_error:e}");
    println!("W2 relative error: {w2_error:e}");

    ensure!(
        w1_error <= *tolerance && w2_error <= *tolerance,
        "analytic gradient disagrees with finite differences (tolerance {tolerance:e})"
    );
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct GradientComparison {
    prob_up: f64,
    w1_error: f64,
    w2_error: f64,
}

fn random_state<R>(rng: &mut R, inputs: usize) -> FeatureVector
where
    R: Rng,
{
    Array1::from_shape_fn(inputs, |_| rng.sample(StandardNormal))
}

/// Draws a random network and state, then measures how far backprop is from finite differences.
fn compare_gradients<R>(rng: &mut R, hidden: usize, inputs: usize, eps: f64) -> GradientComparison
where
    R: Rng,
{
    let params = PolicyParameters::random(rng, hidden, inputs, WEIGHT_STD);
    let state = random_state(rng, inputs);

    let analytic = gradient::prob_up_gradient(&state, &params);
    let numerical = gradient_check::numerical_prob_up_gradient(&state, &params, eps);
    GradientComparison {
        prob_up: analytic.prob,
        w1_error: relative_error(&analytic.grads.w1, &numerical.w1),
        w2_error: relative_error(&analytic.grads.w2, &numerical.w2),
    }
}
