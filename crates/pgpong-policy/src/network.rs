//! The two-layer policy network.
//!
//! ```text
//! state [D] ──W1 [H×D]──▶ fc1 [H] ──ReLU──▶ relu1 [H] ──W2 [1×H]──▶ fc2 ──sigmoid──▶ P(UP)
//! ```
//!
//! Evaluation is a pure function of the parameters and the state: it keeps no hidden state and
//! draws no random numbers, so repeated calls return bit-identical activations. Only
//! [`sample_action`] is stochastic.

use ndarray::{Array1, Array2};
use pgpong_engine::Action;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::{gradient::Gradients, preprocess::FeatureVector};

/// Bound applied to the sigmoid argument before exponentiation.
pub const SIGMOID_CLAMP: f64 = 500.0;

/// Parameter matrices have inconsistent shapes.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("W1 is {w1_shape:?} and W2 is {w2_shape:?}; expected [H, D] and [1, H]")]
pub struct ShapeError {
    pub w1_shape: [usize; 2],
    pub w2_shape: [usize; 2],
}

/// Weights of the policy network.
///
/// - `w1`: `[H, D]` hidden layer weights
/// - `w2`: `[1, H]` output layer weights
///
/// Shapes never change after construction; training only mutates values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters", into = "RawParameters")]
pub struct PolicyParameters {
    w1: Array2<f64>,
    w2: Array2<f64>,
}

#[derive(Serialize, Deserialize)]
struct RawParameters {
    w1: Array2<f64>,
    w2: Array2<f64>,
}

impl TryFrom<RawParameters> for PolicyParameters {
    type Error = ShapeError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        Self::from_matrices(raw.w1, raw.w2)
    }
}

impl From<PolicyParameters> for RawParameters {
    fn from(params: PolicyParameters) -> Self {
        Self {
            w1: params.w1,
            w2: params.w2,
        }
    }
}

impl PolicyParameters {
    /// Wraps existing matrices after checking that `w2` is `[1, H]` for the `H` rows of `w1`.
    pub fn from_matrices(w1: Array2<f64>, w2: Array2<f64>) -> Result<Self, ShapeError> {
        if w2.nrows() != 1 || w2.ncols() != w1.nrows() {
            return Err(ShapeError {
                w1_shape: [w1.nrows(), w1.ncols()],
                w2_shape: [w2.nrows(), w2.ncols()],
            });
        }
        Ok(Self { w1, w2 })
    }

    /// All-zero parameters (the policy then plays UP and DOWN with equal probability).
    #[must_use]
    pub fn zeros(hidden: usize, inputs: usize) -> Self {
        Self {
            w1: Array2::zeros((hidden, inputs)),
            w2: Array2::zeros((1, hidden)),
        }
    }

    /// Samples every weight independently from `N(0, std²)`.
    pub fn random<R>(rng: &mut R, hidden: usize, inputs: usize, std: f64) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut normal = || rng.sample::<f64, _>(StandardNormal) * std;
        let w1 = Array2::from_shape_fn((hidden, inputs), |_| normal());
        let w2 = Array2::from_shape_fn((1, hidden), |_| normal());
        Self { w1, w2 }
    }

    #[must_use]
    pub fn w1(&self) -> &Array2<f64> {
        &self.w1
    }

    #[must_use]
    pub fn w2(&self) -> &Array2<f64> {
        &self.w2
    }

    /// Number of hidden units `H`.
    #[must_use]
    pub fn hidden(&self) -> usize {
        self.w1.nrows()
    }

    /// Input feature length `D`.
    #[must_use]
    pub fn inputs(&self) -> usize {
        self.w1.ncols()
    }

    /// Adds `delta` to the weights in place.
    ///
    /// # Panics
    ///
    /// Panics if `delta` is not shaped like these parameters.
    pub fn apply_delta(&mut self, delta: &Gradients) {
        assert_eq!(self.w1.dim(), delta.w1.dim(), "W1 update has the wrong shape");
        assert_eq!(self.w2.dim(), delta.w2.dim(), "W2 update has the wrong shape");
        self.w1 += &delta.w1;
        self.w2 += &delta.w2;
    }

    pub(crate) fn matrices_mut(&mut self) -> (&mut Array2<f64>, &mut Array2<f64>) {
        (&mut self.w1, &mut self.w2)
    }
}

/// Every intermediate value of one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Activations {
    /// Hidden pre-activation `W1 · state`.
    pub fc1: Array1<f64>,
    /// `max(fc1, 0)`.
    pub relu1: Array1<f64>,
    /// Output logit `W2 · relu1`.
    pub fc2: f64,
    /// `sigmoid(fc2)`: probability of choosing [`Action::Up`].
    pub prob_up: f64,
}

/// Runs the forward pass.
///
/// # Panics
///
/// Panics if `state.len()` differs from [`PolicyParameters::inputs`].
#[must_use]
pub fn evaluate(state: &FeatureVector, params: &PolicyParameters) -> Activations {
    assert_eq!(
        state.len(),
        params.inputs(),
        "state length must match the W1 column count"
    );
    let fc1 = params.w1.dot(state);
    let relu1 = fc1.mapv(|v| v.max(0.0));
    let fc2 = params.w2.row(0).dot(&relu1);
    Activations {
        fc1,
        relu1,
        fc2,
        prob_up: sigmoid(fc2),
    }
}

/// Logistic function with the argument clamped to `[-500, 500]`.
///
/// # Example
///
/// ```
/// use pgpong_policy::network::sigmoid;
///
/// assert_eq!(sigmoid(0.0), 0.5);
/// assert!(sigmoid(1e6).is_finite());
/// assert!(sigmoid(-1e6) >= 0.0);
/// ```
#[must_use]
pub fn sigmoid(u: f64) -> f64 {
    let u = u.clamp(-SIGMOID_CLAMP, SIGMOID_CLAMP);
    1.0 / (1.0 + (-u).exp())
}

/// Draws an action: [`Action::Up`] with probability `prob_up`, otherwise [`Action::Down`].
pub fn sample_action<R>(prob_up: f64, rng: &mut R) -> Action
where
    R: Rng + ?Sized,
{
    let r: f64 = rng.random();
    if r < prob_up { Action::Up } else { Action::Down }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn fixed_params() -> PolicyParameters {
        PolicyParameters::from_matrices(
            array![[1.0, -1.0, 0.5], [-2.0, 0.0, 1.0]],
            array![[0.5, -1.5]],
        )
        .unwrap()
    }

    #[test]
    fn test_forward_pass_values() {
        let state = array![1.0, 2.0, 4.0];
        let act = evaluate(&state, &fixed_params());
        // fc1 = [1 - 2 + 2, -2 + 0 + 4] = [1, 2]
        assert_eq!(act.fc1, array![1.0, 2.0]);
        assert_eq!(act.relu1, array![1.0, 2.0]);
        // fc2 = 0.5 - 3.0
        assert_eq!(act.fc2, -2.5);
        assert!((act.prob_up - 1.0 / (1.0 + 2.5_f64.exp())).abs() < 1e-15);
    }

    #[test]
    fn test_relu_zeroes_negative_units() {
        let state = array![0.0, 3.0, 0.0];
        let act = evaluate(&state, &fixed_params());
        assert_eq!(act.fc1, array![-3.0, 0.0]);
        assert_eq!(act.relu1, array![0.0, 0.0]);
        assert_eq!(act.prob_up, 0.5);
    }

    #[test]
    fn test_evaluate_is_bit_identical() {
        let mut rng = Pcg32::seed_from_u64(7);
        let params = PolicyParameters::random(&mut rng, 8, 50, 0.3);
        let state = FeatureVector::from_shape_fn(50, |i| f64::from(u32::try_from(i).unwrap()).sin());
        let a = evaluate(&state, &params);
        let b = evaluate(&state, &params);
        assert_eq!(a.fc1, b.fc1);
        assert_eq!(a.relu1, b.relu1);
        assert_eq!(a.fc2.to_bits(), b.fc2.to_bits());
        assert_eq!(a.prob_up.to_bits(), b.prob_up.to_bits());
    }

    #[test]
    fn test_sigmoid_clamps_extremes() {
        assert_eq!(sigmoid(1000.0), sigmoid(SIGMOID_CLAMP));
        assert_eq!(sigmoid(-1000.0), sigmoid(-SIGMOID_CLAMP));
        assert!(sigmoid(-1000.0).is_finite());
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_sample_action_extremes() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(sample_action(1.0, &mut rng), Action::Up);
            assert_eq!(sample_action(0.0, &mut rng), Action::Down);
        }
    }

    #[test]
    fn test_sample_action_frequency() {
        let mut rng = Pcg32::seed_from_u64(2);
        let ups = (0..10_000)
            .filter(|_| sample_action(0.3, &mut rng).is_up())
            .count();
        assert!((2_700..3_300).contains(&ups), "ups = {ups}");
    }

    #[test]
    fn test_from_matrices_rejects_bad_shapes() {
        let err = PolicyParameters::from_matrices(Array2::zeros((3, 4)), Array2::zeros((1, 2)))
            .unwrap_err();
        assert_eq!(err.w1_shape, [3, 4]);
        assert_eq!(err.w2_shape, [1, 2]);
    }

    #[test]
    fn test_random_shapes() {
        let mut rng = Pcg32::seed_from_u64(3);
        let params = PolicyParameters::random(&mut rng, 10, 6400, 1e-3);
        assert_eq!(params.w1().dim(), (10, 6400));
        assert_eq!(params.w2().dim(), (1, 10));
        assert!(params.w1().iter().all(|w| w.abs() < 1e-2));
    }

    #[test]
    fn test_json_rejects_inconsistent_shapes() {
        let json = serde_json::to_string(&fixed_params()).unwrap();
        let back: PolicyParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fixed_params());

        let bad = json.replace("\"dim\":[1,2]", "\"dim\":[2,1]");
        assert!(serde_json::from_str::<PolicyParameters>(&bad).is_err());
    }
}
