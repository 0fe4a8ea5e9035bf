//! Finite-difference verification of the analytic gradient.
//!
//! Training never calls into this module. It exists to check
//! [`prob_up_gradient`](crate::gradient::prob_up_gradient) against central differences, both in
//! tests and through the `check-gradient` command.

use ndarray::Array2;

use crate::{
    gradient::Gradients,
    network::{self, PolicyParameters},
    preprocess::FeatureVector,
};

/// Approximates `∂P(UP)/∂W` entry by entry with central differences of step `eps`.
///
/// Costs two forward passes per weight, so only use it on small networks.
#[must_use]
pub fn numerical_prob_up_gradient(
    state: &FeatureVector,
    params: &PolicyParameters,
    eps: f64,
) -> Gradients {
    let prob_up = |p: &PolicyParameters| network::evaluate(state, p).prob_up;

    let w1 = Array2::from_shape_fn(params.w1().raw_dim(), |(i, j)| {
        let mut plus = params.clone();
        let mut minus = params.clone();
        plus.matrices_mut().0[[i, j]] += eps;
        minus.matrices_mut().0[[i, j]] -= eps;
        (prob_up(&plus) - prob_up(&minus)) / (2.0 * eps)
    });
    let w2 = Array2::from_shape_fn(params.w2().raw_dim(), |(i, j)| {
        let mut plus = params.clone();
        let mut minus = params.clone();
        plus.matrices_mut().1[[i, j]] += eps;
        minus.matrices_mut().1[[i, j]] -= eps;
        (prob_up(&plus) - prob_up(&minus)) / (2.0 * eps)
    });

    Gradients { w1, w2 }
}

/// L1 distance between two matrices relative to the smaller of their L1 norms.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use pgpong_policy::gradient_check::relative_error;
///
/// assert_eq!(relative_error(&array![[1.0, 1.0]], &array![[1.0, 1.0]]), 0.0);
/// assert!((relative_error(&array![[1.0, 1.0]], &array![[1.0, 1.5]]) - 0.25).abs() < 1e-12);
/// ```
///
/// # Panics
///
/// Panics if the shapes differ.
#[must_use]
pub fn relative_error(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    assert_eq!(a.dim(), b.dim(), "cannot compare matrices of different shapes");
    let abs_error = (a - b).mapv(f64::abs).sum();
    let norm_a = a.mapv(f64::abs).sum();
    let norm_b = b.mapv(f64::abs).sum();
    abs_error / f64::min(1e-20 + norm_a, 1e-20 + norm_b)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_zero_weights_give_half_probability_slope() {
        // With W2 = 0 the output only moves through W2: dp/dW2 = 0.25 · relu1
        let params = PolicyParameters::from_matrices(array![[1.0, 2.0]], array![[0.0]]).unwrap();
        let state = array![1.0, 1.0];
        let numeric = numerical_prob_up_gradient(&state, &params, 1e-6);
        assert!((numeric.w2[[0, 0]] - 0.75).abs() < 1e-8);
        assert!(numeric.w1.iter().all(|g| g.abs() < 1e-8));
    }

    #[test]
    fn test_relative_error_is_symmetric_in_norm_choice() {
        let a = array![[2.0, 0.0], [0.0, 2.0]];
        let b = array![[1.0, 0.0], [0.0, 1.0]];
        assert_eq!(relative_error(&a, &b), relative_error(&b, &a));
        assert_eq!(relative_error(&a, &b), 1.0);
    }

    #[test]
    fn test_relative_error_of_zero_matrices() {
        let z = Array2::zeros((2, 2));
        assert_eq!(relative_error(&z, &z), 0.0);
    }
}
