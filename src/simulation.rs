//! Monte Carlo simulation: random errors, MPS coset decoding, threshold
//! estimation.
//!
//! One trial samples an error from the noise model, measures its syndrome,
//! decodes, and checks the residual (recovery composed with the error)
//! against the logical operators: decoding succeeds when the residual acts
//! trivially on the encoded qubit, i.e. commutes with both logicals.
//!
//! Trials are independent, so experiments fan out over rayon when the
//! `parallel` feature is enabled. Each trial derives its RNG from the
//! experiment seed and the trial index, which keeps results reproducible in
//! both serial and parallel runs.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::decoder::{ContractionDecoder, DecoderConfig};
use crate::lattice::{LatticeError, RotatedXzLattice};
use crate::network::NetworkError;
use crate::noise::ErrorModel;

/// Experiment failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error(transparent)]
    Lattice(#[from] LatticeError),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Configuration for a Monte Carlo decoding experiment.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Code distance (odd, ≥ 3).
    pub distance: i32,
    /// Physical error probability per qubit.
    pub p_error: f64,
    /// Number of Monte Carlo trials.
    pub trials: usize,
    /// Decoder parameters.
    pub decoder: DecoderConfig,
    /// Experiment seed; trial i uses seed + i.
    pub seed: u64,
}

/// Result of a Monte Carlo decoding experiment.
#[derive(Debug, Clone, Serialize)]
pub struct SimResult {
    /// Code label.
    pub code: String,
    /// Decoder label.
    pub decoder: String,
    /// Error model label.
    pub error_model: String,
    /// Code distance.
    pub distance: i32,
    /// Physical error rate.
    pub p_error: f64,
    /// Number of trials.
    pub trials: usize,
    /// Number of logical failures (after decoding).
    pub logical_failures: usize,
    /// Logical error rate = failures / trials.
    pub logical_error_rate: f64,
}

/// Run a single trial.
///
/// Returns true if a logical error remains after decoding.
pub fn run_once<M: ErrorModel, R: Rng + ?Sized>(
    decoder: &ContractionDecoder,
    model: &M,
    p: f64,
    rng: &mut R,
) -> Result<bool, SimError> {
    let lattice = decoder.lattice();
    let dist = model.probability_distribution(p);
    let error = model.generate(lattice, p, rng);
    let syndrome = lattice.measure_syndrome(&error);
    let mut residual = decoder.decode(&dist, &syndrome)?;
    residual.compose(&error);
    debug_assert!(lattice.measure_syndrome(&residual).is_trivial());
    let failed = residual.symplectic_product(&lattice.logical_x_frame()) == 1
        || residual.symplectic_product(&lattice.logical_z_frame()) == 1;
    Ok(failed)
}

/// Run a full decoding experiment.
pub fn run_experiment<M: ErrorModel + Sync>(
    config: &SimConfig,
    model: &M,
) -> Result<SimResult, SimError> {
    let lattice = RotatedXzLattice::new(config.distance)?;
    let decoder = ContractionDecoder::new(lattice, config.decoder)?;

    let trial = |i: usize| -> Result<bool, SimError> {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
        run_once(&decoder, model, config.p_error, &mut rng)
    };

    #[cfg(feature = "parallel")]
    let failures = (0..config.trials)
        .into_par_iter()
        .map(|i| trial(i).map(usize::from))
        .try_reduce(|| 0usize, |a, b| Ok(a + b))?;
    #[cfg(not(feature = "parallel"))]
    let failures = {
        let mut failures = 0usize;
        for i in 0..config.trials {
            failures += usize::from(trial(i)?);
        }
        failures
    };

    let result = SimResult {
        code: decoder.lattice().label(),
        decoder: decoder.label(),
        error_model: model.label(),
        distance: config.distance,
        p_error: config.p_error,
        trials: config.trials,
        logical_failures: failures,
        logical_error_rate: failures as f64 / config.trials as f64,
    };
    info!(
        "{} | {} | {} | p={} trials={} failures={} rate={:.4}",
        result.code,
        result.decoder,
        result.error_model,
        result.p_error,
        result.trials,
        result.logical_failures,
        result.logical_error_rate
    );
    Ok(result)
}

/// Run a sweep across error rates at a fixed distance.
pub fn threshold_sweep<M: ErrorModel + Sync>(
    distance: i32,
    error_rates: &[f64],
    trials: usize,
    decoder: DecoderConfig,
    seed: u64,
    model: &M,
) -> Result<Vec<SimResult>, SimError> {
    error_rates
        .iter()
        .map(|&p| {
            run_experiment(
                &SimConfig {
                    distance,
                    p_error: p,
                    trials,
                    decoder,
                    seed,
                },
                model,
            )
        })
        .collect()
}

/// Estimate where the logical error rate crosses `target` by linear
/// interpolation between adjacent sweep points.
pub fn estimate_crossing(results: &[SimResult], target: f64) -> Option<f64> {
    for window in results.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        if a.logical_error_rate < target && b.logical_error_rate >= target {
            let frac =
                (target - a.logical_error_rate) / (b.logical_error_rate - a.logical_error_rate);
            return Some(a.p_error + frac * (b.p_error - a.p_error));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ContractionMode;
    use crate::noise::{BiasedDepolarizingModel, DepolarizingModel};
    use crate::pauli::Pauli;

    fn config(p: f64, trials: usize) -> SimConfig {
        SimConfig {
            distance: 3,
            p_error: p,
            trials,
            decoder: DecoderConfig {
                chi: Some(8),
                mode: ContractionMode::Columns,
                tol: None,
            },
            seed: 13,
        }
    }

    #[test]
    fn test_zero_error_rate_no_logical_errors() {
        let result = run_experiment(&config(0.0, 50), &DepolarizingModel).unwrap();
        assert_eq!(
            result.logical_failures, 0,
            "zero error rate should produce zero logical errors"
        );
    }

    #[test]
    fn test_low_noise_mostly_succeeds() {
        let result = run_experiment(&config(0.02, 100), &DepolarizingModel).unwrap();
        assert!(
            result.logical_error_rate < 0.2,
            "low noise should mostly decode, got {}",
            result.logical_error_rate
        );
    }

    #[test]
    fn test_experiment_is_reproducible() {
        let model = BiasedDepolarizingModel::new(30.0, Pauli::Z);
        let a = run_experiment(&config(0.1, 60), &model).unwrap();
        let b = run_experiment(&config(0.1, 60), &model).unwrap();
        assert_eq!(a.logical_failures, b.logical_failures);
    }

    #[test]
    fn test_sweep_rate_increases_with_noise() {
        let rates = [0.01, 0.30];
        let results = threshold_sweep(
            3,
            &rates,
            80,
            DecoderConfig::default(),
            29,
            &DepolarizingModel,
        )
        .unwrap();
        assert!(
            results[0].logical_error_rate < results[1].logical_error_rate,
            "logical error rate should increase with physical error rate"
        );
    }

    #[test]
    fn test_estimate_crossing_interpolates() {
        let stub = |p: f64, rate: f64| SimResult {
            code: String::new(),
            decoder: String::new(),
            error_model: String::new(),
            distance: 3,
            p_error: p,
            trials: 100,
            logical_failures: (rate * 100.0) as usize,
            logical_error_rate: rate,
        };
        let results = vec![stub(0.05, 0.10), stub(0.10, 0.40), stub(0.15, 0.60)];
        let crossing = estimate_crossing(&results, 0.5).unwrap();
        assert!(crossing > 0.10 && crossing < 0.15, "got {}", crossing);
    }
}
