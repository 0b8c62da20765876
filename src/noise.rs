//! Independent Pauli error models.
//!
//! Each qubit independently suffers an error drawn from a distribution
//! (Pr(I), Pr(X), Pr(Y), Pr(Z)) parameterized by the physical error
//! probability p. The same distribution feeds the decoder's tensor entries,
//! so decoding and sampling stay consistent by construction.

use rand::Rng;

use crate::lattice::RotatedXzLattice;
use crate::pauli::{Pauli, PauliFrame};

/// An i.i.d. single-qubit Pauli error model.
pub trait ErrorModel {
    /// Distribution (Pr(I), Pr(X), Pr(Y), Pr(Z)) at error probability p.
    fn probability_distribution(&self, p: f64) -> [f64; 4];

    /// Human-readable label for reporting.
    fn label(&self) -> String;

    /// Sample an error frame: each site independently draws from the
    /// distribution.
    fn generate<R: Rng + ?Sized>(
        &self,
        lattice: &RotatedXzLattice,
        p: f64,
        rng: &mut R,
    ) -> PauliFrame {
        let dist = self.probability_distribution(p);
        let d = lattice.distance();
        let mut frame = PauliFrame::identity(d);
        for y in 0..d {
            for x in 0..d {
                let r: f64 = rng.gen();
                let pauli = if r < dist[1] {
                    Pauli::X
                } else if r < dist[1] + dist[2] {
                    Pauli::Y
                } else if r < dist[1] + dist[2] + dist[3] {
                    Pauli::Z
                } else {
                    Pauli::I
                };
                frame.site(pauli, (x, y));
            }
        }
        frame
    }
}

/// Standard depolarizing noise: X, Y and Z each with probability p/3.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepolarizingModel;

impl ErrorModel for DepolarizingModel {
    fn probability_distribution(&self, p: f64) -> [f64; 4] {
        let p_each = p / 3.0;
        [1.0 - p, p_each, p_each, p_each]
    }

    fn label(&self) -> String {
        "depolarizing".to_string()
    }
}

/// Depolarizing noise biased toward one axis by a ratio η.
///
/// The biased axis carries probability p·η/(η + 1); the other two axes share
/// the remainder equally. η = 0.5 reduces to standard depolarizing noise.
#[derive(Debug, Clone, Copy)]
pub struct BiasedDepolarizingModel {
    /// Bias ratio η = Pr(axis) / (Pr(other) + Pr(other)).
    pub bias: f64,
    /// The favored axis; must not be I.
    pub axis: Pauli,
}

impl BiasedDepolarizingModel {
    /// Model biased toward `axis` with ratio `bias` > 0.
    pub fn new(bias: f64, axis: Pauli) -> Self {
        debug_assert!(bias > 0.0);
        debug_assert!(axis != Pauli::I);
        Self { bias, axis }
    }
}

impl ErrorModel for BiasedDepolarizingModel {
    fn probability_distribution(&self, p: f64) -> [f64; 4] {
        let p_axis = p * self.bias / (self.bias + 1.0);
        let p_rest = p / (2.0 * (self.bias + 1.0));
        let mut dist = [1.0 - p, p_rest, p_rest, p_rest];
        dist[self.axis.dist_index()] = p_axis;
        dist
    }

    fn label(&self) -> String {
        format!("biased depolarizing (bias={}, axis={})", self.bias, self.axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_normalized(dist: [f64; 4]) {
        let sum: f64 = dist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12, "distribution sums to {}", sum);
        assert!(dist.iter().all(|&q| q >= 0.0));
    }

    #[test]
    fn test_depolarizing_distribution() {
        let dist = DepolarizingModel.probability_distribution(0.3);
        assert_normalized(dist);
        assert!((dist[0] - 0.7).abs() < 1e-12);
        assert!((dist[1] - 0.1).abs() < 1e-12);
        assert_eq!(dist[1], dist[2]);
        assert_eq!(dist[2], dist[3]);
    }

    #[test]
    fn test_biased_distribution() {
        let model = BiasedDepolarizingModel::new(30.0, Pauli::Z);
        let dist = model.probability_distribution(0.1);
        assert_normalized(dist);
        assert!(dist[3] > dist[1]);
        assert_eq!(dist[1], dist[2]);
        // Bias 0.5 reduces to depolarizing.
        let half = BiasedDepolarizingModel::new(0.5, Pauli::Z);
        let a = half.probability_distribution(0.2);
        let b = DepolarizingModel.probability_distribution(0.2);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_generate_zero_probability_is_identity() {
        let lattice = RotatedXzLattice::new(5).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let frame = DepolarizingModel.generate(&lattice, 0.0, &mut rng);
        assert!(frame.is_identity());
    }

    #[test]
    fn test_generate_density_tracks_probability() {
        let lattice = RotatedXzLattice::new(9).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut weight = 0;
        let trials = 200;
        for _ in 0..trials {
            weight += DepolarizingModel.generate(&lattice, 0.5, &mut rng).weight();
        }
        let density = weight as f64 / (trials * 81) as f64;
        assert!(
            (0.4..0.6).contains(&density),
            "error density at p=0.5 should be near 50%, got {}",
            density
        );
    }
}
