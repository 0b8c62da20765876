//! Coset-probability decoder driver.
//!
//! Decoding picks the most probable *logical class* rather than the most
//! probable error: any syndrome-consistent operator differs from the truth
//! by a stabilizer times a logical, so the four cosets I, X, Y, Z of the
//! stabilizer group partition the candidates. The driver builds one sample
//! recovery, shifts it by the logical operators to get a representative per
//! coset, estimates each coset's total probability by tensor-network
//! contraction, and returns the representative of the winner.

use log::debug;

use crate::lattice::{RotatedXzLattice, Syndrome};
use crate::mps;
use crate::network::{NetworkError, NodeFactory, NodeValueStrategy, XzAlternating};
use crate::pauli::PauliFrame;
use crate::recovery::{RecoveryPathStrategy, RotatedXzPaths};

/// Which MPS sweep(s) to contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractionMode {
    /// Left-to-right column sweep.
    Columns,
    /// Top-to-bottom row sweep (network transposed).
    Rows,
    /// Arithmetic mean of both sweeps, per coset.
    Average,
}

impl ContractionMode {
    /// Short label used in reporting.
    pub fn label(self) -> &'static str {
        match self {
            ContractionMode::Columns => "c",
            ContractionMode::Rows => "r",
            ContractionMode::Average => "a",
        }
    }
}

/// Decoder parameters.
#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    /// MPS bond-dimension bound; `None` contracts exactly.
    pub chi: Option<usize>,
    /// Contraction sweep mode.
    pub mode: ContractionMode,
    /// Relative singular-value cutoff applied during truncation.
    pub tol: Option<f64>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chi: Some(8),
            mode: ContractionMode::Columns,
            tol: None,
        }
    }
}

/// Coset probabilities in (I, X, Y, Z) order.
pub type CosetProbabilities = [f64; 4];

/// The MPS coset decoder, composed of a recovery-path strategy and a
/// node-value strategy.
pub struct ContractionDecoder<P = RotatedXzPaths, V = XzAlternating>
where
    P: RecoveryPathStrategy,
    V: NodeValueStrategy,
{
    lattice: RotatedXzLattice,
    paths: P,
    factory: NodeFactory<V>,
    config: DecoderConfig,
}

impl ContractionDecoder {
    /// Decoder with the standard rotated-XZ strategies.
    pub fn new(lattice: RotatedXzLattice, config: DecoderConfig) -> Result<Self, NetworkError> {
        Self::with_strategies(lattice, config, RotatedXzPaths, XzAlternating)
    }
}

impl<P: RecoveryPathStrategy, V: NodeValueStrategy> ContractionDecoder<P, V> {
    /// Decoder with explicit strategies.
    pub fn with_strategies(
        lattice: RotatedXzLattice,
        config: DecoderConfig,
        paths: P,
        strategy: V,
    ) -> Result<Self, NetworkError> {
        Ok(Self {
            lattice,
            paths,
            factory: NodeFactory::new(strategy)?,
            config,
        })
    }

    /// The lattice this decoder was built for.
    pub fn lattice(&self) -> &RotatedXzLattice {
        &self.lattice
    }

    /// Human-readable label for reporting.
    pub fn label(&self) -> String {
        let mut params = vec![format!("mode={}", self.config.mode.label())];
        if let Some(chi) = self.config.chi {
            params.insert(0, format!("chi={}", chi));
        }
        if let Some(tol) = self.config.tol {
            params.push(format!("tol={}", tol));
        }
        format!("rotated planar XZ MPS ({})", params.join(", "))
    }

    fn network_value(&self, sample: &PauliFrame, dist: &[f64; 4]) -> Result<f64, NetworkError> {
        let tn = self.factory.create_network(&self.lattice, dist, sample)?;
        let value = match self.config.mode {
            ContractionMode::Columns => mps::contract(&tn, self.config.chi, self.config.tol),
            ContractionMode::Rows => {
                mps::contract(&tn.transpose(), self.config.chi, self.config.tol)
            }
            ContractionMode::Average => {
                let cols = mps::contract(&tn, self.config.chi, self.config.tol);
                let rows = mps::contract(&tn.transpose(), self.config.chi, self.config.tol);
                (cols + rows) / 2.0
            }
        };
        Ok(value)
    }

    /// Estimate the coset probabilities of the four logical shifts of
    /// `sample`, returning the probabilities with their representatives.
    ///
    /// The values are unnormalized and, under truncation, approximate; only
    /// their relative order matters to `decode`.
    pub fn coset_probabilities(
        &self,
        dist: &[f64; 4],
        sample: &PauliFrame,
    ) -> Result<(CosetProbabilities, [PauliFrame; 4]), NetworkError> {
        let r_i = sample.clone();
        let mut r_x = sample.clone();
        self.lattice.apply_logical_x(&mut r_x);
        let mut r_y = r_x.clone();
        self.lattice.apply_logical_z(&mut r_y);
        let mut r_z = sample.clone();
        self.lattice.apply_logical_z(&mut r_z);

        let probabilities = [
            self.network_value(&r_i, dist)?,
            self.network_value(&r_x, dist)?,
            self.network_value(&r_y, dist)?,
            self.network_value(&r_z, dist)?,
        ];
        Ok((probabilities, [r_i, r_x, r_y, r_z]))
    }

    /// Decode a syndrome to a recovery operator.
    ///
    /// Ties between cosets break toward the earlier of (I, X, Y, Z): a
    /// later coset must be strictly more probable to win.
    pub fn decode(&self, dist: &[f64; 4], syndrome: &Syndrome) -> Result<PauliFrame, NetworkError> {
        let sample = self.paths.sample_recovery(&self.lattice, syndrome);
        let (probabilities, recoveries) = self.coset_probabilities(dist, &sample)?;
        debug!(
            "coset probabilities (I, X, Y, Z): {:?} for syndrome weight {}",
            probabilities,
            syndrome.weight()
        );
        let mut best = 0;
        for i in 1..4 {
            if probabilities[i] > probabilities[best] {
                best = i;
            }
        }
        let [r_i, r_x, r_y, r_z] = recoveries;
        Ok(match best {
            0 => r_i,
            1 => r_x,
            2 => r_y,
            _ => r_z,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{DepolarizingModel, ErrorModel};
    use crate::pauli::Pauli;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn exact_decoder(d: i32, mode: ContractionMode) -> ContractionDecoder {
        let lattice = RotatedXzLattice::new(d).unwrap();
        let config = DecoderConfig {
            chi: None,
            mode,
            tol: None,
        };
        ContractionDecoder::new(lattice, config).unwrap()
    }

    #[test]
    fn test_label_lists_set_parameters() {
        let lattice = RotatedXzLattice::new(3).unwrap();
        let decoder = ContractionDecoder::new(lattice, DecoderConfig::default()).unwrap();
        assert_eq!(decoder.label(), "rotated planar XZ MPS (chi=8, mode=c)");
        let exact = exact_decoder(3, ContractionMode::Average);
        assert_eq!(exact.label(), "rotated planar XZ MPS (mode=a)");
    }

    #[test]
    fn test_decoded_recovery_matches_syndrome() {
        let decoder = exact_decoder(3, ContractionMode::Columns);
        let dist = DepolarizingModel.probability_distribution(0.1);
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..20 {
            let error = DepolarizingModel.generate(decoder.lattice(), 0.1, &mut rng);
            let syndrome = decoder.lattice().measure_syndrome(&error);
            let recovery = decoder.decode(&dist, &syndrome).unwrap();
            assert_eq!(decoder.lattice().measure_syndrome(&recovery), syndrome);
        }
    }

    #[test]
    fn test_trivial_syndrome_decodes_to_identity_coset() {
        // With no syndrome and low noise the identity coset dominates, and
        // ties break toward I anyway.
        let decoder = exact_decoder(3, ContractionMode::Columns);
        let dist = DepolarizingModel.probability_distribution(0.05);
        let syndrome = Syndrome::from_bits(vec![false; 8]);
        let recovery = decoder.decode(&dist, &syndrome).unwrap();
        assert!(decoder.lattice().measure_syndrome(&recovery).is_trivial());
        assert!(recovery.is_identity());
    }

    #[test]
    fn test_average_mode_is_mean_of_sweeps() {
        let dist = DepolarizingModel.probability_distribution(0.12);
        let mut sample = PauliFrame::identity(3);
        sample.site(Pauli::X, (1, 1)).site(Pauli::Z, (2, 0));
        let by = |mode| {
            let decoder = exact_decoder(3, mode);
            let (ps, _) = decoder.coset_probabilities(&dist, &sample).unwrap();
            ps
        };
        let cols = by(ContractionMode::Columns);
        let rows = by(ContractionMode::Rows);
        let avg = by(ContractionMode::Average);
        for i in 0..4 {
            assert!((avg[i] - (cols[i] + rows[i]) / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_exact_sweeps_agree() {
        // Without truncation both sweep directions contract the same
        // network exactly.
        let dist = DepolarizingModel.probability_distribution(0.1);
        let lattice = RotatedXzLattice::new(3).unwrap();
        let mut rng = StdRng::seed_from_u64(23);
        let error = DepolarizingModel.generate(&lattice, 0.1, &mut rng);
        let syndrome = lattice.measure_syndrome(&error);
        let sample = RotatedXzPaths.sample_recovery(&lattice, &syndrome);
        let cols = exact_decoder(3, ContractionMode::Columns)
            .coset_probabilities(&dist, &sample)
            .unwrap()
            .0;
        let rows = exact_decoder(3, ContractionMode::Rows)
            .coset_probabilities(&dist, &sample)
            .unwrap()
            .0;
        for i in 0..4 {
            let scale = cols[i].abs().max(1e-300);
            assert!((cols[i] - rows[i]).abs() / scale < 1e-9, "coset {}", i);
        }
    }

    #[test]
    fn test_single_qubit_error_corrected() {
        // An exact decoder at low noise must correct any weight-1 error.
        let decoder = exact_decoder(3, ContractionMode::Columns);
        let dist = DepolarizingModel.probability_distribution(0.05);
        let lattice = decoder.lattice().clone();
        let lx = lattice.logical_x_frame();
        let lz = lattice.logical_z_frame();
        for x in 0..3 {
            for y in 0..3 {
                for p in [Pauli::X, Pauli::Y, Pauli::Z] {
                    let mut error = PauliFrame::identity(3);
                    error.site(p, (x, y));
                    let syndrome = lattice.measure_syndrome(&error);
                    let mut residual = decoder.decode(&dist, &syndrome).unwrap();
                    residual.compose(&error);
                    assert!(lattice.measure_syndrome(&residual).is_trivial());
                    assert_eq!(residual.symplectic_product(&lx), 0, "{} at {},{}", p, x, y);
                    assert_eq!(residual.symplectic_product(&lz), 0, "{} at {},{}", p, x, y);
                }
            }
        }
    }
}
