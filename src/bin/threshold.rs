//! Threshold experiment runner.
//!
//! Sweeps code distances and physical error rates, decoding each sampled
//! error with the MPS coset decoder, and prints one JSON record per
//! (distance, rate) pair to stdout.

use clap::{Parser, ValueEnum};

use rotated_xz_sim::decoder::{ContractionMode, DecoderConfig};
use rotated_xz_sim::noise::{BiasedDepolarizingModel, DepolarizingModel, ErrorModel};
use rotated_xz_sim::pauli::Pauli;
use rotated_xz_sim::simulation::{run_experiment, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "threshold", about = "Monte Carlo threshold sweeps for the rotated XZ code")]
struct Args {
    /// Code distances to sweep (odd, >= 3).
    #[arg(long, value_delimiter = ',', default_value = "3,5,7,9")]
    distances: Vec<i32>,

    /// Physical error probabilities to sweep.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "0.05,0.10,0.15,0.20,0.25,0.30"
    )]
    probabilities: Vec<f64>,

    /// Monte Carlo trials per (distance, probability) pair.
    #[arg(long, default_value_t = 1000)]
    trials: usize,

    /// MPS bond-dimension bound.
    #[arg(long, default_value_t = 8)]
    chi: usize,

    /// Contract exactly, ignoring --chi.
    #[arg(long)]
    exact: bool,

    /// Relative singular-value cutoff during truncation.
    #[arg(long)]
    tol: Option<f64>,

    /// Contraction sweep mode.
    #[arg(long, value_enum, default_value = "columns")]
    mode: ModeArg,

    /// Error model.
    #[arg(long, value_enum, default_value = "biased")]
    model: ModelArg,

    /// Bias ratio for the biased model.
    #[arg(long, default_value_t = 30.0)]
    bias: f64,

    /// Biased axis.
    #[arg(long, value_enum, default_value = "z")]
    axis: AxisArg,

    /// Experiment seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Columns,
    Rows,
    Average,
}

impl From<ModeArg> for ContractionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Columns => ContractionMode::Columns,
            ModeArg::Rows => ContractionMode::Rows,
            ModeArg::Average => ContractionMode::Average,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Depolarizing,
    Biased,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AxisArg {
    X,
    Y,
    Z,
}

impl From<AxisArg> for Pauli {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::X => Pauli::X,
            AxisArg::Y => Pauli::Y,
            AxisArg::Z => Pauli::Z,
        }
    }
}

/// Closed set of CLI-selectable models; `ErrorModel` has a generic sampling
/// method, so dispatch is by enum rather than trait object.
enum Model {
    Depolarizing(DepolarizingModel),
    Biased(BiasedDepolarizingModel),
}

impl ErrorModel for Model {
    fn probability_distribution(&self, p: f64) -> [f64; 4] {
        match self {
            Model::Depolarizing(m) => m.probability_distribution(p),
            Model::Biased(m) => m.probability_distribution(p),
        }
    }

    fn label(&self) -> String {
        match self {
            Model::Depolarizing(m) => m.label(),
            Model::Biased(m) => m.label(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let model = match args.model {
        ModelArg::Depolarizing => Model::Depolarizing(DepolarizingModel),
        ModelArg::Biased => Model::Biased(BiasedDepolarizingModel::new(args.bias, args.axis.into())),
    };
    let decoder = DecoderConfig {
        chi: if args.exact { None } else { Some(args.chi) },
        mode: args.mode.into(),
        tol: args.tol,
    };

    for &distance in &args.distances {
        for &p_error in &args.probabilities {
            let config = SimConfig {
                distance,
                p_error,
                trials: args.trials,
                decoder,
                seed: args.seed,
            };
            let result = run_experiment(&config, &model)?;
            println!("{}", serde_json::to_string(&result)?);
        }
    }
    Ok(())
}
