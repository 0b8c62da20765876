//! Property test: the recovery path builder reproduces any measurable
//! syndrome exactly.

use proptest::prelude::*;

use rotated_xz_sim::lattice::RotatedXzLattice;
use rotated_xz_sim::pauli::{Pauli, PauliFrame};
use rotated_xz_sim::recovery::{RecoveryPathStrategy, RotatedXzPaths};

fn pauli_strategy() -> impl Strategy<Value = Pauli> {
    prop_oneof![
        Just(Pauli::I),
        Just(Pauli::X),
        Just(Pauli::Y),
        Just(Pauli::Z),
    ]
}

fn frame_strategy(d: i32) -> impl Strategy<Value = PauliFrame> {
    proptest::collection::vec(pauli_strategy(), (d * d) as usize).prop_map(move |paulis| {
        let mut frame = PauliFrame::identity(d);
        for (i, p) in paulis.into_iter().enumerate() {
            let i = i as i32;
            frame.site(p, (i % d, i / d));
        }
        frame
    })
}

proptest! {
    #[test]
    fn recovery_reproduces_syndrome_d3(error in frame_strategy(3)) {
        let lattice = RotatedXzLattice::new(3).unwrap();
        let syndrome = lattice.measure_syndrome(&error);
        let recovery = RotatedXzPaths.sample_recovery(&lattice, &syndrome);
        prop_assert_eq!(lattice.measure_syndrome(&recovery), syndrome);
    }

    #[test]
    fn recovery_reproduces_syndrome_d5(error in frame_strategy(5)) {
        let lattice = RotatedXzLattice::new(5).unwrap();
        let syndrome = lattice.measure_syndrome(&error);
        let recovery = RotatedXzPaths.sample_recovery(&lattice, &syndrome);
        prop_assert_eq!(lattice.measure_syndrome(&recovery), syndrome);
    }

    #[test]
    fn recovery_residual_commutes_with_stabilizers_d7(error in frame_strategy(7)) {
        let lattice = RotatedXzLattice::new(7).unwrap();
        let syndrome = lattice.measure_syndrome(&error);
        let mut residual = RotatedXzPaths.sample_recovery(&lattice, &syndrome);
        residual.compose(&error);
        prop_assert!(lattice.measure_syndrome(&residual).is_trivial());
    }
}
