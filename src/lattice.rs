//! Rotated planar XZ (XZXZ/ZXZX) lattice model.
//!
//! The code lives on a d×d grid of qubit sites with open boundaries. Sites are
//! indexed (x, y) with the origin at the lower left. Stabilizer plaquettes are
//! indexed by the site at their lower-left corner, so plaquette coordinates
//! run over −1 ≤ x, y ≤ d−1.
//!
//! Two interleaved sublattice flavors tile the lattice, keyed by the parity
//! of (x − y); the flavor decides which boundaries a plaquette is measured on
//! and which tensor sublattice its corner sites belong to. The operator
//! pattern of a plaquette alternates by row instead:
//! - **even rows** (y even): Z on the two west corners, X on the two east
//!   corners;
//! - **odd rows** (y odd): X on the west corners, Z on the east.
//!
//! Boundary plaquettes are halved; on each boundary only one flavor is
//! measured. Even-flavor plaquettes on the west/east boundaries and
//! odd-flavor plaquettes on the south/north boundaries are *virtual*: they
//! are not stabilizers. That leaves d² − 1 stabilizers for d² qubits,
//! encoding one logical qubit.
//!
//! Plaquette layout for d = 3 (virtual plaquettes omitted):
//! ```text
//!          -------
//!         /       \
//!        |Z (0,2) X|
//!        +---------+---------+-----
//!        |X       Z|X       Z|X    \
//!        |  (0,1)  |  (1,1)  |(2,1) |
//!        |X       Z|X       Z|X    /
//!   -----+---------+---------+-----
//!  /    X|Z       X|Z       X|
//! |(-1,0)|  (0,0)  |  (1,0)  |
//!  \    X|Z       X|Z       X|
//!   -----+---------+---------+
//!                  |X       Z|
//!                   \ (1,-1)/
//!                    -------
//! ```

use smallvec::SmallVec;
use thiserror::Error;

use crate::pauli::{Pauli, PauliFrame};

/// Lattice position (site or plaquette), in (x, y) format.
pub type Index = (i32, i32);

/// Construction-time validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    /// The distance must be at least 3 for the path rules to be meaningful.
    #[error("lattice distance must be at least 3, got {0}")]
    DistanceTooSmall(i32),
    /// Even distances break the interleaved boundary flavors.
    #[error("lattice distance must be odd, got {0}")]
    DistanceEven(i32),
}

/// The rotated planar XZ lattice for a given odd code distance d ≥ 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatedXzLattice {
    d: i32,
    /// Non-virtual plaquette indices, row-major (y ascending, then x).
    stabilizer_indices: Vec<Index>,
}

impl RotatedXzLattice {
    /// Build a lattice of the given distance.
    pub fn new(distance: i32) -> Result<Self, LatticeError> {
        if distance < 3 {
            return Err(LatticeError::DistanceTooSmall(distance));
        }
        if distance % 2 == 0 {
            return Err(LatticeError::DistanceEven(distance));
        }
        let mut stabilizer_indices = Vec::new();
        for y in -1..distance {
            for x in -1..distance {
                let index = (x, y);
                if !Self::is_virtual_plaquette_for(distance, index) {
                    stabilizer_indices.push(index);
                }
            }
        }
        Ok(Self {
            d: distance,
            stabilizer_indices,
        })
    }

    /// Code distance d.
    pub fn distance(&self) -> i32 {
        self.d
    }

    /// (n, k, d) code parameters.
    pub fn n_k_d(&self) -> (usize, usize, i32) {
        ((self.d * self.d) as usize, 1, self.d)
    }

    /// Maximum site coordinates (max_x, max_y) = (d−1, d−1).
    pub fn site_bounds(&self) -> (i32, i32) {
        (self.d - 1, self.d - 1)
    }

    /// True if (x, y) is a qubit site on the lattice.
    pub fn is_in_site_bounds(&self, (x, y): Index) -> bool {
        x >= 0 && y >= 0 && x < self.d && y < self.d
    }

    /// True if (x, y) indexes a plaquette (virtual ones included).
    pub fn is_in_plaquette_bounds(&self, (x, y): Index) -> bool {
        x >= -1 && y >= -1 && x < self.d && y < self.d
    }

    /// True for even-flavor plaquettes, i.e. (x − y) even.
    ///
    /// Flavor controls which boundaries host measured half-plaquettes; the
    /// corner operator pattern is row-keyed, see `plaquette_operators`.
    pub fn is_even_flavor_plaquette(&self, (x, y): Index) -> bool {
        (x - y).rem_euclid(2) == 0
    }

    /// True for plaquettes whose stabilizer is not measured.
    pub fn is_virtual_plaquette(&self, index: Index) -> bool {
        Self::is_virtual_plaquette_for(self.d, index)
    }

    fn is_virtual_plaquette_for(d: i32, (x, y): Index) -> bool {
        let even_flavor = (x - y).rem_euclid(2) == 0;
        if even_flavor {
            x == -1 || x == d - 1
        } else {
            y == -1 || y == d - 1
        }
    }

    /// Non-virtual plaquette indices in stabilizer order.
    pub fn stabilizer_indices(&self) -> &[Index] {
        &self.stabilizer_indices
    }

    /// Number of stabilizers, d² − 1.
    pub fn num_stabilizers(&self) -> usize {
        self.stabilizer_indices.len()
    }

    /// The four (corner site, Pauli) pairs of a plaquette operator.
    ///
    /// Even rows apply Z to the west corners and X to the east corners, odd
    /// rows the converse; this is the pattern that commutes with itself and
    /// with both logicals. Out-of-bounds corners are returned as-is;
    /// `PauliFrame::site` drops them, which realizes the boundary
    /// half-plaquettes.
    pub fn plaquette_operators(&self, index: Index) -> SmallVec<[(Index, Pauli); 4]> {
        let (x, y) = index;
        let (west, east) = if y.rem_euclid(2) == 0 {
            (Pauli::Z, Pauli::X)
        } else {
            (Pauli::X, Pauli::Z)
        };
        let mut ops = SmallVec::new();
        ops.push(((x, y), west)); // SW
        ops.push(((x, y + 1), west)); // NW
        ops.push(((x + 1, y + 1), east)); // NE
        ops.push(((x + 1, y), east)); // SE
        ops
    }

    /// Compose the plaquette operator at `index` onto `frame`.
    ///
    /// Plaquettes outside the plaquette bounds have no effect.
    pub fn apply_plaquette(&self, frame: &mut PauliFrame, index: Index) {
        if !self.is_in_plaquette_bounds(index) {
            return;
        }
        for (site, p) in self.plaquette_operators(index) {
            frame.site(p, site);
        }
    }

    /// The stabilizer at `index` as a frame.
    pub fn stabilizer_frame(&self, index: Index) -> PauliFrame {
        let mut frame = PauliFrame::identity(self.d);
        self.apply_plaquette(&mut frame, index);
        frame
    }

    /// Compose the logical X operator onto `frame`.
    ///
    /// Runs along the bottom row, alternating X (even columns) and Z (odd),
    /// which keeps its tensor-network footprint on a single row.
    pub fn apply_logical_x(&self, frame: &mut PauliFrame) {
        for x in 0..self.d {
            let p = if x % 2 == 0 { Pauli::X } else { Pauli::Z };
            frame.site(p, (x, 0));
        }
    }

    /// Compose the logical Z operator onto `frame`: Z down the rightmost
    /// column.
    pub fn apply_logical_z(&self, frame: &mut PauliFrame) {
        for y in 0..self.d {
            frame.site(Pauli::Z, (self.d - 1, y));
        }
    }

    /// Logical X as a standalone frame.
    pub fn logical_x_frame(&self) -> PauliFrame {
        let mut frame = PauliFrame::identity(self.d);
        self.apply_logical_x(&mut frame);
        frame
    }

    /// Logical Z as a standalone frame.
    pub fn logical_z_frame(&self) -> PauliFrame {
        let mut frame = PauliFrame::identity(self.d);
        self.apply_logical_z(&mut frame);
        frame
    }

    /// Measure every stabilizer against `frame`.
    pub fn measure_syndrome(&self, frame: &PauliFrame) -> Syndrome {
        let bits = self
            .stabilizer_indices
            .iter()
            .map(|&index| self.stabilizer_frame(index).symplectic_product(frame) == 1)
            .collect();
        Syndrome { bits }
    }

    /// Resolve a syndrome back to the violated plaquette indices.
    pub fn syndrome_to_plaquettes(&self, syndrome: &Syndrome) -> Vec<Index> {
        debug_assert_eq!(syndrome.bits.len(), self.stabilizer_indices.len());
        self.stabilizer_indices
            .iter()
            .zip(&syndrome.bits)
            .filter(|(_, &bit)| bit)
            .map(|(&index, _)| index)
            .collect()
    }

    /// Human-readable label for reporting.
    pub fn label(&self) -> String {
        format!("rotated planar XZ {}", self.d)
    }
}

/// Result of measuring all stabilizers, ordered as `stabilizer_indices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syndrome {
    bits: Vec<bool>,
}

impl Syndrome {
    /// Build from raw bits (must match the lattice's stabilizer order).
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Stabilizer outcomes in order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of violated stabilizers.
    pub fn weight(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// True when no stabilizer is violated.
    pub fn is_trivial(&self) -> bool {
        self.weight() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_validation() {
        assert_eq!(
            RotatedXzLattice::new(1),
            Err(LatticeError::DistanceTooSmall(1))
        );
        assert_eq!(RotatedXzLattice::new(4), Err(LatticeError::DistanceEven(4)));
        assert!(RotatedXzLattice::new(3).is_ok());
        assert!(RotatedXzLattice::new(7).is_ok());
    }

    #[test]
    fn test_stabilizer_count() {
        for d in [3, 5, 7] {
            let lattice = RotatedXzLattice::new(d).unwrap();
            assert_eq!(lattice.num_stabilizers(), (d * d - 1) as usize);
        }
    }

    #[test]
    fn test_virtual_plaquettes_d3() {
        let lattice = RotatedXzLattice::new(3).unwrap();
        // Real boundary half-plaquettes from the module-level figure.
        for index in [(1, -1), (-1, 0), (2, 1), (0, 2)] {
            assert!(!lattice.is_virtual_plaquette(index), "{:?}", index);
        }
        // Corners are always virtual.
        for index in [(-1, -1), (-1, 2), (2, -1), (2, 2)] {
            assert!(lattice.is_virtual_plaquette(index), "{:?}", index);
        }
    }

    #[test]
    fn test_stabilizers_commute_pairwise() {
        let lattice = RotatedXzLattice::new(3).unwrap();
        let frames: Vec<_> = lattice
            .stabilizer_indices()
            .iter()
            .map(|&i| lattice.stabilizer_frame(i))
            .collect();
        for a in &frames {
            for b in &frames {
                assert_eq!(a.symplectic_product(b), 0);
            }
        }
    }

    #[test]
    fn test_logicals_commute_with_stabilizers_and_anticommute() {
        for d in [3, 5] {
            let lattice = RotatedXzLattice::new(d).unwrap();
            let lx = lattice.logical_x_frame();
            let lz = lattice.logical_z_frame();
            for &index in lattice.stabilizer_indices() {
                let s = lattice.stabilizer_frame(index);
                assert_eq!(s.symplectic_product(&lx), 0, "X̄ vs {:?}", index);
                assert_eq!(s.symplectic_product(&lz), 0, "Z̄ vs {:?}", index);
            }
            assert_eq!(lx.symplectic_product(&lz), 1);
        }
    }

    #[test]
    fn test_syndrome_of_identity_is_trivial() {
        let lattice = RotatedXzLattice::new(5).unwrap();
        let frame = PauliFrame::identity(5);
        assert!(lattice.measure_syndrome(&frame).is_trivial());
    }

    #[test]
    fn test_single_error_violates_adjacent_stabilizers_only() {
        let lattice = RotatedXzLattice::new(3).unwrap();
        let mut frame = PauliFrame::identity(3);
        frame.site(Pauli::Y, (1, 1));
        let syndrome = lattice.measure_syndrome(&frame);
        let violated = lattice.syndrome_to_plaquettes(&syndrome);
        assert!(!syndrome.is_trivial());
        // Every violated plaquette must touch the error site.
        for (x, y) in violated {
            assert!((x - 1).abs() <= 1 && (y - 1).abs() <= 1);
        }
    }

    #[test]
    fn test_stabilizer_application_leaves_syndrome_invariant() {
        let lattice = RotatedXzLattice::new(3).unwrap();
        let mut frame = PauliFrame::identity(3);
        frame.site(Pauli::X, (0, 1)).site(Pauli::Z, (2, 2));
        let before = lattice.measure_syndrome(&frame);
        lattice.apply_plaquette(&mut frame, (1, 0));
        let after = lattice.measure_syndrome(&frame);
        assert_eq!(before, after);
    }
}
