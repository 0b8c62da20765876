//! Pauli algebra and per-site Pauli frames.
//!
//! Operators are tracked in binary symplectic form: each site carries an
//! (x-bit, z-bit) pair with I=(0,0), X=(1,0), Y=(1,1), Z=(0,1). Multiplication
//! is XOR on both bits (phases are irrelevant for stabilizer bookkeeping), so
//! a frame over n sites is just two bit vectors, giving O(n) memory instead of
//! exponential state vectors.

use std::fmt;

/// A single-qubit Pauli operator (phase-free).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    /// The (x-bit, z-bit) symplectic encoding.
    pub fn bits(self) -> (bool, bool) {
        match self {
            Pauli::I => (false, false),
            Pauli::X => (true, false),
            Pauli::Y => (true, true),
            Pauli::Z => (false, true),
        }
    }

    /// Reconstruct from symplectic bits.
    pub fn from_bits(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Pauli::I,
            (true, false) => Pauli::X,
            (true, true) => Pauli::Y,
            (false, true) => Pauli::Z,
        }
    }

    /// Group product (XOR of symplectic bits; the phase is discarded).
    pub fn mul(self, other: Pauli) -> Pauli {
        let (ax, az) = self.bits();
        let (bx, bz) = other.bits();
        Pauli::from_bits(ax ^ bx, az ^ bz)
    }

    /// Index into an (I, X, Y, Z)-ordered probability distribution.
    pub fn dist_index(self) -> usize {
        match self {
            Pauli::I => 0,
            Pauli::X => 1,
            Pauli::Y => 2,
            Pauli::Z => 3,
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        };
        write!(f, "{}", c)
    }
}

/// A Pauli operator over the sites of a d×d lattice.
///
/// Site (x, y) maps to index y·d + x. Applying an operator at a site composes
/// with what is already there (Pauli multiplication), it never overwrites.
/// Out-of-bounds applications are silently ignored, which is what boundary
/// half-plaquettes rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauliFrame {
    d: i32,
    xs: Vec<bool>,
    zs: Vec<bool>,
}

impl PauliFrame {
    /// Identity frame over a d×d lattice.
    pub fn identity(d: i32) -> Self {
        let n = (d * d) as usize;
        Self {
            d,
            xs: vec![false; n],
            zs: vec![false; n],
        }
    }

    /// Lattice dimension d.
    pub fn dim(&self) -> i32 {
        self.d
    }

    /// Number of sites d².
    pub fn num_sites(&self) -> usize {
        self.xs.len()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.d || y >= self.d {
            None
        } else {
            Some((y * self.d + x) as usize)
        }
    }

    /// Compose `p` onto site (x, y). No effect outside the lattice.
    pub fn site(&mut self, p: Pauli, (x, y): (i32, i32)) -> &mut Self {
        if let Some(i) = self.index(x, y) {
            let (px, pz) = p.bits();
            self.xs[i] ^= px;
            self.zs[i] ^= pz;
        }
        self
    }

    /// The single Pauli currently applied at site (x, y).
    ///
    /// Out-of-bounds sites read as identity.
    pub fn operator(&self, (x, y): (i32, i32)) -> Pauli {
        match self.index(x, y) {
            Some(i) => Pauli::from_bits(self.xs[i], self.zs[i]),
            None => Pauli::I,
        }
    }

    /// Compose another frame of the same dimension onto this one.
    pub fn compose(&mut self, other: &PauliFrame) -> &mut Self {
        debug_assert_eq!(self.d, other.d);
        for (a, b) in self.xs.iter_mut().zip(&other.xs) {
            *a ^= b;
        }
        for (a, b) in self.zs.iter_mut().zip(&other.zs) {
            *a ^= b;
        }
        self
    }

    /// Binary symplectic form `[x-block | z-block]`.
    pub fn to_bsf(&self) -> Vec<u8> {
        self.xs
            .iter()
            .chain(self.zs.iter())
            .map(|&b| b as u8)
            .collect()
    }

    /// Rebuild a frame from binary symplectic form.
    pub fn from_bsf(d: i32, bsf: &[u8]) -> Self {
        let n = (d * d) as usize;
        debug_assert_eq!(bsf.len(), 2 * n);
        Self {
            d,
            xs: bsf[..n].iter().map(|&b| b != 0).collect(),
            zs: bsf[n..].iter().map(|&b| b != 0).collect(),
        }
    }

    /// Symplectic product with another frame: 1 when the operators
    /// anticommute, 0 when they commute.
    pub fn symplectic_product(&self, other: &PauliFrame) -> u8 {
        debug_assert_eq!(self.d, other.d);
        let mut acc = false;
        for i in 0..self.xs.len() {
            acc ^= self.xs[i] & other.zs[i];
            acc ^= self.zs[i] & other.xs[i];
        }
        acc as u8
    }

    /// True if no site carries a non-identity Pauli.
    pub fn is_identity(&self) -> bool {
        self.xs.iter().all(|&b| !b) && self.zs.iter().all(|&b| !b)
    }

    /// Number of sites carrying a non-identity Pauli.
    pub fn weight(&self) -> usize {
        self.xs
            .iter()
            .zip(&self.zs)
            .filter(|(&x, &z)| x || z)
            .count()
    }
}

impl fmt::Display for PauliFrame {
    /// Rows printed top (y = d−1) to bottom (y = 0), matching lattice figures.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.d).rev() {
            for x in 0..self.d {
                write!(f, "{}", self.operator((x, y)))?;
            }
            if y > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
