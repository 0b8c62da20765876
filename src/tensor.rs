//! Dense rank-4 tensors and delta (copy) nodes.
//!
//! Network nodes are small f64 arrays indexed by (north, east, south, west)
//! leg values. Delta nodes are generalized Kronecker tensors: an entry is 1
//! exactly when all *non-dummy* indices (those of legs with dimension > 1)
//! agree. Absorbing one delta into each leg of a qubit node and regrouping
//! pairs of legs rotates the network by 45°, which is what turns the split
//! stabilizers into ordinary grid bonds.

use num_traits::Zero;

/// A rank-4 tensor with legs ordered (north, east, south, west).
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor4 {
    shape: [usize; 4],
    data: Vec<f64>,
}

impl Tensor4 {
    /// Zero-filled tensor of the given shape.
    pub fn zeros(shape: [usize; 4]) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![f64::zero(); len],
        }
    }

    /// Leg dimensions (n, e, s, w).
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    fn offset(&self, [n, e, s, w]: [usize; 4]) -> usize {
        ((n * self.shape[1] + e) * self.shape[2] + s) * self.shape[3] + w
    }

    /// Read the entry at (n, e, s, w).
    pub fn get(&self, index: [usize; 4]) -> f64 {
        self.data[self.offset(index)]
    }

    /// Write the entry at (n, e, s, w).
    pub fn set(&mut self, index: [usize; 4], value: f64) {
        let i = self.offset(index);
        self.data[i] = value;
    }

    /// Add into the entry at (n, e, s, w).
    pub fn add(&mut self, index: [usize; 4], value: f64) {
        let i = self.offset(index);
        self.data[i] += value;
    }

    /// Raw entries in row-major (n, e, s, w) order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Reverse the leg order: (n, e, s, w) → (w, s, e, n).
    ///
    /// This is the per-node half of transposing the network across its main
    /// diagonal: the grid transpose swaps north↔west and east↔south.
    pub fn reverse_axes(&self) -> Tensor4 {
        let [dn, de, ds, dw] = self.shape;
        let mut out = Tensor4::zeros([dw, ds, de, dn]);
        for n in 0..dn {
            for e in 0..de {
                for s in 0..ds {
                    for w in 0..dw {
                        out.set([w, s, e, n], self.get([n, e, s, w]));
                    }
                }
            }
        }
        out
    }
}

/// Enumerate the free legs (b, c) of a delta node (a, b, c) with dimensions
/// `dims`, given the bound first leg `a`.
///
/// A combination is kept when all non-dummy indices agree; dummy legs
/// (dimension 1) are unconstrained.
fn delta_free_legs(a: usize, dims: [usize; 3]) -> impl Iterator<Item = (usize, usize)> {
    let [da, db, dc] = dims;
    (0..db)
        .flat_map(move |b| (0..dc).map(move |c| (b, c)))
        .filter(move |&(b, c)| {
            let mut fixed: Option<usize> = None;
            for (v, d) in [(a, da), (b, db), (c, dc)] {
                if d > 1 {
                    match fixed {
                        None => fixed = Some(v),
                        Some(f) if f == v => {}
                        Some(_) => return false,
                    }
                }
            }
            true
        })
}

/// Absorb four delta nodes into a qubit node and regroup the legs.
///
/// Delta shapes are (q-leg, side, forward): n:(n,I,j), e:(e,J,k), s:(s,K,l),
/// w:(w,L,i). The combined node regroups neighbouring delta legs as
/// nesw → (iI)(jJ)(Kk)(Ll), giving leg sizes
/// (w₂·n₁, n₂·e₁, e₂·s₁, s₂·w₁).
pub fn absorb_deltas(
    q: &Tensor4,
    n: [usize; 3],
    e: [usize; 3],
    s: [usize; 3],
    w: [usize; 3],
) -> Tensor4 {
    debug_assert_eq!(q.shape(), [n[0], e[0], s[0], w[0]]);
    let mut out = Tensor4::zeros([w[2] * n[1], n[2] * e[1], e[2] * s[1], s[2] * w[1]]);
    let [dn, de, ds, dw] = q.shape();
    for ln in 0..dn {
        for le in 0..de {
            for ls in 0..ds {
                for lw in 0..dw {
                    let value = q.get([ln, le, ls, lw]);
                    if value == 0.0 {
                        continue;
                    }
                    for (cap_i, j) in delta_free_legs(ln, n) {
                        for (cap_j, k) in delta_free_legs(le, e) {
                            for (cap_k, l) in delta_free_legs(ls, s) {
                                for (cap_l, i) in delta_free_legs(lw, w) {
                                    out.add(
                                        [
                                            i * n[1] + cap_i,
                                            j * e[1] + cap_j,
                                            cap_k * e[2] + k,
                                            cap_l * s[2] + l,
                                        ],
                                        value,
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    out
}
