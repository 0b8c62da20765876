//! Chi-truncated MPS contraction of a 2D tensor-network grid.
//!
//! The grid holds one rank-4 (n, e, s, w) node per qubit; boundary legs have
//! dimension 1. Contraction sweeps column by column: the leftmost column is
//! an MPS whose bonds are the vertical links, each later column is absorbed
//! as an MPO, and after every absorption the MPS is canonicalized and its
//! bonds truncated to χ via SVD. Row-by-row contraction transposes the grid
//! across its main diagonal and reuses the same sweep.
//!
//! Truncation is bounded-accuracy approximation, never an error: χ = `None`
//! contracts exactly (exponential in lattice size), larger χ approaches the
//! exact value. A running log-scale factor keeps intermediate values inside
//! f64 range.

use nalgebra::DMatrix;

use crate::tensor::Tensor4;

/// A rectangular grid of rank-4 nodes; row 0 is the top of the lattice.
#[derive(Debug, Clone)]
pub struct TensorNetwork {
    nodes: Vec<Vec<Tensor4>>,
}

impl TensorNetwork {
    /// Wrap a rectangular node grid.
    pub fn new(nodes: Vec<Vec<Tensor4>>) -> Self {
        debug_assert!(!nodes.is_empty());
        debug_assert!(nodes.iter().all(|row| row.len() == nodes[0].len()));
        Self { nodes }
    }

    /// Number of grid rows.
    pub fn rows(&self) -> usize {
        self.nodes.len()
    }

    /// Number of grid columns.
    pub fn cols(&self) -> usize {
        self.nodes[0].len()
    }

    /// The node at (row, col).
    pub fn node(&self, row: usize, col: usize) -> &Tensor4 {
        &self.nodes[row][col]
    }

    /// Transpose the grid across its main diagonal.
    ///
    /// Node (r, c) moves to (c, r) with legs reversed (n↔w, e↔s), so a
    /// column sweep of the transpose is a row sweep of the original.
    pub fn transpose(&self) -> TensorNetwork {
        let rows = self.rows();
        let cols = self.cols();
        let nodes = (0..cols)
            .map(|c| (0..rows).map(|r| self.nodes[r][c].reverse_axes()).collect())
            .collect();
        TensorNetwork::new(nodes)
    }

    /// Check internal bond-dimension consistency (debug aid for builders).
    pub fn is_consistent(&self) -> bool {
        let rows = self.rows();
        let cols = self.cols();
        for r in 0..rows {
            for c in 0..cols {
                let [n, e, s, w] = self.nodes[r][c].shape();
                if r == 0 && n != 1 || r == rows - 1 && s != 1 {
                    return false;
                }
                if c == 0 && w != 1 || c == cols - 1 && e != 1 {
                    return false;
                }
                if r + 1 < rows && s != self.nodes[r + 1][c].shape()[0] {
                    return false;
                }
                if c + 1 < cols && e != self.nodes[r][c + 1].shape()[3] {
                    return false;
                }
            }
        }
        true
    }
}

/// MPS site tensor with legs (up bond, physical, down bond).
#[derive(Debug, Clone)]
struct Tensor3 {
    du: usize,
    dp: usize,
    dd: usize,
    data: Vec<f64>,
}

impl Tensor3 {
    fn zeros(du: usize, dp: usize, dd: usize) -> Self {
        Self {
            du,
            dp,
            dd,
            data: vec![0.0; du * dp * dd],
        }
    }

    fn get(&self, u: usize, p: usize, d: usize) -> f64 {
        self.data[(u * self.dp + p) * self.dd + d]
    }

    fn set(&mut self, u: usize, p: usize, d: usize, value: f64) {
        self.data[(u * self.dp + p) * self.dd + d] = value;
    }

    fn add(&mut self, u: usize, p: usize, d: usize, value: f64) {
        self.data[(u * self.dp + p) * self.dd + d] += value;
    }

    fn frobenius_norm(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }
}

/// Contract the network to a scalar.
///
/// `chi` bounds the MPS bond dimension (`None` = exact contraction); `tol`
/// additionally discards singular values ≤ tol·s₀ during truncation.
pub fn contract(tn: &TensorNetwork, chi: Option<usize>, tol: Option<f64>) -> f64 {
    debug_assert!(tn.is_consistent());
    let rows = tn.rows();
    let cols = tn.cols();

    // Column 0 as an MPS: west legs are dimension 1, east is physical.
    let mut mps: Vec<Tensor3> = (0..rows)
        .map(|r| {
            let node = tn.node(r, 0);
            let [dn, de, ds, _] = node.shape();
            let mut t = Tensor3::zeros(dn, de, ds);
            for n in 0..dn {
                for e in 0..de {
                    for s in 0..ds {
                        t.set(n, e, s, node.get([n, e, s, 0]));
                    }
                }
            }
            t
        })
        .collect();

    let truncating = chi.is_some() || tol.is_some();
    let mut log_scale = 0.0f64;
    if !renormalize(&mut mps, &mut log_scale) {
        return 0.0;
    }

    for c in 1..cols {
        apply_column(&mut mps, tn, c);
        if truncating {
            compress(&mut mps, chi, tol);
        }
        if !renormalize(&mut mps, &mut log_scale) {
            return 0.0;
        }
    }

    // All physical legs are now dimension 1; collapse the bond chain.
    let mut v = vec![1.0f64];
    for t in &mps {
        debug_assert_eq!(t.dp, 1);
        debug_assert_eq!(t.du, v.len());
        let mut next = vec![0.0f64; t.dd];
        for (u, &vu) in v.iter().enumerate() {
            for (d, slot) in next.iter_mut().enumerate() {
                *slot += vu * t.get(u, 0, d);
            }
        }
        v = next;
    }
    debug_assert_eq!(v.len(), 1);
    v[0] * log_scale.exp()
}

/// Absorb column `c` of the grid into the MPS as an MPO.
fn apply_column(mps: &mut [Tensor3], tn: &TensorNetwork, c: usize) {
    for (r, site) in mps.iter_mut().enumerate() {
        let node = tn.node(r, c);
        let [dn, de, ds, dw] = node.shape();
        debug_assert_eq!(site.dp, dw);
        let mut out = Tensor3::zeros(site.du * dn, de, site.dd * ds);
        for u in 0..site.du {
            for d in 0..site.dd {
                for w in 0..dw {
                    let left = site.get(u, w, d);
                    if left == 0.0 {
                        continue;
                    }
                    for n in 0..dn {
                        for e in 0..de {
                            for s in 0..ds {
                                out.add(u * dn + n, e, d * ds + s, left * node.get([n, e, s, w]));
                            }
                        }
                    }
                }
            }
        }
        *site = out;
    }
}

/// Rescale every site to unit Frobenius norm, accumulating the scale.
///
/// Returns false when a site is exactly zero, in which case the whole
/// contraction is zero.
fn renormalize(mps: &mut [Tensor3], log_scale: &mut f64) -> bool {
    for t in mps.iter_mut() {
        let norm = t.frobenius_norm();
        if norm == 0.0 {
            return false;
        }
        t.scale(1.0 / norm);
        *log_scale += norm.ln();
    }
    true
}

/// Pick the kept rank under χ and the relative tolerance.
fn kept_rank(sv: &[f64], chi: Option<usize>, tol: Option<f64>) -> usize {
    let mut k = sv.len();
    if let Some(t) = tol {
        let s0 = sv[0];
        k = sv.iter().take_while(|&&s| s > t * s0).count();
    }
    if let Some(c) = chi {
        k = k.min(c);
    }
    k.max(1)
}

/// Two-pass compression: left-canonicalize top-down, then truncate
/// bottom-up so each cut is locally optimal.
fn compress(mps: &mut Vec<Tensor3>, chi: Option<usize>, tol: Option<f64>) {
    let len = mps.len();
    if len < 2 {
        return;
    }

    // Top-down canonicalization (no truncation).
    for i in 0..len - 1 {
        let t = &mps[i];
        let m = DMatrix::from_row_iterator(t.du * t.dp, t.dd, t.data.iter().copied());
        let svd = m.svd(true, true);
        let u = svd.u.unwrap();
        let vt = svd.v_t.unwrap();
        let rank = svd.singular_values.len();

        let mut canon = Tensor3::zeros(t.du, t.dp, rank);
        for uu in 0..t.du {
            for p in 0..t.dp {
                for k in 0..rank {
                    canon.set(uu, p, k, u[(uu * t.dp + p, k)]);
                }
            }
        }
        // Carry S·Vᵀ into the next site.
        let next = &mps[i + 1];
        let mut carried = Tensor3::zeros(rank, next.dp, next.dd);
        for k in 0..rank {
            let s = svd.singular_values[k];
            for b in 0..next.du {
                let factor = s * vt[(k, b)];
                if factor == 0.0 {
                    continue;
                }
                for p in 0..next.dp {
                    for d in 0..next.dd {
                        carried.add(k, p, d, factor * next.get(b, p, d));
                    }
                }
            }
        }
        mps[i] = canon;
        mps[i + 1] = carried;
    }

    // Bottom-up truncation.
    for i in (1..len).rev() {
        let t = &mps[i];
        let m = DMatrix::from_row_iterator(t.du, t.dp * t.dd, t.data.iter().copied());
        let svd = m.svd(true, true);
        let u = svd.u.unwrap();
        let vt = svd.v_t.unwrap();
        let keep = kept_rank(svd.singular_values.as_slice(), chi, tol);

        let mut trimmed = Tensor3::zeros(keep, t.dp, t.dd);
        for k in 0..keep {
            for p in 0..t.dp {
                for d in 0..t.dd {
                    trimmed.set(k, p, d, vt[(k, p * t.dd + d)]);
                }
            }
        }
        // Carry U·S into the site above.
        let prev = &mps[i - 1];
        let mut carried = Tensor3::zeros(prev.du, prev.dp, keep);
        for b in 0..prev.dd {
            for k in 0..keep {
                let factor = u[(b, k)] * svd.singular_values[k];
                if factor == 0.0 {
                    continue;
                }
                for uu in 0..prev.du {
                    for p in 0..prev.dp {
                        carried.add(uu, p, k, factor * prev.get(uu, p, b));
                    }
                }
            }
        }
        mps[i] = trimmed;
        mps[i - 1] = carried;
    }
}
