//! Local tensor factory for the decoding network.
//!
//! Each qubit site becomes one rank-4 node whose entries are error
//! probabilities: a node leg is a bond to a shared stabilizer, and setting a
//! leg to 1 multiplies the site operator by that stabilizer's corner Pauli.
//! Summing the closed network over all leg assignments therefore accumulates
//! the probability of an entire stabilizer coset at once.
//!
//! Sites split into H-nodes and V-nodes by the parity of (x − y), matching
//! the lattice flavors: H-nodes bond to Z-pattern plaquettes over their NE/SW
//! legs, V-nodes over their NW/SE legs. Absorbing a delta node into each leg
//! and regrouping turns the diagonal bonds into a square grid the MPS sweep
//! can contract.
//!
//! Boundary sites use reduced shapes from a fixed table (H/V × column parity
//! × compass direction); the table is checked for internal consistency when
//! the factory is built.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::lattice::RotatedXzLattice;
use crate::mps::TensorNetwork;
use crate::pauli::{Pauli, PauliFrame};
use crate::tensor::{absorb_deltas, Tensor4};

/// Shape-table and factory failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// A V-node cannot sit in the SW corner: (0, 0) has even (x − y).
    #[error("v-node in SW corner of lattice")]
    VNodeSouthWest,
    /// A table entry whose delta legs disagree with the q-node legs.
    #[error("inconsistent shape table entry ({h_node:?}, even_column={even_column}, {compass:?})")]
    InconsistentShapes {
        h_node: bool,
        even_column: bool,
        compass: Compass,
    },
}

/// Position of a site relative to the lattice boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compass {
    Bulk,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl Compass {
    /// Classify site (x, y) on a lattice with the given site bounds.
    pub fn of_site((x, y): (i32, i32), (max_x, max_y): (i32, i32)) -> Compass {
        match (x == 0, x == max_x, y == 0, y == max_y) {
            (true, _, true, _) => Compass::Sw,
            (true, _, _, true) => Compass::Nw,
            (_, true, true, _) => Compass::Se,
            (_, true, _, true) => Compass::Ne,
            (true, ..) => Compass::W,
            (_, true, ..) => Compass::E,
            (_, _, true, _) => Compass::S,
            (_, _, _, true) => Compass::N,
            _ => Compass::Bulk,
        }
    }

    const ALL: [Compass; 9] = [
        Compass::Bulk,
        Compass::N,
        Compass::Ne,
        Compass::E,
        Compass::Se,
        Compass::S,
        Compass::Sw,
        Compass::W,
        Compass::Nw,
    ];
}

/// Leg shapes for one site: the q-node plus its four delta nodes.
///
/// Delta shapes are (q-leg, side, forward) per `absorb_deltas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeShapes {
    q: [usize; 4],
    n: [usize; 3],
    e: [usize; 3],
    s: [usize; 3],
    w: [usize; 3],
}

impl NodeShapes {
    /// Shape of the combined node after delta absorption.
    fn combined(&self) -> [usize; 4] {
        [
            self.w[2] * self.n[1],
            self.n[2] * self.e[1],
            self.e[2] * self.s[1],
            self.s[2] * self.w[1],
        ]
    }
}

/// The boundary shape table.
///
/// Bulk nodes share a base by column parity; boundary entries override the
/// legs that face the boundary. The entries encode which neighbouring
/// stabilizers exist and how their bonds regroup, so they are data, not
/// derivable from the q-node alone.
fn node_shapes(h_node: bool, even_column: bool, compass: Compass) -> Result<NodeShapes, NetworkError> {
    let mut shapes = if even_column {
        NodeShapes {
            q: [2, 2, 2, 2],
            n: [2, 2, 2],
            e: [2, 1, 2],
            s: [2, 2, 2],
            w: [2, 1, 2],
        }
    } else {
        NodeShapes {
            q: [2, 2, 2, 2],
            n: [2, 2, 1],
            e: [2, 2, 2],
            s: [2, 2, 1],
            w: [2, 2, 2],
        }
    };
    if h_node {
        match compass {
            Compass::Bulk => {}
            Compass::N => {
                shapes.q = [2, 2, 2, 1];
                shapes.n = [2, 1, 2];
                shapes.w = [1, 1, 1];
            }
            Compass::Ne => {
                shapes.q = [1, 2, 2, 1];
                shapes.n = [1, 1, 1];
                shapes.e = [2, 1, 2];
                shapes.w = [1, 1, 1];
            }
            Compass::E => {
                shapes.q = [1, 2, 2, 2];
                shapes.n = [1, 1, 1];
                shapes.e = [2, 1, 2];
            }
            Compass::Se => {
                shapes.q = [1, 1, 2, 2];
                shapes.n = [1, 1, 1];
                shapes.e = [1, 1, 1];
                shapes.s = [2, 1, 2];
            }
            Compass::S => {
                shapes.q = [2, 1, 2, 2];
                shapes.e = [1, 1, 1];
                shapes.s = [2, 1, 2];
            }
            Compass::Sw => {
                shapes.q = [2, 1, 1, 2];
                shapes.e = [1, 1, 1];
                shapes.s = [1, 1, 1];
                shapes.w = [2, 1, 2];
            }
            Compass::W => {
                shapes.q = [2, 2, 1, 2];
                shapes.s = [1, 1, 1];
                shapes.w = [2, 1, 2];
            }
            Compass::Nw => {
                shapes.q = [2, 2, 1, 1];
                shapes.n = [2, 1, 2];
                shapes.s = [1, 1, 1];
                shapes.w = [1, 1, 1];
            }
        }
    } else {
        match compass {
            Compass::Bulk => {}
            Compass::N => {
                shapes.q = [1, 2, 2, 2];
                shapes.n = [1, 1, 1];
                shapes.w = [2, 2, 1];
            }
            Compass::Ne => {
                shapes.q = [1, 1, 2, 2];
                shapes.n = [1, 1, 1];
                shapes.e = [1, 1, 1];
                shapes.w = [2, 2, 1];
            }
            Compass::E => {
                shapes.q = [2, 1, 2, 2];
                shapes.n = [2, 2, 1];
                shapes.e = [1, 1, 1];
            }
            Compass::Se => {
                shapes.q = [2, 1, 1, 2];
                shapes.n = [2, 2, 1];
                shapes.e = [1, 1, 1];
                shapes.s = [1, 1, 1];
            }
            Compass::S => {
                shapes.q = [2, 2, 1, 2];
                shapes.e = [2, 2, 1];
                shapes.s = [1, 1, 1];
            }
            Compass::Sw => return Err(NetworkError::VNodeSouthWest),
            Compass::W => {
                shapes.q = [2, 2, 2, 1];
                shapes.s = [2, 2, 1];
                shapes.w = [1, 1, 1];
            }
            Compass::Nw => {
                shapes.q = [1, 2, 2, 1];
                shapes.n = [1, 1, 1];
                shapes.s = [2, 2, 1];
                shapes.w = [1, 1, 1];
            }
        }
    }
    Ok(shapes)
}

/// Per-leg node values: which Pauli each leg multiplies onto the site.
pub trait NodeValueStrategy {
    /// Tensor entry for a site carrying Pauli `f` with the given leg bits.
    fn node_value(
        &self,
        dist: &[f64; 4],
        f: Pauli,
        h_node: bool,
        even_column: bool,
        legs: [usize; 4],
    ) -> f64;
}

/// Leg roles for the alternating XZ pattern.
///
/// On H-nodes in even columns the vertical legs (n, s) carry Z and the
/// horizontal legs (e, w) carry X; odd columns swap the roles. V-node legs
/// are the H-node legs rotated one step: value(n, e, s, w) = h(e, s, w, n).
#[derive(Debug, Clone, Copy, Default)]
pub struct XzAlternating;

impl NodeValueStrategy for XzAlternating {
    fn node_value(
        &self,
        dist: &[f64; 4],
        f: Pauli,
        h_node: bool,
        even_column: bool,
        legs: [usize; 4],
    ) -> f64 {
        let [n, e, s, w] = legs;
        let (n, e, s, w) = if h_node { (n, e, s, w) } else { (e, s, w, n) };
        let (vertical, horizontal) = if even_column {
            (Pauli::Z, Pauli::X)
        } else {
            (Pauli::X, Pauli::Z)
        };
        let mut op = f;
        if n == 1 {
            op = op.mul(vertical);
        }
        if e == 1 {
            op = op.mul(horizontal);
        }
        if s == 1 {
            op = op.mul(vertical);
        }
        if w == 1 {
            op = op.mul(horizontal);
        }
        dist[op.dist_index()]
    }
}

/// Cache key: a node is determined by the distribution, site operator and
/// site class. Probabilities are keyed by their exact bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeKey {
    dist_bits: [u64; 4],
    f: Pauli,
    h_node: bool,
    even_column: bool,
    compass: Compass,
}

/// Memoizing factory for combined network nodes.
///
/// The cache is bounded: once full, fresh nodes are computed but not stored.
/// Node construction is a pure function of the key, so a racing recompute
/// returns identical data.
pub struct NodeFactory<V: NodeValueStrategy> {
    strategy: V,
    cache: RwLock<HashMap<NodeKey, Tensor4>>,
    capacity: usize,
}

impl<V: NodeValueStrategy> NodeFactory<V> {
    /// Default cache capacity, enough for every site class of one
    /// distribution times the four coset operators.
    pub const DEFAULT_CACHE_CAPACITY: usize = 256;

    /// Build a factory, validating the whole shape table up front.
    pub fn new(strategy: V) -> Result<Self, NetworkError> {
        Self::with_cache_capacity(strategy, Self::DEFAULT_CACHE_CAPACITY)
    }

    /// Build a factory with an explicit cache bound.
    pub fn with_cache_capacity(strategy: V, capacity: usize) -> Result<Self, NetworkError> {
        validate_shape_table()?;
        Ok(Self {
            strategy,
            cache: RwLock::new(HashMap::new()),
            capacity,
        })
    }

    /// The combined node for one site class.
    pub fn create_node(
        &self,
        dist: &[f64; 4],
        f: Pauli,
        h_node: bool,
        even_column: bool,
        compass: Compass,
    ) -> Result<Tensor4, NetworkError> {
        let key = NodeKey {
            dist_bits: dist.map(f64::to_bits),
            f,
            h_node,
            even_column,
            compass,
        };
        if let Ok(cache) = self.cache.read() {
            if let Some(node) = cache.get(&key) {
                return Ok(node.clone());
            }
        }
        let node = self.build_node(dist, f, h_node, even_column, compass)?;
        if let Ok(mut cache) = self.cache.write() {
            if cache.len() < self.capacity {
                cache.insert(key, node.clone());
            }
        }
        Ok(node)
    }

    fn build_node(
        &self,
        dist: &[f64; 4],
        f: Pauli,
        h_node: bool,
        even_column: bool,
        compass: Compass,
    ) -> Result<Tensor4, NetworkError> {
        let shapes = node_shapes(h_node, even_column, compass)?;
        let [dn, de, ds, dw] = shapes.q;
        let mut q = Tensor4::zeros(shapes.q);
        for n in 0..dn {
            for e in 0..de {
                for s in 0..ds {
                    for w in 0..dw {
                        let value =
                            self.strategy
                                .node_value(dist, f, h_node, even_column, [n, e, s, w]);
                        q.set([n, e, s, w], value);
                    }
                }
            }
        }
        Ok(absorb_deltas(&q, shapes.n, shapes.e, shapes.s, shapes.w))
    }

    /// Build the full network for a sample operator.
    ///
    /// Grid row 0 is the top lattice row (y = d − 1); grid column c is
    /// lattice column x = c.
    pub fn create_network(
        &self,
        lattice: &RotatedXzLattice,
        dist: &[f64; 4],
        sample: &PauliFrame,
    ) -> Result<TensorNetwork, NetworkError> {
        let d = lattice.distance();
        let bounds = lattice.site_bounds();
        let mut rows = Vec::with_capacity(d as usize);
        for y in (0..d).rev() {
            let mut row = Vec::with_capacity(d as usize);
            for x in 0..d {
                let f = sample.operator((x, y));
                let h_node = (x - y).rem_euclid(2) == 0;
                let even_column = x % 2 == 0;
                let compass = Compass::of_site((x, y), bounds);
                row.push(self.create_node(dist, f, h_node, even_column, compass)?);
            }
            rows.push(row);
        }
        Ok(TensorNetwork::new(rows))
    }

    /// Number of cached nodes.
    pub fn cache_len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

/// Check every shape-table entry: each delta's first leg must match the
/// corresponding q-node leg, and the one impossible class must stay
/// rejected.
fn validate_shape_table() -> Result<(), NetworkError> {
    for &h_node in &[true, false] {
        for &even_column in &[true, false] {
            for &compass in &Compass::ALL {
                if !h_node && compass == Compass::Sw {
                    match node_shapes(h_node, even_column, compass) {
                        Err(NetworkError::VNodeSouthWest) => continue,
                        _ => {
                            return Err(NetworkError::InconsistentShapes {
                                h_node,
                                even_column,
                                compass,
                            })
                        }
                    }
                }
                let shapes = node_shapes(h_node, even_column, compass)?;
                let deltas = [shapes.n, shapes.e, shapes.s, shapes.w];
                let consistent = shapes
                    .q
                    .iter()
                    .zip(&deltas)
                    .all(|(&q_leg, delta)| q_leg == delta[0])
                    && shapes.combined().iter().all(|&dim| dim > 0);
                if !consistent {
                    return Err(NetworkError::InconsistentShapes {
                        h_node,
                        even_column,
                        compass,
                    });
                }
            }
        }
    }
    Ok(())
}
