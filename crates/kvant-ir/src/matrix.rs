//! Dense complex matrices for the gate catalog.
//!
//! Matrices are indexed in the gate's local basis: for a gate applied to
//! targets `[t0, t1, ..]`, the first listed target is the most significant bit
//! of the local row/column index. In the full register space qubit `q` is bit
//! `q` of a basis-state index (qubit 0 is least significant).

use ndarray::Array2;
use num_complex::Complex64;

use crate::qubit::QubitId;

/// Square complex matrix of dimension `2^k` for a `k`-qubit gate.
pub type GateMatrix = Array2<Complex64>;

pub(crate) const ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub(crate) const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Identity matrix of the given dimension.
pub fn identity(dim: usize) -> GateMatrix {
    Array2::from_shape_fn((dim, dim), |(r, c)| if r == c { ONE } else { ZERO })
}

/// Diagonal matrix from its diagonal entries.
pub fn diagonal(entries: &[Complex64]) -> GateMatrix {
    let dim = entries.len();
    Array2::from_shape_fn((dim, dim), |(r, c)| if r == c { entries[r] } else { ZERO })
}

/// Permutation matrix mapping basis state `c` to `perm(c)`.
pub fn permutation(dim: usize, perm: impl Fn(usize) -> usize) -> GateMatrix {
    let mut m = Array2::from_elem((dim, dim), ZERO);
    for c in 0..dim {
        m[[perm(c), c]] = ONE;
    }
    m
}

/// Kronecker product `a ⊗ b`; `a` occupies the more significant bits.
pub fn kron(a: &GateMatrix, b: &GateMatrix) -> GateMatrix {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    Array2::from_shape_fn((ar * br, ac * bc), |(r, c)| {
        a[[r / br, c / bc]] * b[[r % br, c % bc]]
    })
}

/// Conjugate transpose.
pub fn dagger(m: &GateMatrix) -> GateMatrix {
    m.t().mapv(|z| z.conj())
}

/// Check `m† · m = I` entry-wise within `tol`.
pub fn is_unitary(m: &GateMatrix, tol: f64) -> bool {
    let (rows, cols) = m.dim();
    if rows != cols {
        return false;
    }
    let product = dagger(m).dot(m);
    let id = identity(rows);
    product
        .iter()
        .zip(id.iter())
        .all(|(a, b)| (a - b).norm() <= tol)
}

/// Local gate-basis index of a full-space basis index.
#[inline]
pub fn local_index(full: usize, targets: &[usize]) -> usize {
    let k = targets.len();
    targets
        .iter()
        .enumerate()
        .fold(0, |acc, (j, &q)| acc | (((full >> q) & 1) << (k - 1 - j)))
}

/// Extend a `k`-qubit gate matrix to the full `num_qubits` space.
///
/// This is the Kronecker product of `matrix` with identities on every
/// non-target qubit, with the tensor factors permuted so that `targets[0]`
/// lands on the gate's most significant local bit. The result has dimension
/// `2^num_qubits`, so this is only practical for small registers; the
/// simulator applies gates through [`local_index`] without materializing it.
pub fn expand_to_full(matrix: &GateMatrix, targets: &[QubitId], num_qubits: usize) -> GateMatrix {
    let targets: Vec<usize> = targets.iter().map(|q| q.index()).collect();
    let target_mask = targets.iter().fold(0usize, |m, &q| m | (1 << q));
    let dim = 1usize << num_qubits;

    Array2::from_shape_fn((dim, dim), |(r, c)| {
        if r & !target_mask == c & !target_mask {
            matrix[[local_index(r, &targets), local_index(c, &targets)]]
        } else {
            ZERO
        }
    })
}
