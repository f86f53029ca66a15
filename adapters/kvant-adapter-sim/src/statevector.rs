//! Statevector simulation engine.
//!
//! Amplitude `i` belongs to the basis state whose bit `q` is the value of
//! qubit `q`. Gates are applied in place by gathering the `2^k` amplitudes a
//! `k`-qubit gate mixes, multiplying by the gate matrix and scattering the
//! result back, so a gate costs `O(2^n · 2^k)` rather than `O(4^n)`.

use num_complex::Complex64;

use kvant_ir::{GateMatrix, QubitId, StandardGate};

/// Probabilities below this are treated as exactly zero.
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// A dense statevector over `n` qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes, `2^n`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Amplitudes in basis-index order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume the statevector, returning its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Born-rule probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Sum of squared magnitudes; 1 for a normalized state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Probability that measuring `qubit` yields `1`.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Label of basis state `index`, highest qubit leftmost.
    pub fn basis_label(&self, index: usize) -> String {
        format!("{:0width$b}", index, width = self.num_qubits.max(1))
    }

    /// Apply a catalog gate to `targets` (first target is the local MSB).
    pub fn apply_gate(&mut self, gate: &StandardGate, targets: &[QubitId]) {
        let targets: Vec<usize> = targets.iter().map(|q| q.index()).collect();
        match gate {
            StandardGate::X => self.apply_x(targets[0]),
            _ => self.apply_matrix(&gate.matrix(), &targets),
        }
    }

    /// Apply a `2^k × 2^k` matrix to the `k` qubits in `targets`.
    pub fn apply_matrix(&mut self, matrix: &GateMatrix, targets: &[usize]) {
        let k = targets.len();
        let local_dim = 1usize << k;
        debug_assert_eq!(matrix.dim(), (local_dim, local_dim));

        // offsets[j]: full-space bits set by local index j
        let offsets: Vec<usize> = (0..local_dim)
            .map(|j| {
                targets
                    .iter()
                    .enumerate()
                    .filter(|(t, _)| (j >> (k - 1 - t)) & 1 == 1)
                    .fold(0, |acc, (_, &q)| acc | (1 << q))
            })
            .collect();
        let target_mask = offsets[local_dim - 1];

        let mut gathered = vec![Complex64::new(0.0, 0.0); local_dim];
        for base in 0..self.amplitudes.len() {
            if base & target_mask != 0 {
                continue;
            }
            for (slot, &offset) in gathered.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | offset];
            }
            for (row, &offset) in offsets.iter().enumerate() {
                self.amplitudes[base | offset] = gathered
                    .iter()
                    .enumerate()
                    .map(|(col, amp)| matrix[[row, col]] * amp)
                    .sum();
            }
        }
    }

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    /// Project `qubit` onto `outcome` and renormalize.
    ///
    /// Returns the probability the outcome had before collapse. When that
    /// probability is zero the state is left untouched.
    pub fn collapse(&mut self, qubit: usize, outcome: bool) -> f64 {
        let p_one = self.probability_one(qubit);
        let p = if outcome { p_one } else { self.norm_sqr() - p_one };
        if p <= PROBABILITY_EPSILON {
            return 0.0;
        }

        let mask = 1 << qubit;
        let scale = 1.0 / p.sqrt();
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if ((i & mask) != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        p
    }

    /// Flip `qubit` (used to finish a reset after collapse to `|1⟩`).
    pub fn flip(&mut self, qubit: usize) {
        self.apply_x(qubit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvant_ir::matrix;
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], c(1.0, 0.0)));
        assert!(sv.amplitudes[1..].iter().all(|&a| approx_eq(a, c(0.0, 0.0))));
        assert_eq!(sv.dim(), 4);
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, &[QubitId(0)]);
        assert!(approx_eq(sv.amplitudes[0], c(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], c(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[QubitId(0)]);
        sv.apply_gate(&StandardGate::CX, &[QubitId(0), QubitId(1)]);

        assert!(approx_eq(sv.amplitudes[0b00], c(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(sv.amplitudes[0b01], c(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[0b10], c(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[0b11], c(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_control_order_respected() {
        // control on qubit 1, which is |0⟩: nothing happens
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, &[QubitId(0)]);
        sv.apply_gate(&StandardGate::CX, &[QubitId(1), QubitId(0)]);
        assert!(approx_eq(sv.amplitudes[0b01], c(1.0, 0.0)));

        sv.apply_gate(&StandardGate::CX, &[QubitId(0), QubitId(1)]);
        assert!(approx_eq(sv.amplitudes[0b11], c(1.0, 0.0)));
    }

    #[test]
    fn test_cswap_moves_excitation() {
        // control q0 = 1, q1 = 1, q2 = 0 → swap q1/q2
        let mut sv = Statevector::new(3);
        sv.apply_gate(&StandardGate::X, &[QubitId(0)]);
        sv.apply_gate(&StandardGate::X, &[QubitId(1)]);
        sv.apply_gate(&StandardGate::CSwap, &[QubitId(0), QubitId(1), QubitId(2)]);
        assert!(approx_eq(sv.amplitudes[0b101], c(1.0, 0.0)));
    }

    #[test]
    fn test_rz_phases() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, &[QubitId(0)]);
        sv.apply_gate(&StandardGate::Rz(PI / 2.0), &[QubitId(0)]);
        let phase = (-PI / 4.0_f64).cos();
        assert!(approx_eq(sv.amplitudes[0], c(FRAC_1_SQRT_2 * phase, -FRAC_1_SQRT_2 * phase)));
        assert!(approx_eq(sv.amplitudes[1], c(FRAC_1_SQRT_2 * phase, FRAC_1_SQRT_2 * phase)));
    }

    #[test]
    fn test_kernel_matches_full_expansion() {
        let targets = [QubitId(2), QubitId(0), QubitId(1)];
        let mut sv = Statevector::new(3);
        for q in 0..3 {
            sv.apply_gate(&StandardGate::H, &[QubitId(q)]);
        }
        sv.apply_gate(&StandardGate::Rz(0.3), &[QubitId(1)]);
        let before = ndarray::Array1::from(sv.amplitudes.clone());

        sv.apply_gate(&StandardGate::CSwap, &targets);
        let full = matrix::expand_to_full(&StandardGate::CSwap.matrix(), &targets, 3);
        let expected = full.dot(&before);
        for (a, b) in sv.amplitudes.iter().zip(expected.iter()) {
            assert!(approx_eq(*a, *b));
        }
    }

    #[test]
    fn test_collapse() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[QubitId(0)]);
        sv.apply_gate(&StandardGate::CX, &[QubitId(0), QubitId(1)]);

        let p = sv.collapse(0, true);
        assert!((p - 0.5).abs() < 1e-12);
        assert!(approx_eq(sv.amplitudes[0b11], c(1.0, 0.0)));
        assert!((sv.norm_sqr() - 1.0).abs() < 1e-12);

        // impossible outcome leaves the state alone
        assert_eq!(sv.collapse(1, false), 0.0);
        assert!(approx_eq(sv.amplitudes[0b11], c(1.0, 0.0)));
    }

    #[test]
    fn test_basis_label() {
        let sv = Statevector::new(3);
        assert_eq!(sv.basis_label(0b011), "011");
        assert_eq!(Statevector::new(0).basis_label(0), "0");
    }
}
