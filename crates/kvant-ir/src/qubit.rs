//! Bit identifiers.
//!
//! Qubits and classical bits are numbered in separate flat spaces. A qubit's
//! id is also its bit position in a statevector index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat qubit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Flat classical bit index; position in the shot's classical store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl ClbitId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// An allocated bit and, if it came from a named register, its place there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bit<I> {
    pub id: I,
    /// `(register name, offset)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register: Option<(String, u32)>,
}

/// An allocated qubit.
pub type Qubit = Bit<QubitId>;

/// An allocated classical bit.
pub type Clbit = Bit<ClbitId>;

impl<I> Bit<I> {
    /// A bit outside any named register.
    pub fn new(id: I) -> Self {
        Self { id, register: None }
    }

    /// Bit `offset` of register `register`.
    pub fn with_register(id: I, register: impl Into<String>, offset: u32) -> Self {
        Self {
            id,
            register: Some((register.into(), offset)),
        }
    }
}

impl<I: fmt::Display> fmt::Display for Bit<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.register {
            Some((name, offset)) => write!(f, "{name}[{offset}]"),
            None => self.id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_display() {
        assert_eq!(Qubit::new(QubitId(0)).to_string(), "q0");
        assert_eq!(Qubit::with_register(QubitId(3), "ancilla", 0).to_string(), "ancilla[0]");
        assert_eq!(Clbit::new(ClbitId(2)).to_string(), "c2");
        assert_eq!(Clbit::with_register(ClbitId(1), "c_sender", 0).to_string(), "c_sender[0]");
    }

    #[test]
    fn test_index_conversion() {
        assert_eq!(QubitId(7).index(), 7);
        assert_eq!(ClbitId(4).index(), 4);
    }
}
