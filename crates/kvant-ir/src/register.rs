//! Register allocation.
//!
//! Qubits and classical bits live in two independent flat index spaces. Every
//! allocation extends its space monotonically; indices are never reused within
//! one allocator, so an id handed out once stays valid for the lifetime of the
//! circuit that owns the allocator.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult, RegisterSpace};
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// Upper bound on the size of each flat index space.
pub const MAX_BITS: u32 = 1 << 16;

/// A named, contiguous slice of one index space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// Register name as written in circuit descriptions.
    pub name: String,
    /// First flat index covered by the register.
    pub start: u32,
    /// Number of bits in the register.
    pub size: u32,
}

impl Register {
    /// Flat index of the register's `offset`-th bit, if in range.
    pub fn flat_index(&self, offset: u32) -> Option<u32> {
        (offset < self.size).then(|| self.start + offset)
    }

    /// All flat indices of the register, in register order.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.start..self.start + self.size
    }
}

/// Maps register names onto flat qubit and classical-bit indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterAllocator {
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    qregs: Vec<Register>,
    cregs: Vec<Register>,
}

impl RegisterAllocator {
    /// Create an allocator with empty index spaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a requested register size coming from untyped input.
    pub fn checked_size(space: RegisterSpace, name: Option<&str>, requested: i64) -> IrResult<u32> {
        match u32::try_from(requested) {
            Ok(size) if size > 0 && size <= MAX_BITS => Ok(size),
            _ => Err(IrError::Allocation {
                space,
                name: name.map(str::to_owned),
                requested,
            }),
        }
    }

    /// First index of a `count`-bit block appended to a space holding `used`
    /// bits. The block must end within [`MAX_BITS`].
    fn reserve(space: RegisterSpace, name: Option<&str>, used: usize, count: u32) -> IrResult<u32> {
        Self::checked_size(space, name, i64::from(count))?;
        let start = u32::try_from(used).ok();
        match start.and_then(|s| s.checked_add(count)) {
            Some(end) if end <= MAX_BITS => Ok(end - count),
            _ => Err(IrError::Allocation {
                space,
                name: name.map(str::to_owned),
                requested: i64::from(count),
            }),
        }
    }

    /// Allocate `count` anonymous qubits.
    pub fn allocate_qubits(&mut self, count: u32) -> IrResult<Vec<QubitId>> {
        let start = Self::reserve(RegisterSpace::Quantum, None, self.qubits.len(), count)?;
        let ids: Vec<_> = (start..start + count).map(QubitId).collect();
        self.qubits.extend(ids.iter().copied().map(Qubit::new));
        Ok(ids)
    }

    /// Allocate `count` anonymous classical bits.
    pub fn allocate_clbits(&mut self, count: u32) -> IrResult<Vec<ClbitId>> {
        let start = Self::reserve(RegisterSpace::Classical, None, self.clbits.len(), count)?;
        let ids: Vec<_> = (start..start + count).map(ClbitId).collect();
        self.clbits.extend(ids.iter().copied().map(Clbit::new));
        Ok(ids)
    }

    /// Allocate a named quantum register.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        let start = Self::reserve(RegisterSpace::Quantum, Some(&name), self.qubits.len(), size)?;
        self.ensure_unique(&name)?;

        let ids: Vec<_> = (start..start + size).map(QubitId).collect();
        for (offset, id) in (0..size).zip(&ids) {
            self.qubits.push(Qubit::with_register(*id, &name, offset));
        }
        self.qregs.push(Register { name, start, size });
        Ok(ids)
    }

    /// Allocate a named classical register.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        let start = Self::reserve(RegisterSpace::Classical, Some(&name), self.clbits.len(), size)?;
        self.ensure_unique(&name)?;

        let ids: Vec<_> = (start..start + size).map(ClbitId).collect();
        for (offset, id) in (0..size).zip(&ids) {
            self.clbits.push(Clbit::with_register(*id, &name, offset));
        }
        self.cregs.push(Register { name, start, size });
        Ok(ids)
    }

    fn ensure_unique(&self, name: &str) -> IrResult<()> {
        if self.qreg(name).is_some() || self.creg(name).is_some() {
            return Err(IrError::DuplicateRegister(name.to_owned()));
        }
        Ok(())
    }

    /// Number of allocated qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Number of allocated classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// All allocated qubits in index order.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// All allocated classical bits in index order.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Declared quantum registers in declaration order.
    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    /// Declared classical registers in declaration order.
    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    /// Look up a quantum register by name.
    pub fn qreg(&self, name: &str) -> Option<&Register> {
        self.qregs.iter().find(|r| r.name == name)
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Whether `qubit` has been allocated.
    pub fn contains_qubit(&self, qubit: QubitId) -> bool {
        qubit.index() < self.qubits.len()
    }

    /// Whether `clbit` has been allocated.
    pub fn contains_clbit(&self, clbit: ClbitId) -> bool {
        clbit.index() < self.clbits.len()
    }

    /// Resolve a symbolic operand (`"q1[0]"`, `"ancilla"`) to qubit ids.
    ///
    /// A bare register name resolves to every qubit of the register.
    pub fn resolve_qubits(&self, operand: &str) -> Option<Vec<QubitId>> {
        resolve(&self.qregs, operand).map(|ids| ids.into_iter().map(QubitId).collect())
    }

    /// Resolve a symbolic operand (`"c[1]"`, `"c_sender"`) to classical bit ids.
    pub fn resolve_clbits(&self, operand: &str) -> Option<Vec<ClbitId>> {
        resolve(&self.cregs, operand).map(|ids| ids.into_iter().map(ClbitId).collect())
    }
}

/// Split `"name[3]"` into `("name", Some(3))` and `"name"` into `("name", None)`.
fn parse_operand(operand: &str) -> Option<(&str, Option<u32>)> {
    let operand = operand.trim();
    match operand.split_once('[') {
        Some((name, rest)) => {
            let offset = rest.strip_suffix(']')?.trim().parse().ok()?;
            Some((name.trim(), Some(offset)))
        }
        None => Some((operand, None)),
    }
}

fn resolve(registers: &[Register], operand: &str) -> Option<Vec<u32>> {
    let (name, offset) = parse_operand(operand)?;
    let register = registers.iter().find(|r| r.name == name)?;
    match offset {
        Some(offset) => register.flat_index(offset).map(|i| vec![i]),
        None => Some(register.indices().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_monotonic_across_registers() {
        let mut alloc = RegisterAllocator::new();
        let q1 = alloc.add_qreg("q1", 2).unwrap();
        let q2 = alloc.add_qreg("q2", 2).unwrap();
        let anc = alloc.allocate_qubits(1).unwrap();

        assert_eq!(q1, vec![QubitId(0), QubitId(1)]);
        assert_eq!(q2, vec![QubitId(2), QubitId(3)]);
        assert_eq!(anc, vec![QubitId(4)]);
        assert_eq!(alloc.num_qubits(), 5);
        assert_eq!(alloc.num_clbits(), 0);
    }

    #[test]
    fn test_classical_space_is_independent() {
        let mut alloc = RegisterAllocator::new();
        alloc.add_qreg("q", 3).unwrap();
        let c = alloc.add_creg("c", 2).unwrap();
        assert_eq!(c, vec![ClbitId(0), ClbitId(1)]);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut alloc = RegisterAllocator::new();
        assert!(matches!(
            alloc.allocate_qubits(0),
            Err(IrError::Allocation {
                space: RegisterSpace::Quantum,
                requested: 0,
                ..
            })
        ));
        assert!(alloc.add_creg("c", 0).unwrap_err().is_allocation());
        assert_eq!(alloc.num_qubits(), 0);
    }

    #[test]
    fn test_negative_size_is_rejected() {
        let err = RegisterAllocator::checked_size(RegisterSpace::Classical, Some("c"), -3)
            .unwrap_err();
        assert!(matches!(err, IrError::Allocation { requested: -3, .. }));
    }

    #[test]
    fn test_oversized_registers_leave_space_untouched() {
        let mut alloc = RegisterAllocator::new();
        alloc.add_qreg("a", 1).unwrap();
        assert!(alloc.add_qreg("b", u32::MAX).unwrap_err().is_allocation());
        assert!(alloc.add_qreg("b", MAX_BITS).unwrap_err().is_allocation());
        assert_eq!(alloc.num_qubits(), 1);
        assert!(alloc.qreg("b").is_none());

        let rest = alloc.add_qreg("b", MAX_BITS - 1).unwrap();
        assert_eq!(rest.first(), Some(&QubitId(1)));
        assert!(alloc.allocate_qubits(1).unwrap_err().is_allocation());
    }

    #[test]
    fn test_duplicate_register_name() {
        let mut alloc = RegisterAllocator::new();
        alloc.add_qreg("a", 1).unwrap();
        assert!(matches!(
            alloc.add_creg("a", 1),
            Err(IrError::DuplicateRegister(name)) if name == "a"
        ));
    }

    #[test]
    fn test_resolve_operands() {
        let mut alloc = RegisterAllocator::new();
        alloc.add_qreg("q1", 2).unwrap();
        alloc.add_qreg("ancilla", 1).unwrap();
        alloc.add_creg("c", 1).unwrap();

        assert_eq!(alloc.resolve_qubits("q1[1]"), Some(vec![QubitId(1)]));
        assert_eq!(alloc.resolve_qubits("ancilla"), Some(vec![QubitId(2)]));
        assert_eq!(
            alloc.resolve_qubits("q1"),
            Some(vec![QubitId(0), QubitId(1)])
        );
        assert_eq!(alloc.resolve_clbits("c[0]"), Some(vec![ClbitId(0)]));
        assert_eq!(alloc.resolve_qubits("q1[2]"), None);
        assert_eq!(alloc.resolve_qubits("c"), None);
        assert_eq!(alloc.resolve_qubits("q1[x]"), None);
    }
}
