//! Integration tests for circuit descriptions.
//!
//! Descriptions written by hand must build the same instruction stream as the
//! corresponding library circuits.

use kvant_ir::library::{self, Oracle, TeleportMode};
use kvant_ir::{CircuitSpec, IrError, StandardGate};

// ----------------------------------------------------------------------------
// Library equivalence
// ----------------------------------------------------------------------------

#[test]
fn test_bell_description_matches_library() {
    let json = r#"{
        "name": "bell",
        "qubit_registers": [["q", 2]],
        "classical_registers": [["c", 2]],
        "operations": [
            {"gate": "h", "targets": ["q[0]"]},
            {"gate": "cnot", "targets": ["q[0]", "q[1]"]},
            {"measure": "q", "clbit": "c"}
        ]
    }"#;
    let loaded = CircuitSpec::from_json(json).unwrap().build().unwrap();
    let expected = library::bell().unwrap();
    assert_eq!(loaded.instructions(), expected.instructions());
    assert_eq!(loaded.registers(), expected.registers());
}

#[test]
fn test_deutsch_jozsa_description_matches_library() {
    let yaml = r#"
name: deutsch_jozsa
qubit_registers: [[qreg, 3], [ancillary, 1]]
classical_registers: [[creg, 3]]
operations:
  - { gate: x, targets: [ancillary] }
  - { gate: h, targets: [ancillary] }
  - { gate: h, targets: [qreg] }
  - barrier
  - { gate: cx, targets: ["qreg[0]", ancillary] }
  - { gate: cx, targets: ["qreg[2]", ancillary] }
  - barrier
  - { gate: h, targets: [qreg] }
  - { measure: qreg, clbit: creg }
"#;
    let loaded = CircuitSpec::from_yaml(yaml).unwrap().build().unwrap();
    let expected = library::deutsch_jozsa(3, Oracle::Balanced(0b101)).unwrap();
    assert_eq!(loaded.instructions(), expected.instructions());
}

#[test]
fn test_teleportation_description_round_trips_registers() {
    let yaml = r#"
name: teleportation
qubit_registers: [[q_sender, 1], [q_entangled, 1], [q_receiver, 1]]
classical_registers: [[c_sender, 1], [c_entangled, 1], [c_receiver, 1]]
operations:
  - { gate: h, targets: [q_sender] }
  - { gate: rz, targets: [q_sender], param: 0.7853981633974483 }
  - { gate: h, targets: [q_sender] }
  - { gate: h, targets: [q_entangled] }
  - { gate: cx, targets: [q_entangled, q_receiver] }
  - { gate: cx, targets: [q_sender, q_entangled] }
  - { gate: h, targets: [q_sender] }
  - { measure: q_sender, clbit: c_sender }
  - { measure: q_entangled, clbit: c_entangled }
  - { gate: x, targets: [q_receiver], condition: { register: c_entangled, value: 1 } }
  - { gate: z, targets: [q_receiver], condition: { register: c_sender, value: 1 } }
"#;
    let loaded = CircuitSpec::from_yaml(yaml).unwrap().build().unwrap();
    let library = library::teleport_state(TeleportMode::Classical, std::f64::consts::FRAC_PI_4, false)
        .unwrap();

    assert_eq!(loaded.num_qubits(), library.num_qubits());
    assert_eq!(loaded.num_clbits(), library.num_clbits());
    assert!(loaded.has_mid_circuit_measurement());

    let conditional: Vec<_> = loaded
        .instructions()
        .iter()
        .filter_map(|inst| inst.as_gate())
        .filter(|g| g.is_conditional())
        .map(|g| g.kind)
        .collect();
    assert_eq!(conditional, [StandardGate::X, StandardGate::Z]);
}

// ----------------------------------------------------------------------------
// Error paths
// ----------------------------------------------------------------------------

#[test]
fn test_malformed_document() {
    assert!(matches!(
        CircuitSpec::from_json("{\"operations\": 3}"),
        Err(IrError::Json(_))
    ));
    assert!(matches!(
        CircuitSpec::from_yaml("operations: [ { gate: h, targets: "),
        Err(IrError::Yaml(_))
    ));
}

#[test]
fn test_duplicate_register_names() {
    let yaml = r#"
qubit_registers: [[r, 1]]
classical_registers: [[r, 1]]
"#;
    assert!(matches!(
        CircuitSpec::from_yaml(yaml).unwrap().build(),
        Err(IrError::DuplicateRegister(_))
    ));
}

#[test]
fn test_measure_width_mismatch() {
    let yaml = r#"
qubit_registers: [[q, 2]]
classical_registers: [[c, 1]]
operations:
  - { measure: q, clbit: c }
"#;
    let err = CircuitSpec::from_yaml(yaml).unwrap().build().unwrap_err();
    assert!(err.is_invalid_operation());
}
