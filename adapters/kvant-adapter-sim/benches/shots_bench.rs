//! Benchmarks for the Kvant statevector engine
//!
//! Run with: cargo bench -p kvant-adapter-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kvant_adapter_sim::{CancelToken, SimulatorConfig, Statevector, run_shots_with, simulate_statevector};
use kvant_ir::library::{self, Oracle, TeleportMode};
use kvant_ir::{QubitId, StandardGate};

/// Benchmark single gate kernels on a wide register
fn bench_gate_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_kernels");

    for n in &[10usize, 16, 20] {
        group.bench_with_input(BenchmarkId::new("h", n), n, |b, &n| {
            let mut state = Statevector::new(n);
            b.iter(|| state.apply_gate(black_box(&StandardGate::H), &[QubitId(0)]));
        });

        group.bench_with_input(BenchmarkId::new("cswap", n), n, |b, &n| {
            let mut state = Statevector::new(n);
            let targets = [QubitId(0), QubitId(n as u32 / 2), QubitId(n as u32 - 1)];
            b.iter(|| state.apply_gate(black_box(&StandardGate::CSwap), &targets));
        });
    }

    group.finish();
}

/// Benchmark the unitary prefix of Deutsch-Jozsa circuits
fn bench_statevector(c: &mut Criterion) {
    let mut group = c.benchmark_group("statevector");

    for n in &[4u32, 10, 16] {
        let circuit = library::deutsch_jozsa(*n, Oracle::Balanced(1)).unwrap();
        group.bench_with_input(BenchmarkId::new("deutsch_jozsa", n), &circuit, |b, circuit| {
            b.iter(|| simulate_statevector(black_box(circuit)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark shot sampling with mid-circuit measurement
fn bench_shots(c: &mut Criterion) {
    let mut group = c.benchmark_group("shots");
    let circuit = library::teleportation(TeleportMode::Classical).unwrap();

    for threads in &[1usize, 4] {
        let config = SimulatorConfig::default().with_threads(*threads);
        group.bench_with_input(
            BenchmarkId::new("teleportation_4096", threads),
            &config,
            |b, config| {
                b.iter(|| {
                    run_shots_with(&circuit, black_box(4096), Some(7), config, &CancelToken::new())
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_gate_kernels, bench_statevector, bench_shots);
criterion_main!(benches);
