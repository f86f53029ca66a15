//! Projective measurement and per-shot random sources.
//!
//! Every random draw the simulator makes goes through an [`rand::Rng`] passed
//! in by the caller. Shot `i` of a run seeded with `s` always uses
//! [`shot_rng`]`(s, i)`, so a histogram depends on the seed alone and not on
//! how shots were spread over threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::statevector::{PROBABILITY_EPSILON, Statevector};

/// Random source for shot `shot_index` of a run seeded with `base_seed`.
pub fn shot_rng(base_seed: u64, shot_index: u64) -> StdRng {
    StdRng::seed_from_u64(splitmix64(
        base_seed ^ splitmix64(shot_index.wrapping_add(0x9E37_79B9_7F4A_7C15)),
    ))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Measure `qubit` in the Z basis, collapsing the state.
///
/// Draws `1` with probability `P(1)` and projects onto the drawn outcome. An
/// outcome whose probability is numerically zero is never returned.
pub fn measure_qubit<R: Rng + ?Sized>(state: &mut Statevector, qubit: usize, rng: &mut R) -> bool {
    let p_one = state.probability_one(qubit).clamp(0.0, 1.0);
    let outcome = if p_one <= PROBABILITY_EPSILON {
        false
    } else if p_one >= 1.0 - PROBABILITY_EPSILON {
        true
    } else {
        rng.r#gen::<f64>() < p_one
    };
    state.collapse(qubit, outcome);
    outcome
}

/// Reset `qubit` to `|0⟩` by measuring and correcting.
pub fn reset_qubit<R: Rng + ?Sized>(state: &mut Statevector, qubit: usize, rng: &mut R) {
    if measure_qubit(state, qubit, rng) {
        state.flip(qubit);
    }
}
