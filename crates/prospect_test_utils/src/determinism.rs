//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A game is fully determined by its configuration, its seed and the
//! commands issued. Sources of non-determinism include:
//!
//! - **Floating-point math**: spawn chances and multipliers are fixed-point
//!   via [`prospect_core::math::Fixed`].
//!
//! - **HashMap iteration order**: resource ledgers are `BTreeMap`s and cells
//!   are visited in row-major order.
//!
//! - **System randomness**: map generation and spawn positions draw from a
//!   seeded [`prospect_core::rng::SimRng`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use prospect_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use prospect_core::config::GameConfig;
/// use prospect_core::simulation::Simulation;
/// use prospect_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     20,
///     || Simulation::new(GameConfig::default(), 7).unwrap(),
///     |sim| {
///         let _ = sim.advance_turn_automatic();
///     },
///     Simulation::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Advance a simulation one automatic tick, ignoring a finished game.
pub fn step_automatic(sim: &mut Simulation) {
    // A finished game rejects further ticks and its state stays frozen.
    let _ = sim.advance_turn_automatic();
}

/// Run a simulation twice from the same setup and compare final hashes.
///
/// # Returns
///
/// `true` if both runs produced identical state hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(2, num_ticks, setup_fn, step_automatic, Simulation::state_hash)
        .is_deterministic
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        step_automatic(&mut sim1);
        step_automatic(&mut sim2);

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for simulation testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use fixed::types::I32F32;
    use proptest::prelude::*;
    use prospect_core::config::GameConfig;
    use prospect_core::resources::{Job, ResourceType};
    use prospect_core::unit::UnitAction;

    /// Generate a game seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate a resource type.
    pub fn arb_resource() -> impl Strategy<Value = ResourceType> {
        prop::sample::select(ResourceType::ALL.to_vec())
    }

    /// Generate a job.
    pub fn arb_job() -> impl Strategy<Value = Job> {
        prop::sample::select(Job::ALL.to_vec())
    }

    /// Generate a vein size (0-20).
    pub fn arb_vein() -> impl Strategy<Value = u32> {
        0u32..20u32
    }

    /// Generate a mining request (0-50).
    pub fn arb_mine_amount() -> impl Strategy<Value = u32> {
        0u32..50u32
    }

    /// Generate grid dimensions (1-12 each).
    pub fn arb_dimensions() -> impl Strategy<Value = (u32, u32)> {
        (1u32..12u32, 1u32..12u32)
    }

    /// Generate possibly out-of-range signed coordinates.
    pub fn arb_coordinate() -> impl Strategy<Value = i64> {
        -50i64..50i64
    }

    /// Generate a probability in `[0, 1]` with 1/100 resolution.
    pub fn arb_chance() -> impl Strategy<Value = I32F32> {
        (0i32..=100i32).prop_map(|p| I32F32::from_num(p) / I32F32::from_num(100))
    }

    /// Generate a manual unit action.
    pub fn arb_action() -> impl Strategy<Value = UnitAction> {
        prop_oneof![
            Just(UnitAction::Mine),
            (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| UnitAction::Move { x, y }),
        ]
    }

    /// Generate a small game configuration with default rules.
    pub fn arb_small_config() -> impl Strategy<Value = GameConfig> {
        (arb_dimensions(), 0u32..60u32).prop_map(|((width, height), initial_food)| GameConfig {
            width,
            height,
            initial_food,
            ..GameConfig::default()
        })
    }
}
