pub mod types;
pub mod config;
pub mod counters;
pub mod quarter;
pub mod allocator;
pub mod validate;
pub mod editor;
pub mod views;

pub use types::{Allocation, PlayerId, PlayerSlot, Position, QuarterAllocation, Wave};
pub use config::{
    FairnessRules, MatchConfig, PositionCounts, WaveDurations, MAX_PER_POSITION, MAX_QUARTERS,
    MAX_QUARTER_MINUTES,
};
pub use allocator::{allocate, allocate_with_rng, MAX_ATTEMPTS, MAX_ROSTER_SIZE, MIN_ROSTER_SIZE};
pub use validate::{calculate_variance, consecutive_bench_violations, validate_allocation, VarianceStats};
pub use editor::{swap_positions, swap_with_sub, update_slot};
pub use views::{get_player_quarter_breakdown, get_subs_for_quarter, QuarterLabel};
