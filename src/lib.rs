//! Fair lineup rotation for small-sided football.
//!
//! The [`schedule`] module holds the allocation engine; the rest is the plumbing
//! around it (roster CSV loading, lineup persistence, text rendering, HTTP API).

pub mod error;
pub mod schedule;
pub mod parser;
pub mod records;
pub mod display;
pub mod web;

pub use error::{AllocationError, ConfigError, RosterError, StoreError};
pub use schedule::{
    allocate, allocate_with_rng, calculate_variance, get_player_quarter_breakdown,
    get_subs_for_quarter, swap_positions, swap_with_sub, update_slot, validate_allocation,
    Allocation, MatchConfig, PlayerSlot, Position, QuarterAllocation, Wave,
};
