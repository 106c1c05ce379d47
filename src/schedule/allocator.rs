use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::AllocationError;
use super::config::MatchConfig;
use super::counters::PlayerCounters;
use super::quarter::allocate_quarter;
use super::types::{Allocation, PlayerId};
use super::validate::{calculate_variance, consecutive_bench_violations, validate_allocation};

pub const MIN_ROSTER_SIZE: usize = 5;
pub const MAX_ROSTER_SIZE: usize = 15;

/// Whole-match attempts before settling for a best-effort result
pub const MAX_ATTEMPTS: u32 = 100;

/// Generates an allocation using the thread-local RNG.
///
/// `manual_goalkeepers[i]` pins the goalkeeper of quarter `i + 1`; pass `&[]` for none.
pub fn allocate(
    roster: &[PlayerId],
    config: &MatchConfig,
    manual_goalkeepers: &[Option<PlayerId>],
) -> Result<Allocation, AllocationError> {
    allocate_with_rng(roster, config, manual_goalkeepers, &mut rand::thread_rng())
}

/// Generates an allocation, retrying with fresh randomness until fairness holds.
///
/// Never fails for an unsatisfiable but well-formed request: after `MAX_ATTEMPTS` the
/// most recent attempt is returned with one warning per constraint still violated.
pub fn allocate_with_rng<R: Rng>(
    roster: &[PlayerId],
    config: &MatchConfig,
    manual_goalkeepers: &[Option<PlayerId>],
    rng: &mut R,
) -> Result<Allocation, AllocationError> {
    config.validate()?;
    check_roster(roster)?;
    check_manual_goalkeepers(roster, manual_goalkeepers)?;

    let mut attempt = 1;
    loop {
        let allocation = build_attempt(roster, config, manual_goalkeepers, rng);
        let problems = constraint_problems(&allocation, roster, config);

        if problems.is_empty() {
            info!(
                players = roster.len(),
                attempt,
                variance = calculate_variance(&allocation).variance,
                "allocation generated"
            );
            return Ok(allocation);
        }

        if attempt >= MAX_ATTEMPTS {
            warn!(attempts = attempt, ?problems, "retry budget exhausted, returning best effort");
            return Ok(allocation.with_warnings(problems));
        }

        debug!(attempt, ?problems, "allocation attempt rejected");
        attempt += 1;
    }
}

fn check_roster(roster: &[PlayerId]) -> Result<(), AllocationError> {
    if roster.len() < MIN_ROSTER_SIZE || roster.len() > MAX_ROSTER_SIZE {
        return Err(AllocationError::InvalidRosterSize {
            size: roster.len(),
            min: MIN_ROSTER_SIZE,
            max: MAX_ROSTER_SIZE,
        });
    }

    let mut seen = HashSet::new();
    for player in roster {
        if !seen.insert(player.as_str()) {
            return Err(AllocationError::DuplicatePlayer(player.clone()));
        }
    }
    Ok(())
}

fn check_manual_goalkeepers(
    roster: &[PlayerId],
    manual_goalkeepers: &[Option<PlayerId>],
) -> Result<(), AllocationError> {
    for (i, keeper) in manual_goalkeepers.iter().enumerate() {
        if let Some(keeper) = keeper {
            if !roster.contains(keeper) {
                return Err(AllocationError::InvalidManualGoalkeeper {
                    quarter: i as u32 + 1,
                    player: keeper.clone(),
                });
            }
        }
    }
    Ok(())
}

/// One full pass over the quarters with a fresh accumulator
fn build_attempt<R: Rng>(
    roster: &[PlayerId],
    config: &MatchConfig,
    manual_goalkeepers: &[Option<PlayerId>],
    rng: &mut R,
) -> Allocation {
    let mut counters = PlayerCounters::new(roster);
    let mut quarters = Vec::with_capacity(config.quarter_count as usize);
    for n in 1..=config.quarter_count {
        let manual = manual_goalkeepers
            .get(n as usize - 1)
            .and_then(|k| k.as_deref());
        quarters.push(allocate_quarter(roster, config, n, manual, &mut counters, rng));
    }
    Allocation::new(quarters, roster)
}

/// Everything that would make an attempt unacceptable, as user-facing warnings
fn constraint_problems(allocation: &Allocation, roster: &[PlayerId], config: &MatchConfig) -> Vec<String> {
    let mut problems = Vec::new();

    let stats = calculate_variance(allocation);
    if stats.variance > config.fairness.max_variance_minutes {
        problems.push(format!(
            "fairness variance exceeds configured maximum ({} > {} minutes)",
            stats.variance, config.fairness.max_variance_minutes
        ));
    }

    let benched = consecutive_bench_violations(allocation, roster);
    if !benched.is_empty() {
        problems.push(format!(
            "players benched for consecutive quarters: {}",
            benched.join(", ")
        ));
    }

    problems.extend(validate_allocation(allocation, config));
    problems
}
