use tracing::{info, warn};

use crate::error::AllocationError;
use super::config::MatchConfig;
use super::types::{Allocation, PlayerId, PlayerSlot, QuarterAllocation};
use super::validate::{calculate_variance, consecutive_bench_violations, validate_allocation};

/// Exchanges the players of two slots in the same quarter.
///
/// Slot positions, waves and minutes stay put. The consecutive-bench rule is only
/// checked when a roster is supplied.
pub fn swap_positions(
    allocation: &Allocation,
    config: &MatchConfig,
    quarter: u32,
    slot_a: usize,
    slot_b: usize,
    roster: Option<&[PlayerId]>,
) -> Result<Allocation, AllocationError> {
    let current = find_quarter(allocation, quarter)?;
    let first = find_slot(current, quarter, slot_a)?;
    let second = find_slot(current, quarter, slot_b)?;
    if first.is_goalkeeper() || second.is_goalkeeper() {
        return Err(AllocationError::CannotSwapGoalkeeper);
    }
    let (player_a, player_b) = (first.player.clone(), second.player.clone());

    let mut edited = allocation.clone();
    if let Some(target) = edited.quarter_mut(quarter) {
        target.slots[slot_a].player = player_b.clone();
        target.slots[slot_b].player = player_a.clone();
        check_single_wave_slot(target, &player_a)?;
        check_single_wave_slot(target, &player_b)?;
    }

    edited.recompute_summary();
    commit(edited, config, roster, "swap_positions", quarter)
}

/// Puts a bench player into one slot of a quarter.
///
/// Only the chosen slot changes hands. When the previous occupant also holds a slot
/// in the other wave they keep it, so they lose that wave's minutes but are not
/// benched for the quarter.
pub fn swap_with_sub(
    allocation: &Allocation,
    config: &MatchConfig,
    quarter: u32,
    slot: usize,
    bench_player: &str,
    roster: &[PlayerId],
) -> Result<Allocation, AllocationError> {
    let current = find_quarter(allocation, quarter)?;
    if find_slot(current, quarter, slot)?.is_goalkeeper() {
        return Err(AllocationError::CannotSwapGoalkeeper);
    }
    if current.holds_slot(bench_player) {
        return Err(AllocationError::PlayerAlreadyPlaying {
            quarter,
            player: bench_player.to_string(),
        });
    }
    if !roster.iter().any(|p| p == bench_player) {
        return Err(AllocationError::PlayerNotInRoster(bench_player.to_string()));
    }

    let mut edited = allocation.clone();
    if let Some(target) = edited.quarter_mut(quarter) {
        target.slots[slot].player = bench_player.to_string();
    }

    edited.recompute_summary();
    commit(edited, config, Some(roster), "swap_with_sub", quarter)
}

/// Unchecked reassignment of one slot. Only the summary is refreshed.
pub fn update_slot(
    allocation: &Allocation,
    quarter: u32,
    slot: usize,
    new_player: &str,
) -> Result<Allocation, AllocationError> {
    find_slot(find_quarter(allocation, quarter)?, quarter, slot)?;

    let mut edited = allocation.clone();
    if let Some(target) = edited.quarter_mut(quarter) {
        target.slots[slot].player = new_player.to_string();
    }
    edited.recompute_summary();
    Ok(edited)
}

fn find_quarter(allocation: &Allocation, quarter: u32) -> Result<&QuarterAllocation, AllocationError> {
    allocation
        .quarter(quarter)
        .ok_or(AllocationError::QuarterNotFound(quarter))
}

fn find_slot(quarter: &QuarterAllocation, number: u32, index: usize) -> Result<&PlayerSlot, AllocationError> {
    quarter
        .slots
        .get(index)
        .ok_or(AllocationError::SlotNotFound { quarter: number, slot: index })
}

/// A player can only be in one place per wave
fn check_single_wave_slot(quarter: &QuarterAllocation, player: &str) -> Result<(), AllocationError> {
    let mut waves: Vec<_> = quarter
        .slots
        .iter()
        .filter(|s| s.player == player && !s.is_goalkeeper())
        .map(|s| s.wave)
        .collect();
    let held = waves.len();
    waves.sort();
    waves.dedup();
    if waves.len() != held {
        return Err(AllocationError::PlayerAlreadyInWave {
            quarter: quarter.quarter_number,
            player: player.to_string(),
        });
    }
    Ok(())
}

/// Re-checks global invariants on the hypothetical result before handing it back
fn commit(
    mut edited: Allocation,
    config: &MatchConfig,
    roster: Option<&[PlayerId]>,
    operation: &str,
    quarter: u32,
) -> Result<Allocation, AllocationError> {
    let stats = calculate_variance(&edited);
    if stats.variance > config.fairness.max_variance_minutes {
        warn!(operation, quarter, variance = stats.variance, "edit rejected: fairness");
        return Err(AllocationError::FairnessViolation {
            variance: stats.variance,
            max: config.fairness.max_variance_minutes,
        });
    }

    if let Some(roster) = roster {
        let players = consecutive_bench_violations(&edited, roster);
        if !players.is_empty() {
            warn!(operation, quarter, ?players, "edit rejected: consecutive bench");
            return Err(AllocationError::ConsecutiveBenchViolation { players });
        }
    }

    let remaining = validate_allocation(&edited, config);
    edited.clear_warnings();
    info!(operation, quarter, variance = stats.variance, "edit applied");
    Ok(edited.with_warnings(remaining))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::config::{FairnessRules, PositionCounts, WaveDurations};
    use crate::schedule::types::{Position, Wave};

    fn names(list: &[&str]) -> Vec<PlayerId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Slot layout: 0 = GK, 1-4 = first wave (DEF, DEF, ATT, ATT), 5-8 = second wave.
    /// The same four outfield players cover both waves.
    fn quarter(n: u32, gk: &str, outfield: [&str; 4]) -> QuarterAllocation {
        let mut slots = vec![PlayerSlot::goalkeeper(gk, 10)];
        for wave in [Wave::First, Wave::Second] {
            for (i, p) in outfield.iter().enumerate() {
                let position = if i < 2 { Position::Def } else { Position::Att };
                slots.push(PlayerSlot::outfield(p, position, wave, 5));
            }
        }
        QuarterAllocation { quarter_number: n, slots }
    }

    /// Bench per quarter: F, E, D, A. Totals: B and C 40, everyone else 30.
    fn fixture() -> (Allocation, Vec<PlayerId>) {
        let roster = names(&["A", "B", "C", "D", "E", "F"]);
        let allocation = Allocation::new(
            vec![
                quarter(1, "A", ["B", "C", "D", "E"]),
                quarter(2, "B", ["A", "C", "D", "F"]),
                quarter(3, "C", ["A", "B", "E", "F"]),
                quarter(4, "D", ["B", "C", "E", "F"]),
            ],
            &roster,
        );
        (allocation, roster)
    }

    #[test]
    fn test_fixture_is_valid() {
        let (allocation, roster) = fixture();
        let config = MatchConfig::default();
        assert!(validate_allocation(&allocation, &config).is_empty());
        assert_eq!(calculate_variance(&allocation).variance, 10);
        assert!(consecutive_bench_violations(&allocation, &roster).is_empty());
    }

    #[test]
    fn test_swap_positions_exchanges_players() {
        let (allocation, roster) = fixture();
        let config = MatchConfig::default();
        let swapped = swap_positions(&allocation, &config, 2, 1, 3, Some(roster.as_slice())).unwrap();

        let q2 = swapped.quarter(2).unwrap();
        assert_eq!(q2.slots[1].player, "D");
        assert_eq!(q2.slots[1].position, Position::Def);
        assert_eq!(q2.slots[3].player, "A");
        assert_eq!(q2.slots[3].position, Position::Att);
        assert_eq!(swapped.summary(), allocation.summary());
        assert_eq!(allocation.quarter(2).unwrap().slots[1].player, "A");
    }

    #[test]
    fn test_swap_positions_is_its_own_inverse() {
        let (allocation, roster) = fixture();
        let config = MatchConfig::default();
        let once = swap_positions(&allocation, &config, 3, 2, 4, Some(roster.as_slice())).unwrap();
        assert_ne!(once, allocation);
        let twice = swap_positions(&once, &config, 3, 2, 4, Some(roster.as_slice())).unwrap();
        assert_eq!(twice, allocation);
    }

    #[test]
    fn test_swap_positions_rejects_goalkeeper() {
        let (allocation, _) = fixture();
        let config = MatchConfig::default();
        for other in 0..9 {
            assert_eq!(
                swap_positions(&allocation, &config, 1, 0, other, None),
                Err(AllocationError::CannotSwapGoalkeeper)
            );
            assert_eq!(
                swap_positions(&allocation, &config, 1, other, 0, None),
                Err(AllocationError::CannotSwapGoalkeeper)
            );
        }
    }

    #[test]
    fn test_swap_positions_rejects_double_booking() {
        let (allocation, _) = fixture();
        // B would end up in second-wave slots 5 and 6
        assert_eq!(
            swap_positions(&allocation, &MatchConfig::default(), 1, 1, 6, None),
            Err(AllocationError::PlayerAlreadyInWave { quarter: 1, player: "B".to_string() })
        );
    }

    #[test]
    fn test_out_of_range_targets() {
        let (allocation, _) = fixture();
        let config = MatchConfig::default();
        assert_eq!(
            swap_positions(&allocation, &config, 5, 1, 2, None),
            Err(AllocationError::QuarterNotFound(5))
        );
        assert_eq!(
            swap_positions(&allocation, &config, 1, 1, 9, None),
            Err(AllocationError::SlotNotFound { quarter: 1, slot: 9 })
        );
        assert_eq!(
            update_slot(&allocation, 2, 42, "A"),
            Err(AllocationError::SlotNotFound { quarter: 2, slot: 42 })
        );
    }

    #[test]
    fn test_swap_with_sub_replaces_occupant() {
        let (allocation, roster) = fixture();
        let edited = swap_with_sub(&allocation, &MatchConfig::default(), 1, 1, "F", &roster).unwrap();

        let q1 = edited.quarter(1).unwrap();
        assert_eq!(q1.slots[1].player, "F");
        assert_eq!(q1.slots[1].wave, Some(Wave::First));
        assert_eq!(edited.total_minutes("F"), 35);
        assert_eq!(edited.total_minutes("B"), 35);
        assert!(edited.warnings().is_empty());
        assert_eq!(allocation.total_minutes("F"), 30);
    }

    #[test]
    fn test_swap_with_sub_keeps_occupant_other_wave() {
        let (allocation, roster) = fixture();
        let edited = swap_with_sub(&allocation, &MatchConfig::default(), 1, 1, "F", &roster).unwrap();

        // B gave up the first-wave slot only
        let q1 = edited.quarter(1).unwrap();
        assert!(q1.holds_slot("B"));
        assert_eq!(q1.slots[5].player, "B");
        assert_eq!(q1.slots[5].wave, Some(Wave::Second));
        assert_eq!(
            crate::schedule::get_subs_for_quarter(&edited, 1, &roster).unwrap(),
            Vec::<PlayerId>::new()
        );
    }

    #[test]
    fn test_swap_positions_fairness_violation() {
        // Uneven waves: moving a player between waves shifts 2 minutes
        let config = MatchConfig {
            quarter_count: 2,
            quarter_duration_minutes: 10,
            waves: WaveDurations { first: 6, second: 4 },
            positions: PositionCounts { gk: 1, def: 1, att: 1 },
            fairness: FairnessRules { max_variance_minutes: 6, gk_requires_outfield: true },
        };
        let two_a_side = |n: u32, gk: &str, first: [&str; 2], second: [&str; 2]| QuarterAllocation {
            quarter_number: n,
            slots: vec![
                PlayerSlot::goalkeeper(gk, 10),
                PlayerSlot::outfield(first[0], Position::Def, Wave::First, 6),
                PlayerSlot::outfield(first[1], Position::Att, Wave::First, 6),
                PlayerSlot::outfield(second[0], Position::Def, Wave::Second, 4),
                PlayerSlot::outfield(second[1], Position::Att, Wave::Second, 4),
            ],
        };
        let roster = names(&["A", "B", "C", "D", "E"]);
        let allocation = Allocation::new(
            vec![
                two_a_side(1, "A", ["B", "C"], ["D", "E"]),
                two_a_side(2, "C", ["D", "E"], ["A", "B"]),
            ],
            &roster,
        );
        // A 14, B 10, C 16, D 10, E 10
        assert_eq!(calculate_variance(&allocation).variance, 6);

        // D drops to 8 while A climbs to 16
        assert_eq!(
            swap_positions(&allocation, &config, 2, 1, 3, Some(roster.as_slice())),
            Err(AllocationError::FairnessViolation { variance: 8, max: 6 })
        );
    }

    #[test]
    fn test_update_slot_round_trip_leaves_no_trace() {
        let (allocation, roster) = fixture();
        let config = MatchConfig::default();
        let original = allocation.quarter(1).unwrap().slots[1].player.clone();

        let guest = update_slot(&allocation, 1, 1, "Guest").unwrap();
        assert_eq!(guest.total_minutes("Guest"), 5);
        let restored = update_slot(&guest, 1, 1, &original).unwrap();

        assert_eq!(restored.summary(), allocation.summary());
        assert!(!restored.summary().contains_key("Guest"));
        assert_eq!(calculate_variance(&restored), calculate_variance(&allocation));
        assert!(swap_positions(&restored, &config, 2, 1, 3, Some(roster.as_slice())).is_ok());
    }

    #[test]
    fn test_swap_with_sub_fairness_violation() {
        let (allocation, roster) = fixture();
        // A drops to 25 while B and C stay on 40
        assert_eq!(
            swap_with_sub(&allocation, &MatchConfig::default(), 2, 1, "E", &roster),
            Err(AllocationError::FairnessViolation { variance: 15, max: 10 })
        );
    }

    #[test]
    fn test_swap_with_sub_consecutive_bench_violation() {
        let (allocation, roster) = fixture();
        let mut config = MatchConfig::default();
        config.fairness.max_variance_minutes = 100;

        // Leave A with a single slot in quarter 3; A already sits out quarter 4
        let edited = update_slot(&allocation, 3, 5, "Guest").unwrap();
        assert_eq!(
            swap_with_sub(&edited, &config, 3, 1, "D", &roster),
            Err(AllocationError::ConsecutiveBenchViolation { players: names(&["A"]) })
        );
    }

    #[test]
    fn test_swap_with_sub_input_errors() {
        let (allocation, roster) = fixture();
        let config = MatchConfig::default();
        assert_eq!(
            swap_with_sub(&allocation, &config, 1, 0, "F", &roster),
            Err(AllocationError::CannotSwapGoalkeeper)
        );
        assert_eq!(
            swap_with_sub(&allocation, &config, 1, 1, "C", &roster),
            Err(AllocationError::PlayerAlreadyPlaying { quarter: 1, player: "C".to_string() })
        );
        assert_eq!(
            swap_with_sub(&allocation, &config, 1, 1, "Zed", &roster),
            Err(AllocationError::PlayerNotInRoster("Zed".to_string()))
        );
    }

    #[test]
    fn test_update_slot_is_unchecked() {
        let (allocation, _) = fixture();
        let edited = update_slot(&allocation, 1, 1, "Newcomer").unwrap();
        assert_eq!(edited.quarter(1).unwrap().slots[1].player, "Newcomer");
        assert_eq!(edited.total_minutes("Newcomer"), 5);
        assert_eq!(edited.total_minutes("B"), 35);
        assert_eq!(edited.summary().get("F"), Some(&30));
    }
}
