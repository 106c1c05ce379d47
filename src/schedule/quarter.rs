use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::config::MatchConfig;
use super::counters::PlayerCounters;
use super::types::{PlayerId, PlayerSlot, Position, QuarterAllocation, Wave};

/// Running minutes within the same band count as a tie and are ordered randomly
pub const TIE_BREAK_BAND_MINUTES: u32 = 2;

fn minutes_band(minutes: u32) -> u32 {
    minutes / TIE_BREAK_BAND_MINUTES
}

/// Builds the slots for one quarter and credits them to `counters`.
///
/// Order of work:
/// 1. Goalkeeper(s): manual override first, then fewest GK quarters, then fewest minutes.
/// 2. First wave: former goalkeepers still owed an outfield block go first, then
///    players benched last quarter, then fewest minutes.
/// 3. Second wave: players not used yet this quarter first, then the same ordering
///    minus the goalkeeper credit rule.
pub fn allocate_quarter<R: Rng>(
    roster: &[PlayerId],
    config: &MatchConfig,
    quarter_number: u32,
    manual_goalkeeper: Option<&str>,
    counters: &mut PlayerCounters,
    rng: &mut R,
) -> QuarterAllocation {
    let mut slots = Vec::new();
    let mut used: HashSet<PlayerId> = HashSet::new();

    let is_final_quarter = quarter_number == config.quarter_count;
    let goalkeepers = pick_goalkeepers(roster, config, manual_goalkeeper, is_final_quarter, counters, rng);
    for keeper in &goalkeepers {
        let slot = PlayerSlot::goalkeeper(keeper, config.quarter_duration_minutes);
        counters.record(&slot);
        used.insert(keeper.clone());
        slots.push(slot);
    }

    for (wave, minutes) in [(Wave::First, config.waves.first), (Wave::Second, config.waves.second)] {
        let mut selected = pick_wave(
            roster,
            config.positions.outfield_per_wave(),
            &goalkeepers,
            &used,
            wave == Wave::First,
            counters,
            rng,
        );
        if selected.len() < config.positions.outfield_per_wave() {
            debug!(
                quarter = quarter_number,
                wave = wave.as_str(),
                available = selected.len(),
                "not enough outfield players for a full wave"
            );
        }

        // Vary who defends and who attacks among the chosen players
        selected.shuffle(rng);
        let defenders = config.positions.def as usize;
        for (i, player) in selected.into_iter().enumerate() {
            let position = if i < defenders { Position::Def } else { Position::Att };
            let slot = PlayerSlot::outfield(&player, position, wave, minutes);
            counters.record(&slot);
            used.insert(player);
            slots.push(slot);
        }
    }

    let quarter = QuarterAllocation { quarter_number, slots };
    counters.end_quarter(&quarter);
    quarter
}

fn pick_goalkeepers<R: Rng>(
    roster: &[PlayerId],
    config: &MatchConfig,
    manual_goalkeeper: Option<&str>,
    is_final_quarter: bool,
    counters: &PlayerCounters,
    rng: &mut R,
) -> Vec<PlayerId> {
    let wanted = config.positions.gk as usize;
    let mut keepers: Vec<PlayerId> = manual_goalkeeper.map(|p| vec![p.to_string()]).unwrap_or_default();

    // No first wave remains after the last quarter to credit a new goalkeeper
    let prefer_credited = is_final_quarter && config.fairness.gk_requires_outfield;

    let mut ranked: Vec<((u8, u32, u32, u32), &PlayerId)> = roster
        .iter()
        .filter(|p| !keepers.contains(*p))
        .map(|p| {
            let tally = counters.get(p);
            let uncredited = u8::from(prefer_credited && tally.primary_outfield_blocks == 0);
            (
                (uncredited, tally.goalkeeper_quarters, minutes_band(tally.total_minutes), rng.gen::<u32>()),
                p,
            )
        })
        .collect();
    ranked.sort_by_key(|(key, _)| *key);

    let missing = wanted.saturating_sub(keepers.len());
    keepers.extend(ranked.into_iter().take(missing).map(|(_, p)| p.clone()));
    keepers
}

fn pick_wave<R: Rng>(
    roster: &[PlayerId],
    count: usize,
    goalkeepers: &[PlayerId],
    used: &HashSet<PlayerId>,
    credit_priority: bool,
    counters: &PlayerCounters,
    rng: &mut R,
) -> Vec<PlayerId> {
    let mut ranked: Vec<((u8, u8, u8, u32, u32), &PlayerId)> = roster
        .iter()
        .filter(|p| !goalkeepers.contains(*p))
        .map(|p| {
            let tally = counters.get(p);
            let owes_credit = credit_priority && tally.needs_outfield_credit();
            (
                (
                    u8::from(used.contains(p.as_str())),
                    u8::from(!owes_credit),
                    u8::from(!tally.benched_last_quarter),
                    minutes_band(tally.total_minutes),
                    rng.gen::<u32>(),
                ),
                p,
            )
        })
        .collect();
    ranked.sort_by_key(|(key, _)| *key);

    ranked.into_iter().take(count).map(|(_, p)| p.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roster(n: usize) -> Vec<PlayerId> {
        (1..=n).map(|i| format!("P{}", i)).collect()
    }

    #[test]
    fn test_quarter_slot_counts() {
        let config = MatchConfig::default();
        let players = roster(8);
        let mut counters = PlayerCounters::new(&players);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let quarter = allocate_quarter(&players, &config, 1, None, &mut counters, &mut rng);
        assert_eq!(quarter.quarter_number, 1);
        assert_eq!(quarter.count(Position::Gk), 1);
        assert_eq!(quarter.count(Position::Def), 4);
        assert_eq!(quarter.count(Position::Att), 4);

        let keeper = quarter.goalkeepers().next().unwrap().to_string();
        assert!(quarter
            .slots
            .iter()
            .filter(|s| !s.is_goalkeeper())
            .all(|s| s.player != keeper));
    }

    #[test]
    fn test_manual_goalkeeper_is_used() {
        let config = MatchConfig::default();
        let players = roster(6);
        let mut counters = PlayerCounters::new(&players);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let quarter = allocate_quarter(&players, &config, 1, Some("P4"), &mut counters, &mut rng);
        assert_eq!(quarter.goalkeepers().collect::<Vec<_>>(), vec!["P4"]);
        assert_eq!(counters.get("P4").goalkeeper_quarters, 1);
        assert_eq!(counters.get("P4").total_minutes, 10);
    }

    #[test]
    fn test_former_goalkeeper_gets_first_wave() {
        let config = MatchConfig::default();
        let players = roster(12);
        let mut counters = PlayerCounters::new(&players);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let first = allocate_quarter(&players, &config, 1, None, &mut counters, &mut rng);
        let keeper = first.goalkeepers().next().unwrap().to_string();

        let second = allocate_quarter(&players, &config, 2, None, &mut counters, &mut rng);
        assert!(second
            .slots
            .iter()
            .any(|s| s.player == keeper && s.wave == Some(Wave::First)));
        assert_eq!(counters.get(&keeper).primary_outfield_blocks, 1);
    }

    #[test]
    fn test_benched_players_return_next_quarter() {
        let config = MatchConfig::default();
        let players = roster(15);
        let mut counters = PlayerCounters::new(&players);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let first = allocate_quarter(&players, &config, 1, None, &mut counters, &mut rng);
        let benched: Vec<&PlayerId> = players.iter().filter(|p| !first.holds_slot(p)).collect();
        assert_eq!(benched.len(), 6);

        let second = allocate_quarter(&players, &config, 2, None, &mut counters, &mut rng);
        assert!(benched.iter().all(|p| second.holds_slot(p)));
    }

    #[test]
    fn test_small_roster_reuses_first_wave() {
        let config = MatchConfig::default();
        let players = roster(5);
        let mut counters = PlayerCounters::new(&players);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let quarter = allocate_quarter(&players, &config, 1, None, &mut counters, &mut rng);
        assert_eq!(quarter.slots.len(), 9);
        assert_eq!(quarter.players().len(), 5);
    }
}
