use serde::Serialize;

use super::config::MatchConfig;
use super::types::{Allocation, PlayerId, Position, Wave};

/// Spread of total minutes across players. `variance` is the max-min range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarianceStats {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    pub variance: u32,
}

pub fn calculate_variance(allocation: &Allocation) -> VarianceStats {
    let minutes: Vec<u32> = allocation.summary().values().copied().collect();
    if minutes.is_empty() {
        return VarianceStats { min: 0, max: 0, mean: 0.0, variance: 0 };
    }

    let min = minutes.iter().copied().min().unwrap_or(0);
    let max = minutes.iter().copied().max().unwrap_or(0);
    let mean = minutes.iter().map(|&m| f64::from(m)).sum::<f64>() / minutes.len() as f64;

    VarianceStats { min, max, mean, variance: max - min }
}

/// Structural and goalkeeper-outfield checks. An empty list means valid.
pub fn validate_allocation(allocation: &Allocation, config: &MatchConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if allocation.quarters().len() != config.quarter_count as usize {
        errors.push(format!(
            "expected {} quarters, found {}",
            config.quarter_count,
            allocation.quarters().len()
        ));
    }

    let expected = [
        (Position::Gk, config.positions.gk as usize),
        (Position::Def, config.positions.def as usize * 2),
        (Position::Att, config.positions.att as usize * 2),
    ];

    for quarter in allocation.quarters() {
        for (position, count) in expected {
            let found = quarter.count(position);
            if found != count {
                errors.push(format!(
                    "quarter {}: expected {} {} slots, found {}",
                    quarter.quarter_number, count, position, found
                ));
            }
        }

        for slot in &quarter.slots {
            let expected_minutes = match (slot.position, slot.wave) {
                (Position::Gk, _) => Some(config.quarter_duration_minutes),
                (_, Some(Wave::First)) => Some(config.waves.first),
                (_, Some(Wave::Second)) => Some(config.waves.second),
                (_, None) => None,
            };
            match expected_minutes {
                Some(minutes) if minutes != slot.minutes_allocated => errors.push(format!(
                    "quarter {}: {} {} has {} minutes, expected {}",
                    quarter.quarter_number, slot.position, slot.player, slot.minutes_allocated, minutes
                )),
                None => errors.push(format!(
                    "quarter {}: outfield slot for {} has no wave",
                    quarter.quarter_number, slot.player
                )),
                _ => {}
            }
        }
    }

    if config.fairness.gk_requires_outfield {
        for player in goalkeepers_without_outfield(allocation, config) {
            errors.push(format!("goalkeeper {} has no first-wave outfield slot", player));
        }
    }

    errors
}

/// Players who kept goal but never held an outfield slot of first-wave length
pub fn goalkeepers_without_outfield(allocation: &Allocation, config: &MatchConfig) -> Vec<PlayerId> {
    let slots: Vec<_> = allocation.quarters().iter().flat_map(|q| &q.slots).collect();

    let mut keepers: Vec<PlayerId> = Vec::new();
    for slot in slots.iter().filter(|s| s.is_goalkeeper()) {
        if !keepers.contains(&slot.player) {
            keepers.push(slot.player.clone());
        }
    }

    keepers.retain(|keeper| {
        !slots.iter().any(|s| {
            s.player == *keeper && !s.is_goalkeeper() && s.minutes_allocated == config.waves.first
        })
    });
    keepers
}

/// Roster players who sit out two or more quarters in a row, in roster order
pub fn consecutive_bench_violations(allocation: &Allocation, roster: &[PlayerId]) -> Vec<PlayerId> {
    roster
        .iter()
        .filter(|player| {
            let mut streak = 0;
            for quarter in allocation.quarters() {
                if quarter.holds_slot(player) {
                    streak = 0;
                } else {
                    streak += 1;
                    if streak >= 2 {
                        return true;
                    }
                }
            }
            false
        })
        .cloned()
        .collect()
}
