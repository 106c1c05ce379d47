use std::collections::HashMap;

use super::types::{PlayerId, PlayerSlot, QuarterAllocation, Wave};

/// Running totals for one player within a single generation attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTally {
    pub total_minutes: u32,
    pub goalkeeper_quarters: u32,
    /// First-wave outfield slots received
    pub primary_outfield_blocks: u32,
    pub benched_last_quarter: bool,
}

impl PlayerTally {
    /// Has kept goal but still owes a first-wave outfield block
    pub fn needs_outfield_credit(&self) -> bool {
        self.goalkeeper_quarters > 0 && self.primary_outfield_blocks == 0
    }
}

/// Accumulator threaded through the quarters of one attempt. Never reused across attempts.
#[derive(Debug, Clone, Default)]
pub struct PlayerCounters {
    tallies: HashMap<PlayerId, PlayerTally>,
}

impl PlayerCounters {
    pub fn new(roster: &[PlayerId]) -> Self {
        PlayerCounters {
            tallies: roster.iter().map(|p| (p.clone(), PlayerTally::default())).collect(),
        }
    }

    pub fn get(&self, player: &str) -> PlayerTally {
        self.tallies.get(player).copied().unwrap_or_default()
    }

    /// Credits a freshly assigned slot to its player
    pub fn record(&mut self, slot: &PlayerSlot) {
        let tally = self.tallies.entry(slot.player.clone()).or_default();
        tally.total_minutes += slot.minutes_allocated;
        if slot.is_goalkeeper() {
            tally.goalkeeper_quarters += 1;
        } else if slot.wave == Some(Wave::First) {
            tally.primary_outfield_blocks += 1;
        }
    }

    /// Marks who sat out the quarter that was just built
    pub fn end_quarter(&mut self, quarter: &QuarterAllocation) {
        for (player, tally) in self.tallies.iter_mut() {
            tally.benched_last_quarter = !quarter.holds_slot(player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::Position;

    #[test]
    fn test_record_updates_each_counter() {
        let roster = vec!["Ada".to_string(), "Ben".to_string()];
        let mut counters = PlayerCounters::new(&roster);

        counters.record(&PlayerSlot::goalkeeper("Ada", 10));
        assert!(counters.get("Ada").needs_outfield_credit());

        counters.record(&PlayerSlot::outfield("Ada", Position::Def, Wave::First, 5));
        counters.record(&PlayerSlot::outfield("Ben", Position::Att, Wave::Second, 5));

        let ada = counters.get("Ada");
        assert_eq!(ada.total_minutes, 15);
        assert_eq!(ada.goalkeeper_quarters, 1);
        assert_eq!(ada.primary_outfield_blocks, 1);
        assert!(!ada.needs_outfield_credit());

        let ben = counters.get("Ben");
        assert_eq!(ben.total_minutes, 5);
        assert_eq!(ben.primary_outfield_blocks, 0);
    }

    #[test]
    fn test_end_quarter_marks_bench() {
        let roster = vec!["Ada".to_string(), "Ben".to_string()];
        let mut counters = PlayerCounters::new(&roster);
        let quarter = QuarterAllocation {
            quarter_number: 1,
            slots: vec![PlayerSlot::goalkeeper("Ada", 10)],
        };
        counters.end_quarter(&quarter);
        assert!(!counters.get("Ada").benched_last_quarter);
        assert!(counters.get("Ben").benched_last_quarter);
    }
}
