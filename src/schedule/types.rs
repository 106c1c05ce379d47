use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Player identifier as supplied by the roster
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Gk,
    Def,
    Att,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Gk => "GK",
            Position::Def => "DEF",
            Position::Att => "ATT",
        }
    }

    pub fn parse(value: &str) -> Option<Position> {
        match value.trim().to_uppercase().as_str() {
            "GK" => Some(Position::Gk),
            "DEF" => Some(Position::Def),
            "ATT" => Some(Position::Att),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outfield sub-period of a quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wave {
    First,
    Second,
}

impl Wave {
    pub fn as_str(&self) -> &'static str {
        match self {
            Wave::First => "first",
            Wave::Second => "second",
        }
    }

    pub fn parse(value: &str) -> Option<Wave> {
        match value.trim().to_lowercase().as_str() {
            "first" => Some(Wave::First),
            "second" => Some(Wave::Second),
            _ => None,
        }
    }
}

/// One player assigned to one position for a fixed number of minutes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub player: PlayerId,
    pub position: Position,
    pub minutes_allocated: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave: Option<Wave>,
}

impl PlayerSlot {
    pub fn goalkeeper(player: &str, minutes: u32) -> Self {
        PlayerSlot {
            player: player.to_string(),
            position: Position::Gk,
            minutes_allocated: minutes,
            wave: None,
        }
    }

    pub fn outfield(player: &str, position: Position, wave: Wave, minutes: u32) -> Self {
        PlayerSlot {
            player: player.to_string(),
            position,
            minutes_allocated: minutes,
            wave: Some(wave),
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        self.position == Position::Gk
    }
}

/// Slots for a single quarter, in assignment order (GK, first wave, second wave)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterAllocation {
    pub quarter_number: u32,
    pub slots: Vec<PlayerSlot>,
}

impl QuarterAllocation {
    pub fn count(&self, position: Position) -> usize {
        self.slots.iter().filter(|s| s.position == position).count()
    }

    /// Distinct players holding at least one slot this quarter
    pub fn players(&self) -> BTreeSet<&str> {
        self.slots.iter().map(|s| s.player.as_str()).collect()
    }

    pub fn holds_slot(&self, player: &str) -> bool {
        self.slots.iter().any(|s| s.player == player)
    }

    pub fn goalkeepers(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|s| s.is_goalkeeper())
            .map(|s| s.player.as_str())
    }
}

/// A computed match schedule. The summary is always derived from the quarters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AllocationData")]
pub struct Allocation {
    quarters: Vec<QuarterAllocation>,
    roster: Vec<PlayerId>,
    summary: BTreeMap<PlayerId, u32>,
    warnings: Vec<String>,
}

/// Wire shape of an allocation; any stored summary is ignored and rebuilt
#[derive(Deserialize)]
struct AllocationData {
    quarters: Vec<QuarterAllocation>,
    #[serde(default)]
    roster: Vec<PlayerId>,
    #[serde(default)]
    warnings: Vec<String>,
}

impl From<AllocationData> for Allocation {
    fn from(data: AllocationData) -> Self {
        let mut allocation = Allocation {
            quarters: data.quarters,
            roster: data.roster,
            summary: BTreeMap::new(),
            warnings: data.warnings,
        };
        allocation.recompute_summary();
        allocation
    }
}

impl Allocation {
    /// Builds an allocation; every roster player appears in the summary, even with 0 minutes.
    pub fn new(quarters: Vec<QuarterAllocation>, roster: &[PlayerId]) -> Self {
        let mut allocation = Allocation {
            quarters,
            roster: roster.to_vec(),
            summary: BTreeMap::new(),
            warnings: Vec::new(),
        };
        allocation.recompute_summary();
        allocation
    }

    pub fn quarters(&self) -> &[QuarterAllocation] {
        &self.quarters
    }

    pub fn quarter(&self, quarter_number: u32) -> Option<&QuarterAllocation> {
        self.quarters.iter().find(|q| q.quarter_number == quarter_number)
    }

    pub(crate) fn quarter_mut(&mut self, quarter_number: u32) -> Option<&mut QuarterAllocation> {
        self.quarters.iter_mut().find(|q| q.quarter_number == quarter_number)
    }

    /// Players the allocation was generated for
    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    pub fn summary(&self) -> &BTreeMap<PlayerId, u32> {
        &self.summary
    }

    pub fn total_minutes(&self, player: &str) -> u32 {
        self.summary.get(player).copied().unwrap_or(0)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub(crate) fn clear_warnings(&mut self) {
        self.warnings.clear();
    }

    /// Re-sums minutes from the slots: roster players (0 when benched all match)
    /// plus whoever currently holds a slot.
    pub(crate) fn recompute_summary(&mut self) {
        let mut summary: BTreeMap<PlayerId, u32> =
            self.roster.iter().map(|p| (p.clone(), 0)).collect();
        for slot in self.quarters.iter().flat_map(|q| &q.slots) {
            *summary.entry(slot.player.clone()).or_insert(0) += slot.minutes_allocated;
        }
        self.summary = summary;
    }
}
