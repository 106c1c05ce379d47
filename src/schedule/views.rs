use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::AllocationError;
use super::types::{Allocation, PlayerId};

/// What a player did in one quarter, for grid display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterLabel {
    Goalkeeper,
    Minutes(u32),
    Sub,
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuarterLabel::Goalkeeper => f.write_str("GK"),
            QuarterLabel::Minutes(m) => write!(f, "{}", m),
            QuarterLabel::Sub => f.write_str("sub"),
        }
    }
}

impl Serialize for QuarterLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Roster players without any slot in the quarter, in roster order
pub fn get_subs_for_quarter(
    allocation: &Allocation,
    quarter_number: u32,
    roster: &[PlayerId],
) -> Result<Vec<PlayerId>, AllocationError> {
    let quarter = allocation
        .quarter(quarter_number)
        .ok_or(AllocationError::QuarterNotFound(quarter_number))?;
    Ok(roster
        .iter()
        .filter(|p| !quarter.holds_slot(p))
        .cloned()
        .collect())
}

pub fn get_player_quarter_breakdown(allocation: &Allocation, player: &str) -> Vec<QuarterLabel> {
    allocation
        .quarters()
        .iter()
        .map(|quarter| {
            let slots: Vec<_> = quarter.slots.iter().filter(|s| s.player == player).collect();
            if slots.iter().any(|s| s.is_goalkeeper()) {
                QuarterLabel::Goalkeeper
            } else if slots.is_empty() {
                QuarterLabel::Sub
            } else {
                QuarterLabel::Minutes(slots.iter().map(|s| s.minutes_allocated).sum())
            }
        })
        .collect()
}
