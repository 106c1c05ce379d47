use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::schedule::{Allocation, PlayerId, PlayerSlot, Position, QuarterAllocation, Wave};

/// Flat storage shape of a single slot, one row per slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupRow {
    pub quarter: u32,
    pub position: String,
    #[serde(default)]
    pub wave: Option<String>,
    pub player: String,
    pub minutes: u32,
}

pub fn to_rows(allocation: &Allocation) -> Vec<LineupRow> {
    allocation
        .quarters()
        .iter()
        .flat_map(|q| {
            q.slots.iter().map(move |slot| LineupRow {
                quarter: q.quarter_number,
                position: slot.position.to_string(),
                wave: slot.wave.map(|w| w.as_str().to_string()),
                player: slot.player.clone(),
                minutes: slot.minutes_allocated,
            })
        })
        .collect()
}

/// Rebuilds an allocation from stored rows.
///
/// Quarters come back in ascending order; slots keep their row order within a quarter.
pub fn from_rows(rows: &[LineupRow], roster: &[PlayerId]) -> Result<Allocation, StoreError> {
    let mut quarters: BTreeMap<u32, Vec<PlayerSlot>> = BTreeMap::new();

    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 1;
        let position = Position::parse(&row.position).ok_or_else(|| StoreError::MalformedRow {
            row: row_number,
            message: format!("unknown position '{}'", row.position),
        })?;
        let wave = match row.wave.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Wave::parse(raw).ok_or_else(|| StoreError::MalformedRow {
                row: row_number,
                message: format!("unknown wave '{}'", raw),
            })?),
        };
        if position != Position::Gk && wave.is_none() {
            return Err(StoreError::MalformedRow {
                row: row_number,
                message: format!("{} slot without a wave", position),
            });
        }
        if row.player.trim().is_empty() {
            return Err(StoreError::MalformedRow {
                row: row_number,
                message: "empty player".to_string(),
            });
        }

        quarters.entry(row.quarter).or_default().push(PlayerSlot {
            player: row.player.trim().to_string(),
            position,
            minutes_allocated: row.minutes,
            wave: if position == Position::Gk { None } else { wave },
        });
    }

    let quarters = quarters
        .into_iter()
        .map(|(quarter_number, slots)| QuarterAllocation { quarter_number, slots })
        .collect();
    Ok(Allocation::new(quarters, roster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{allocate_with_rng, MatchConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rows_rebuild_same_allocation() {
        let roster: Vec<PlayerId> = (1..=9).map(|i| format!("P{}", i)).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let allocation = allocate_with_rng(&roster, &MatchConfig::default(), &[], &mut rng).unwrap();

        let rows = to_rows(&allocation);
        assert_eq!(rows.len(), 36);
        assert_eq!(rows[0].position, "GK");
        assert_eq!(rows[0].wave, None);

        let rebuilt = from_rows(&rows, &roster).unwrap();
        assert_eq!(rebuilt, allocation);
    }

    #[test]
    fn test_rows_out_of_order_are_grouped() {
        let rows = vec![
            LineupRow { quarter: 2, position: "GK".into(), wave: None, player: "B".into(), minutes: 10 },
            LineupRow { quarter: 1, position: "GK".into(), wave: None, player: "A".into(), minutes: 10 },
            LineupRow { quarter: 2, position: "DEF".into(), wave: Some("first".into()), player: "A".into(), minutes: 5 },
        ];
        let allocation = from_rows(&rows, &["A".to_string(), "B".to_string(), "C".to_string()]).unwrap();
        assert_eq!(allocation.quarters()[0].quarter_number, 1);
        assert_eq!(allocation.quarters()[1].slots.len(), 2);
        assert_eq!(allocation.total_minutes("A"), 15);
        assert_eq!(allocation.summary().get("C"), Some(&0));
    }

    #[test]
    fn test_malformed_rows() {
        let bad_position = vec![LineupRow { quarter: 1, position: "MID".into(), wave: Some("first".into()), player: "A".into(), minutes: 5 }];
        assert!(matches!(from_rows(&bad_position, &[]), Err(StoreError::MalformedRow { row: 1, .. })));

        let missing_wave = vec![LineupRow { quarter: 1, position: "ATT".into(), wave: None, player: "A".into(), minutes: 5 }];
        assert!(matches!(from_rows(&missing_wave, &[]), Err(StoreError::MalformedRow { row: 1, .. })));
    }
}
