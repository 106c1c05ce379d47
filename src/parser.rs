use csv::Reader;
use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::schedule::PlayerId;

/// One row of the roster sheet after cleanup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub available: bool,
    pub goalkeeper_quarters: Vec<u32>,
}

/// Players for a match plus any goalkeeper quarters pinned in the sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterFile {
    pub players: Vec<PlayerId>,
    /// Index `i` holds the pinned goalkeeper of quarter `i + 1`
    pub manual_goalkeepers: Vec<Option<PlayerId>>,
}

/// Parses a boolean value from various string representations. Empty means yes.
fn parse_available(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower.is_empty() || lower == "yes" || lower == "true" || lower == "1" || lower == "y"
}

/// Parses a comma-separated list of quarter numbers such as "1, 3"
fn parse_quarters(player: &str, value: &str) -> Result<Vec<u32>, RosterError> {
    let mut quarters = Vec::new();
    for part in value.split(',') {
        let trimmed = part.trim().trim_start_matches(['Q', 'q']);
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<u32>() {
            Ok(q) if q >= 1 => quarters.push(q),
            _ => {
                return Err(RosterError::InvalidGoalkeeperQuarter {
                    player: player.to_string(),
                    quarter: part.trim().to_string(),
                })
            }
        }
    }
    quarters.sort();
    quarters.dedup();
    Ok(quarters)
}

/// Loads roster entries from CSV. A repeated name replaces the earlier row.
pub fn load_roster_entries<P: AsRef<Path>>(csv_path: P) -> Result<Vec<RosterEntry>, RosterError> {
    let mut reader = Reader::from_path(csv_path)?;

    let headers = reader.headers()?.clone();
    let find = |needle: &str| {
        headers
            .iter()
            .position(|h| h.to_lowercase().contains(needle))
    };
    let name_col = find("name")
        .or_else(|| find("player"))
        .ok_or(RosterError::MissingNameColumn)?;
    let available_col = find("available");
    let goalkeeper_col = find("goalkeeper").or_else(|| find("gk"));

    // Keep first-seen order while letting later rows win
    let mut order: Vec<String> = Vec::new();
    let mut entries_map: HashMap<String, RosterEntry> = HashMap::new();

    for result in reader.records() {
        let record = result?;

        let name = record.get(name_col).unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }

        let available = available_col
            .map(|col| parse_available(record.get(col).unwrap_or("")))
            .unwrap_or(true);
        let goalkeeper_quarters = match goalkeeper_col {
            Some(col) => parse_quarters(&name, record.get(col).unwrap_or(""))?,
            None => Vec::new(),
        };

        if !entries_map.contains_key(&name) {
            order.push(name.clone());
        }
        entries_map.insert(
            name.clone(),
            RosterEntry {
                name,
                available,
                goalkeeper_quarters,
            },
        );
    }

    Ok(order
        .into_iter()
        .filter_map(|name| entries_map.remove(&name))
        .collect())
}

/// Loads the available players and their pinned goalkeeper quarters
pub fn load_roster<P: AsRef<Path>>(csv_path: P) -> Result<RosterFile, RosterError> {
    let entries = load_roster_entries(csv_path)?;
    Ok(roster_from_entries(&entries))
}

pub fn roster_from_entries(entries: &[RosterEntry]) -> RosterFile {
    let mut roster = RosterFile::default();
    for entry in entries.iter().filter(|e| e.available) {
        roster.players.push(entry.name.clone());
        for &quarter in &entry.goalkeeper_quarters {
            let index = quarter as usize - 1;
            if roster.manual_goalkeepers.len() <= index {
                roster.manual_goalkeepers.resize(index + 1, None);
            }
            roster.manual_goalkeepers[index] = Some(entry.name.clone());
        }
    }
    roster
}
