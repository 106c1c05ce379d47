use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::StoreError;
use crate::schedule::{Allocation, PlayerId};
use super::rows::{from_rows, to_rows, LineupRow};

/// Writes one row per slot (quarter, position, wave, player, minutes) with a header
pub fn write_lineup_to<W: Write>(allocation: &Allocation, writer: W) -> Result<(), StoreError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in to_rows(allocation) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports an allocation to a CSV file, replacing any previous contents
pub fn write_lineup_csv<P: AsRef<Path>>(allocation: &Allocation, csv_path: P) -> Result<(), StoreError> {
    let file = std::fs::File::create(csv_path)?;
    write_lineup_to(allocation, file)
}

/// Reads a lineup CSV written by `write_lineup_csv`; the summary is rebuilt from the rows
pub fn read_lineup_csv<P: AsRef<Path>>(csv_path: P, roster: &[PlayerId]) -> Result<Allocation, StoreError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(csv_path)?;
    let rows = reader
        .deserialize::<LineupRow>()
        .collect::<Result<Vec<_>, _>>()?;
    from_rows(&rows, roster)
}
