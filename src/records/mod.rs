pub mod rows;
pub mod export;

pub use rows::{from_rows, to_rows, LineupRow};
pub use export::{read_lineup_csv, write_lineup_csv, write_lineup_to};
