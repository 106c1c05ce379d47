use std::fs::File;
use std::io::{self, Write};

use crate::schedule::{
    calculate_variance, get_player_quarter_breakdown, get_subs_for_quarter, Allocation, PlayerId,
};

/// Formats a slot label such as "DEF (first, 5')" or "GK (10')"
pub fn format_slot_label(position: &str, wave: Option<&str>, minutes: u32) -> String {
    match wave {
        Some(wave) => format!("{} ({}, {}')", position, wave, minutes),
        None => format!("{} ({}')", position, minutes),
    }
}

/// Writes the whole allocation as plain text: quarter lists, subs, per-player grid
pub fn write_allocation<W: Write>(
    out: &mut W,
    title: &str,
    allocation: &Allocation,
    roster: &[PlayerId],
) -> io::Result<()> {
    writeln!(out, "** {} **", title)?;

    for quarter in allocation.quarters() {
        writeln!(out, "\nQuarter {}", quarter.quarter_number)?;
        for (i, slot) in quarter.slots.iter().enumerate() {
            let label = format_slot_label(
                slot.position.as_str(),
                slot.wave.map(|w| w.as_str()),
                slot.minutes_allocated,
            );
            writeln!(out, "  [{}] {:<18} {}", i, label, slot.player)?;
        }
        let subs = get_subs_for_quarter(allocation, quarter.quarter_number, roster).unwrap_or_default();
        if subs.is_empty() {
            writeln!(out, "  Subs: none")?;
        } else {
            writeln!(out, "  Subs: {}", subs.join(", "))?;
        }
    }

    writeln!(out, "\nPlayer breakdown:")?;
    for player in allocation.summary().keys() {
        let labels: Vec<String> = get_player_quarter_breakdown(allocation, player)
            .iter()
            .map(|l| format!("{:>4}", l.to_string()))
            .collect();
        writeln!(
            out,
            "  {:<16}{} | {:>3} min",
            player,
            labels.join(""),
            allocation.total_minutes(player)
        )?;
    }

    let stats = calculate_variance(allocation);
    writeln!(
        out,
        "\nMinutes: min {} / max {} / mean {:.1} / range {}",
        stats.min, stats.max, stats.mean, stats.variance
    )?;

    if !allocation.warnings().is_empty() {
        writeln!(out, "\n⚠️  Warnings ({}):", allocation.warnings().len())?;
        for warning in allocation.warnings() {
            writeln!(out, "  - {}", warning)?;
        }
    }
    Ok(())
}

/// Prints an allocation in a readable format
pub fn print_allocation(title: &str, allocation: &Allocation, roster: &[PlayerId]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle)?;
    write_allocation(&mut handle, title, allocation, roster)
}

/// Writes the same text as `print_allocation` to a file
pub fn write_allocation_to_file(
    title: &str,
    allocation: &Allocation,
    roster: &[PlayerId],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;
    write_allocation(&mut file, title, allocation, roster)?;
    Ok(())
}
