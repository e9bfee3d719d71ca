//! Ledger helpers shared by the tracking service and the state repository.

use chrono::{DateTime, FixedOffset};
use shared::{DailyLedger, IntakeEntry};
use std::cmp::Ordering;

/// Largest single drink that can be recorded, independent of the daily total
pub const MAX_SINGLE_INTAKE_ML: i64 = 5000;

/// Storage positions of `entries` in display order (newest first)
///
/// Entries created at the same instant keep a deterministic order: the one
/// inserted later is shown first.
pub fn display_order(entries: &[IntakeEntry]) -> Vec<usize> {
    let parsed: Vec<Option<DateTime<FixedOffset>>> = entries
        .iter()
        .map(|entry| DateTime::parse_from_rfc3339(&entry.created_at).ok())
        .collect();

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| match parsed[b].cmp(&parsed[a]) {
        Ordering::Equal => b.cmp(&a),
        other => other,
    });
    order
}

/// Entries in display order, cloned
pub fn entries_for_display(ledger: &DailyLedger) -> Vec<IntakeEntry> {
    display_order(&ledger.entries)
        .into_iter()
        .map(|index| ledger.entries[index].clone())
        .collect()
}

/// Give entries saved before stable IDs existed a deterministic ID
///
/// Returns true if any entry was changed.
pub fn backfill_entry_ids(ledger: &mut DailyLedger) -> bool {
    let mut changed = false;
    for (index, entry) in ledger.entries.iter_mut().enumerate() {
        if entry.id.is_empty() {
            entry.id = format!("legacy-{}-{}", ledger.date, index);
            changed = true;
        }
    }
    changed
}

/// Percentage of the goal reached, capped at 100
pub fn progress_percent(total_ml: u32, goal_ml: Option<u32>) -> u32 {
    match goal_ml {
        Some(goal) if goal > 0 => {
            let percent = (f64::from(total_ml) * 100.0 / f64::from(goal)).round() as u32;
            percent.min(100)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, amount_ml: u32, created_at: &str) -> IntakeEntry {
        IntakeEntry {
            id: id.to_string(),
            amount_ml,
            time_label: created_at[11..16].to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_display_order_newest_first() {
        let entries = vec![
            entry("a", 100, "2025-01-20T08:00:00+00:00"),
            entry("b", 200, "2025-01-20T12:00:00+00:00"),
            entry("c", 300, "2025-01-20T10:00:00+00:00"),
        ];
        assert_eq!(display_order(&entries), vec![1, 2, 0]);
    }

    #[test]
    fn test_display_order_breaks_timestamp_ties_by_insertion() {
        let entries = vec![
            entry("a", 100, "2025-01-20T08:00:00+00:00"),
            entry("b", 200, "2025-01-20T08:00:00+00:00"),
            entry("c", 300, "2025-01-20T07:00:00+00:00"),
        ];
        assert_eq!(display_order(&entries), vec![1, 0, 2]);
    }

    #[test]
    fn test_backfill_is_deterministic() {
        let mut ledger = DailyLedger::new("2025-01-20");
        ledger.entries.push(entry("", 100, "2025-01-20T08:00:00+00:00"));
        ledger.entries.push(entry("kept", 100, "2025-01-20T09:00:00+00:00"));

        assert!(backfill_entry_ids(&mut ledger));
        assert_eq!(ledger.entries[0].id, "legacy-2025-01-20-0");
        assert_eq!(ledger.entries[1].id, "kept");
        assert!(!backfill_entry_ids(&mut ledger));
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(1000, Some(2000)), 50);
        assert_eq!(progress_percent(2500, Some(2000)), 100);
        assert_eq!(progress_percent(1000, None), 0);
        assert_eq!(progress_percent(1000, Some(0)), 0);
    }
}
