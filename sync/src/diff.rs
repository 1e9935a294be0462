//! Snapshot-vs-history diffing

use std::collections::HashSet;

use crate::record::Record;

/// Records present in the snapshot but absent from the history.
///
/// Comparison is textual record equality. Snapshot order is preserved and
/// duplicates in the snapshot are kept; history is treated as a set.
pub fn change_set(snapshot: Vec<Record>, history: &[Record]) -> Vec<Record> {
    let synchronized: HashSet<&Record> = history.iter().collect();
    snapshot
        .into_iter()
        .filter(|record| !synchronized.contains(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_returns_full_snapshot() {
        let snapshot = vec![
            Record::hashed("a.txt", "01"),
            Record::immutable("b.bin"),
        ];
        let changes = change_set(snapshot.clone(), &[]);
        assert_eq!(changes, snapshot);
    }

    #[test]
    fn test_identical_history_returns_nothing() {
        let records = vec![
            Record::hashed("a.txt", "01"),
            Record::immutable("b.bin"),
        ];
        assert!(change_set(records.clone(), &records).is_empty());
    }

    #[test]
    fn test_changed_hash_is_reported() {
        let snapshot = vec![Record::hashed("a.txt", "02")];
        let history = vec![Record::hashed("a.txt", "01")];
        assert_eq!(change_set(snapshot.clone(), &history), snapshot);
    }

    #[test]
    fn test_snapshot_order_preserved() {
        let snapshot = vec![
            Record::hashed("z.txt", "01"),
            Record::hashed("a.txt", "02"),
            Record::hashed("m.txt", "03"),
        ];
        let history = vec![Record::hashed("a.txt", "02")];
        let changes = change_set(snapshot, &history);
        assert_eq!(
            changes,
            vec![Record::hashed("z.txt", "01"), Record::hashed("m.txt", "03")]
        );
    }

    #[test]
    fn test_snapshot_duplicates_kept() {
        let snapshot = vec![
            Record::hashed("a.txt", "01"),
            Record::hashed("a.txt", "01"),
        ];
        let changes = change_set(snapshot, &[]);
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_history_entries_never_resurface() {
        // History keeps old record lines forever; only genuinely new text
        // shows up in the change set.
        let snapshot = vec![Record::hashed("a.txt", "02")];
        let history = vec![
            Record::hashed("a.txt", "01"),
            Record::hashed("a.txt", "02"),
        ];
        assert!(change_set(snapshot, &history).is_empty());
    }
}
