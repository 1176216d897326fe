//! Holder-transition planning.
//!
//! Registry writes decide what the ledger should record by diffing the
//! stored holder against the requested one. The decision is pure so the
//! rules can be tested without a database; `asset_service` executes the
//! resulting action inside the write transaction.

/// Ledger consequence of a registry write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerAction {
    /// Nothing to record.
    None,
    /// Holder changed: append a transition entry.
    Append {
        previous: Option<i64>,
        new: Option<i64>,
        note: String,
    },
    /// Holder untouched but a note arrived: rewrite the note on the asset's
    /// newest entry. Dropped silently when the asset has no entries.
    AmendLatestNote(String),
}

/// Plan the ledger action for an update.
///
/// `requested` is the holder field from the patch: `None` when the field was
/// absent, `Some(None)` for an explicit unassign. The note only counts when
/// non-empty; an append absorbs it as the entry's initial note.
pub fn plan_update(
    stored: Option<i64>,
    requested: Option<Option<i64>>,
    note: Option<&str>,
) -> LedgerAction {
    let note = note.unwrap_or("");
    match requested {
        Some(new) if new != stored => LedgerAction::Append {
            previous: stored,
            new,
            note: note.to_string(),
        },
        _ if note.is_empty() => LedgerAction::None,
        _ => LedgerAction::AmendLatestNote(note.to_string()),
    }
}

/// Plan the ledger action for a registration. Only an initial holder
/// produces an entry; its `previous` side is always empty.
pub fn plan_create(holder: Option<i64>, note: Option<&str>) -> LedgerAction {
    match holder {
        Some(new) => LedgerAction::Append {
            previous: None,
            new: Some(new),
            note: note.unwrap_or("").to_string(),
        },
        None => LedgerAction::None,
    }
}
