//! SQLite persistence for the audit log.

use crate::{Event, Result, VaultId};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, named_params};
use std::path::Path;

/// One append-only table. `seq` fixes the audit order independently of
/// timestamp resolution; `kind` duplicates the serde tag so the common
/// "show me the spends" query never touches the JSON body.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS audit_log (
    seq       INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id  TEXT NOT NULL UNIQUE,
    vault_id  TEXT NOT NULL,
    at        TEXT NOT NULL,
    kind      TEXT NOT NULL,
    body      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS audit_log_by_vault ON audit_log (vault_id, seq);
"#;

/// Handle to the audit database.
pub struct EventStore {
    conn: Connection,
}

/// One row of [`EventStore::list_vaults`].
#[derive(Debug, Clone)]
pub struct VaultSummary {
    pub id: VaultId,
    pub opened_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub event_count: usize,
}

impl EventStore {
    /// Open the audit database at `path`, creating it (and the schema) if
    /// absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_conn(Connection::open(path)?)
    }

    /// A throwaway database for tests.
    pub fn in_memory() -> Result<Self> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Append one event. The caller decides when appending is correct; in
    /// particular the engine only appends once an atomic unit commits.
    pub fn append(&self, event: &Event) -> Result<()> {
        let body = serde_json::to_string(&event.kind)?;
        self.conn.execute(
            "INSERT INTO audit_log (event_id, vault_id, at, kind, body)
             VALUES (:event_id, :vault_id, :at, :kind, :body)",
            named_params! {
                ":event_id": event.id.to_string(),
                ":vault_id": event.vault_id.to_string(),
                ":at": event.timestamp.to_rfc3339(),
                ":kind": event.kind.name(),
                ":body": body,
            },
        )?;
        Ok(())
    }

    /// A vault's history in audit order, optionally restricted to one kind
    /// name (e.g. `"spend_recorded"`).
    pub fn load_events(&self, vault_id: VaultId, kind: Option<&str>) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT event_id, at, body FROM audit_log
             WHERE vault_id = :vault_id AND (:kind IS NULL OR kind = :kind)
             ORDER BY seq",
        )?;
        let rows = stmt.query_map(
            named_params! { ":vault_id": vault_id.to_string(), ":kind": kind },
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;

        let mut events = Vec::new();
        for row in rows {
            let (event_id, at, body) = row?;
            // Rows a newer schema wrote with kinds this build does not
            // know are skipped rather than failing the whole read.
            if let Some(event) = decode_row(vault_id, &event_id, &at, &body) {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Every vault the database knows about, newest first, with its
    /// activity span.
    pub fn list_vaults(&self) -> Result<Vec<VaultSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT vault_id, MIN(at), MAX(at), COUNT(*) FROM audit_log
             GROUP BY vault_id ORDER BY MIN(seq) DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (vault_id, opened_at, last_activity, event_count) = row?;
            let (Ok(id), Ok(opened_at), Ok(last_activity)) = (
                vault_id.parse(),
                opened_at.parse::<DateTime<Utc>>(),
                last_activity.parse::<DateTime<Utc>>(),
            ) else {
                continue;
            };
            summaries.push(VaultSummary {
                id: VaultId(id),
                opened_at,
                last_activity,
                event_count: event_count as usize,
            });
        }
        Ok(summaries)
    }
}

fn decode_row(vault_id: VaultId, event_id: &str, at: &str, body: &str) -> Option<Event> {
    Some(Event {
        id: event_id.parse().ok()?,
        vault_id,
        timestamp: at.parse().ok()?,
        kind: serde_json::from_str(body).ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;
    use policy::Address;

    #[test]
    fn append_and_load_roundtrip() {
        let store = EventStore::in_memory().unwrap();
        let vault_id = VaultId::new();

        store
            .append(&Event::new(
                vault_id,
                EventKind::VaultOpened {
                    principal: Address([0x11; 20]),
                    delegate: Address([0x22; 20]),
                },
            ))
            .unwrap();
        store
            .append(&Event::new(
                vault_id,
                EventKind::SpendRecorded {
                    asset: Address::NATIVE,
                    amount: 40,
                    spent_in_window: 90,
                },
            ))
            .unwrap();

        let events = store.load_events(vault_id, None).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].kind, EventKind::VaultOpened { .. }));
        assert!(matches!(
            events[1].kind,
            EventKind::SpendRecorded { amount: 40, spent_in_window: 90, .. }
        ));
    }

    #[test]
    fn kind_filter() {
        let store = EventStore::in_memory().unwrap();
        let vault_id = VaultId::new();

        store
            .append(&Event::new(
                vault_id,
                EventKind::AssetTracked { asset: Address::NATIVE },
            ))
            .unwrap();
        store
            .append(&Event::new(
                vault_id,
                EventKind::BatchExecuted { operations: 3 },
            ))
            .unwrap();

        let events = store.load_events(vault_id, Some("batch_executed")).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].kind, EventKind::BatchExecuted { operations: 3 }));

        let events = store.load_events(vault_id, Some("spend_recorded")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn vault_listing_groups_by_vault() {
        let store = EventStore::in_memory().unwrap();
        let first = VaultId::new();
        let second = VaultId::new();

        for vault_id in [first, first, second] {
            store
                .append(&Event::new(
                    vault_id,
                    EventKind::AssetTracked { asset: Address::NATIVE },
                ))
                .unwrap();
        }

        let summaries = store.list_vaults().unwrap();
        assert_eq!(summaries.len(), 2);
        let counts: Vec<usize> = summaries.iter().map(|s| s.event_count).collect();
        assert!(counts.contains(&2) && counts.contains(&1));
    }

    #[test]
    fn events_for_other_vaults_are_not_returned() {
        let store = EventStore::in_memory().unwrap();
        let ours = VaultId::new();
        let theirs = VaultId::new();

        store
            .append(&Event::new(
                theirs,
                EventKind::AssetTracked { asset: Address::NATIVE },
            ))
            .unwrap();

        assert!(store.load_events(ours, None).unwrap().is_empty());
    }
}
