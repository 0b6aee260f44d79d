//! Order store seam and the bundled in-memory implementation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an order, as the store owner reports it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Served,
    Cancelled,
}

/// One order (or line item) record, referenced by scan key.
///
/// Owned by the store; the engine only reads it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Lookup key: a normalized order id or item SKU.
    pub key: String,
    /// Short human-readable description for the result surface.
    pub summary: String,
    pub status: OrderStatus,
}

/// Errors surfaced by an order store.
#[derive(thiserror::Error, Debug)]
pub enum OrderStoreError {
    #[error("order store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Keyed lookup into the external order system.
///
/// The contract is synchronous; implementations fronting an async service
/// should block internally and honor the caller's lookup budget
/// cooperatively, returning [`OrderStoreError::Unavailable`] when the
/// backing system cannot answer.
pub trait OrderStore {
    /// All records filed under `key`. Zero, one, or (when the store's own
    /// uniqueness invariant is broken) several.
    fn find(&self, key: &str) -> Result<Vec<OrderRecord>, OrderStoreError>;
}

/// Errors from loading or saving store snapshots.
#[derive(thiserror::Error, Debug)]
pub enum StoreIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// HashMap-backed store for tests, benches and single-process deployments.
#[derive(Clone, Debug, Default)]
pub struct InMemoryOrderStore {
    orders: HashMap<String, Vec<OrderRecord>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a record under its key.
    pub fn insert(&mut self, record: OrderRecord) {
        self.orders.entry(record.key.clone()).or_default().push(record);
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Load a JSON snapshot (an array of records) from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreIoError> {
        let raw = fs::read_to_string(path)?;
        let records: Vec<OrderRecord> = serde_json::from_str(&raw)?;
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        Ok(store)
    }

    /// Write the store contents to disk as a pretty JSON array.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), StoreIoError> {
        let mut records: Vec<&OrderRecord> = self.orders.values().flatten().collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl OrderStore for InMemoryOrderStore {
    fn find(&self, key: &str) -> Result<Vec<OrderRecord>, OrderStoreError> {
        Ok(self.orders.get(key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, summary: &str) -> OrderRecord {
        OrderRecord {
            key: key.to_owned(),
            summary: summary.to_owned(),
            status: OrderStatus::Open,
        }
    }

    #[test]
    fn find_returns_all_records_for_a_key() {
        let mut store = InMemoryOrderStore::new();
        store.insert(record("123456", "table 4"));
        store.insert(record("123456", "table 9"));
        store.insert(record("654321", "takeaway"));

        let hits = store.find("123456").expect("find");
        assert_eq!(hits.len(), 2);
        assert!(store.find("999999").expect("find").is_empty());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("orders.json");

        let mut store = InMemoryOrderStore::new();
        store.insert(record("123456", "table 4"));
        store.insert(OrderRecord {
            key: "BST-1009".to_owned(),
            summary: "flat white".to_owned(),
            status: OrderStatus::Served,
        });
        store.write_json(&path).expect("write");

        let loaded = InMemoryOrderStore::load_json(&path).expect("load");
        assert_eq!(loaded.len(), 2);
        let hit = &loaded.find("BST-1009").expect("find")[0];
        assert_eq!(hit.status, OrderStatus::Served);
        assert_eq!(hit.summary, "flat white");
    }
}
