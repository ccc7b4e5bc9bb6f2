//! Contract of the persisted-state backend.

use serde_json::Value;
use thiserror::Error;

/// Key under which the serialized route table is persisted.
pub const ROUTES_TABLE: &str = "internal/router_table";

/// An error reported by the store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// Key-value persisted state the router mirrors its table into.
///
/// The table is rewritten whole after every successful mutation; a failed
/// update is fatal to process integrity (see
/// [`Router`](crate::router::Router)).
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Value, StoreError>;
    fn update(&self, key: &str, value: Value) -> Result<(), StoreError>;
}
