//! Test doubles for the router's external collaborators.
//!
//! Used by this crate's own suites and by embedders that want to exercise
//! routing logic without a real store or environment manager.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use serde_json::Value;

use rtriage_event::Document;
use rtriage_helpers::{BuildError, Term};

use crate::environment::{EnvironmentError, EnvironmentManager};
use crate::route::FilterBuilder;
use crate::store::{Store, StoreError};

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore::default()
    }

    /// Direct read for assertions.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }
}

impl Store for MemStore {
    fn get(&self, key: &str) -> Result<Value, StoreError> {
        self.entries
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError(format!("key '{key}' not found")))
    }

    fn update(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Environment manager that records every call.
#[derive(Debug, Default)]
pub struct RecordingEnvironments {
    added: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    forwarded: Mutex<Vec<(String, usize, Document)>>,
    rejected: Mutex<HashSet<String>>,
}

impl RecordingEnvironments {
    pub fn new() -> Self {
        RecordingEnvironments::default()
    }

    /// Make future reservations of `name` fail.
    pub fn reject(&self, name: &str) {
        self.rejected.lock().insert(name.to_string());
    }

    pub fn added(&self) -> Vec<String> {
        self.added.lock().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }

    /// `(target, worker, event)` tuples in forwarding order.
    pub fn forwarded(&self) -> Vec<(String, usize, Document)> {
        self.forwarded.lock().clone()
    }

    pub fn forwarded_count(&self) -> usize {
        self.forwarded.lock().len()
    }
}

impl EnvironmentManager for RecordingEnvironments {
    fn add_environment(&self, name: &str) -> Result<(), EnvironmentError> {
        if self.rejected.lock().contains(name) {
            return Err(EnvironmentError(format!(
                "environment '{name}' rejected the reservation"
            )));
        }
        self.added.lock().push(name.to_string());
        Ok(())
    }

    fn delete_environment(&self, name: &str) -> Result<(), EnvironmentError> {
        self.deleted.lock().push(name.to_string());
        Ok(())
    }

    fn forward_event(&self, target: &str, worker: usize, event: Document) {
        self.forwarded
            .lock()
            .push((target.to_string(), worker, event));
    }
}

#[derive(Debug, Clone)]
enum FilterSpec {
    /// Accept when the field at the pointer path equals the value.
    FieldEquals(String, Value),
    /// Accept every event.
    AcceptAll,
}

/// Filter builder backed by a name → filter table.
///
/// Every `build` call returns a fresh term instance, honoring the
/// per-worker replica contract.
#[derive(Debug, Default)]
pub struct TableFilterBuilder {
    filters: Mutex<HashMap<String, FilterSpec>>,
}

impl TableFilterBuilder {
    pub fn new() -> Self {
        TableFilterBuilder::default()
    }

    /// Register a filter accepting events where `path` equals `expected`.
    pub fn insert_match(&self, route: &str, path: &str, expected: Value) {
        self.filters.lock().insert(
            route.to_string(),
            FilterSpec::FieldEquals(path.to_string(), expected),
        );
    }

    /// Register a filter accepting every event.
    pub fn insert_accept_all(&self, route: &str) {
        self.filters
            .lock()
            .insert(route.to_string(), FilterSpec::AcceptAll);
    }
}

impl FilterBuilder for TableFilterBuilder {
    fn build(&self, route_name: &str) -> Result<Term, BuildError> {
        let spec = self
            .filters
            .lock()
            .get(route_name)
            .cloned()
            .ok_or_else(|| BuildError::InvalidParameter {
                helper: route_name.to_string(),
                detail: "no filter definition for this route".to_string(),
            })?;
        let name = format!("route_filter({route_name})");
        match spec {
            FilterSpec::AcceptAll => Ok(Term::new(
                name,
                |_: &mut Document| -> Result<(), String> { Ok(()) },
            )),
            FilterSpec::FieldEquals(path, expected) => Ok(Term::new(
                name,
                move |event: &mut Document| -> Result<(), String> {
                    if event.get(&path) == Some(&expected) {
                        Ok(())
                    } else {
                        Err("the filter did not match".to_string())
                    }
                },
            )),
        }
    }
}
