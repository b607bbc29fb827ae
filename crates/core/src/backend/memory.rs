use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::session::Session;
use super::traits::RemoteTable;

/// In-process table store for offline use and tests.
///
/// Behaves like the REST backend where it matters: ids are UUID strings and
/// `created_at` timestamps are assigned on insert (strictly increasing, so
/// newest-first ordering is deterministic), deletes report how many rows went
/// away, and unknown stored procedures fail. Failures can be injected to
/// exercise the error paths of the services.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Value>>,
    functions: HashSet<String>,
    blocked_ids: HashSet<String>,
    last_created_at: Option<DateTime<Utc>>,
    offline: bool,
    rejected_writes: Option<String>,
    calls: Vec<String>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulate an unreachable backend: every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Make every insert/update/delete fail with the given backend message.
    pub fn reject_writes(&self, message: Option<String>) {
        self.lock().rejected_writes = message;
    }

    /// Refuse deletion of `id`, as a referential constraint would.
    pub fn block_delete(&self, id: impl Into<String>) {
        self.lock().blocked_ids.insert(id.into());
    }

    /// Make a stored procedure callable through `rpc`.
    pub fn register_function(&self, name: impl Into<String>) {
        self.lock().functions.insert(name.into());
    }

    /// Put a row in place without going through `insert` (no ids assigned).
    pub fn seed(&self, table: &str, row: Value) {
        self.lock().tables.entry(table.to_string()).or_default().push(row);
    }

    /// Snapshot of all rows of a table, in insertion order.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, Vec::len)
    }

    /// Log of calls made so far, as `"<kind> <target>"` strings.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

impl MemoryState {
    fn enter(&mut self, call: String) -> Result<(), CoreError> {
        self.calls.push(call);
        if self.offline {
            return Err(CoreError::Network("in-memory backend is offline".into()));
        }
        Ok(())
    }

    fn check_write(&self, table: &str) -> Result<(), CoreError> {
        match &self.rejected_writes {
            Some(message) => Err(CoreError::Backend {
                table: table.to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_created_at {
            Some(last) if last >= now => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(stamp);
        stamp
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn as_object(row: Value, table: &str) -> Result<Map<String, Value>, CoreError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::Backend {
            table: table.to_string(),
            message: format!("Row must be a JSON object, got {other}"),
        }),
    }
}

fn sort_key(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl RemoteTable for InMemoryBackend {
    fn name(&self) -> &str {
        "InMemory"
    }

    async fn select_all(
        &self,
        table: &str,
        order_by_desc: &str,
        _session: Option<&Session>,
    ) -> Result<Vec<Value>, CoreError> {
        let mut state = self.lock();
        state.enter(format!("select {table}"))?;
        let mut rows = state.tables.get(table).cloned().unwrap_or_default();
        // Stable sort on the reversed list: equal keys keep newest-inserted first.
        rows.reverse();
        rows.sort_by(|a, b| sort_key(b, order_by_desc).cmp(&sort_key(a, order_by_desc)));
        Ok(rows)
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &str,
        _session: Option<&Session>,
    ) -> Result<Option<Value>, CoreError> {
        let mut state = self.lock();
        state.enter(format!("select {table}/{id}"))?;
        Ok(state
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|r| row_id(r) == Some(id)))
            .cloned())
    }

    async fn insert(
        &self,
        table: &str,
        row: Value,
        _session: Option<&Session>,
    ) -> Result<Value, CoreError> {
        let mut state = self.lock();
        state.enter(format!("insert {table}"))?;
        state.check_write(table)?;

        let mut map = as_object(row, table)?;
        if !map.contains_key("id") {
            map.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        let created_at = state.next_created_at();
        map.insert(
            "created_at".into(),
            Value::String(created_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );

        let stored = Value::Object(map);
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update_by_id(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        _session: Option<&Session>,
    ) -> Result<Value, CoreError> {
        let mut state = self.lock();
        state.enter(format!("update {table}/{id}"))?;
        state.check_write(table)?;

        let patch = as_object(patch, table)?;
        let row = state
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
            .ok_or_else(|| CoreError::OperationNotFound(id.to_string()))?;
        if let Value::Object(existing) = row {
            for (key, value) in patch {
                existing.insert(key, value);
            }
        }
        Ok(row.clone())
    }

    async fn delete_by_id(
        &self,
        table: &str,
        id: &str,
        _session: Option<&Session>,
    ) -> Result<usize, CoreError> {
        let mut state = self.lock();
        state.enter(format!("delete {table}/{id}"))?;
        state.check_write(table)?;

        if state.blocked_ids.contains(id) {
            return Err(CoreError::DeleteBlocked {
                id: id.to_string(),
                message: "row is still referenced by dependent records".into(),
            });
        }

        let Some(rows) = state.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        Ok(before - rows.len())
    }

    async fn rpc(
        &self,
        function: &str,
        _args: Value,
        _session: Option<&Session>,
    ) -> Result<Value, CoreError> {
        let mut state = self.lock();
        state.enter(format!("rpc {function}"))?;
        if state.functions.contains(function) {
            Ok(Value::Null)
        } else {
            Err(CoreError::Backend {
                table: function.to_string(),
                message: format!("Could not find the function {function}"),
            })
        }
    }
}
