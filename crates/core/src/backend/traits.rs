use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CoreError;
use crate::models::session::Session;

/// Trait abstraction over the remote relational store.
///
/// Rows cross this seam as untyped JSON objects; each caller maps them to
/// its own record type and validates them there. The REST backend and the
/// in-process backend both implement it, so services never know which one
/// they are talking to.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// All visible rows of `table`, newest `order_by` first.
    async fn select_all(
        &self,
        table: &str,
        order_by_desc: &str,
        session: Option<&Session>,
    ) -> Result<Vec<Value>, CoreError>;

    /// The row of `table` whose `id` matches, if any.
    async fn select_by_id(
        &self,
        table: &str,
        id: &str,
        session: Option<&Session>,
    ) -> Result<Option<Value>, CoreError>;

    /// Insert one row and return it as stored (with server-assigned columns).
    async fn insert(
        &self,
        table: &str,
        row: Value,
        session: Option<&Session>,
    ) -> Result<Value, CoreError>;

    /// Merge `patch` into the row with the given `id`; returns the updated row.
    async fn update_by_id(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        session: Option<&Session>,
    ) -> Result<Value, CoreError>;

    /// Delete the row with the given `id`; returns how many rows were removed.
    async fn delete_by_id(
        &self,
        table: &str,
        id: &str,
        session: Option<&Session>,
    ) -> Result<usize, CoreError>;

    /// Invoke a stored procedure.
    async fn rpc(
        &self,
        function: &str,
        args: Value,
        session: Option<&Session>,
    ) -> Result<Value, CoreError>;
}
