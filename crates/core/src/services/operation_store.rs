use serde_json::json;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::backend::traits::RemoteTable;
use crate::errors::CoreError;
use crate::models::operation::{OperationId, TradeRecord};
use crate::models::session::Session;
use super::instrument::Instrument;
use super::notifier::Notifier;

/// Column the backend orders fetches by (newest first).
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Create/read/delete of one instrument class against the remote backend.
///
/// - **Reads fail soft**: a backend error is logged, the user is notified and
///   an empty list comes back. Rows that fail boundary validation are skipped.
/// - **Writes fail loud**: create and remove return the error so the caller
///   can leave its state untouched and tell the user.
pub struct OperationStore<I: Instrument> {
    backend: Arc<dyn RemoteTable>,
    notifier: Arc<dyn Notifier>,
    _instrument: PhantomData<I>,
}

impl<I: Instrument> OperationStore<I> {
    pub fn new(backend: Arc<dyn RemoteTable>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            _instrument: PhantomData,
        }
    }

    /// All operations of this class, most recently created first.
    /// Never fails; see [`Self::try_fetch_all`] for the error-returning form.
    pub async fn fetch_all(&self, session: Option<&Session>) -> Vec<I::Operation> {
        match self.try_fetch_all(session).await {
            Ok(operations) => operations,
            Err(e) => {
                tracing::error!(table = I::TABLE, backend = self.backend.name(), error = %e, "failed to load operations");
                self.notifier
                    .error(&format!("Failed to load {} operations", I::CLASS));
                Vec::new()
            }
        }
    }

    /// Like [`Self::fetch_all`] but returns backend failures to the caller.
    pub async fn try_fetch_all(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<I::Operation>, CoreError> {
        let rows = self
            .backend
            .select_all(I::TABLE, CREATED_AT_COLUMN, session)
            .await?;
        let total = rows.len();
        let operations: Vec<I::Operation> = rows
            .into_iter()
            .filter_map(|row| match I::from_row(row) {
                Ok(op) => Some(op),
                Err(e) => {
                    tracing::warn!(table = I::TABLE, error = %e, "skipping malformed row");
                    None
                }
            })
            .collect();
        tracing::debug!(table = I::TABLE, loaded = operations.len(), total, "operations loaded");
        Ok(operations)
    }

    /// Validate the draft, derive profit (and ROI), submit it and return the
    /// record as the backend stored it.
    pub async fn create(
        &self,
        session: &Session,
        draft: &I::Draft,
    ) -> Result<I::Operation, CoreError> {
        I::validate(draft)?;
        let row = I::insert_row(draft, Some(session.user_id()))?;

        let stored = self
            .backend
            .insert(I::TABLE, row, Some(session))
            .await
            .inspect_err(|e| {
                tracing::error!(table = I::TABLE, error = %e, "failed to save operation");
            })?;
        let operation = I::from_row(stored)?;

        tracing::info!(table = I::TABLE, id = %operation.id(), "operation created");
        Ok(operation)
    }

    /// Delete exactly the record with `id`.
    ///
    /// Dependent rows are cleared first through the class's stored procedure;
    /// that step is best-effort and never blocks the delete itself.
    pub async fn remove(&self, session: &Session, id: &OperationId) -> Result<(), CoreError> {
        self.clear_dependents(session, id).await;

        let deleted = self
            .backend
            .delete_by_id(I::TABLE, id.as_str(), Some(session))
            .await
            .inspect_err(|e| {
                tracing::error!(table = I::TABLE, %id, error = %e, "failed to remove operation");
            })?;

        if deleted == 0 {
            tracing::warn!(table = I::TABLE, %id, "operation not found on delete");
            return Err(CoreError::OperationNotFound(id.to_string()));
        }

        tracing::info!(table = I::TABLE, %id, "operation removed");
        Ok(())
    }

    async fn clear_dependents(&self, session: &Session, id: &OperationId) {
        let args = json!({ "operation_uuid": id.as_str() });
        if let Err(e) = self
            .backend
            .rpc(I::DEPENDENTS_FUNCTION, args, Some(session))
            .await
        {
            tracing::warn!(function = I::DEPENDENTS_FUNCTION, %id, error = %e, "could not clear dependent rows");
        }
    }
}
