use chrono::Utc;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::operation::{OperationId, TradeRecord};
use crate::models::session::Session;
use super::instrument::Instrument;
use super::notifier::Notifier;
use super::operation_store::OperationStore;

/// Load state of an operation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// A fetch is in progress (initial state)
    Loading,
    /// The list reflects the last fetch plus any writes since
    Ready,
}

/// What a successful `remove` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The backend deleted the record
    Removed,
    /// The backend no longer had the record; it was dropped locally anyway
    AlreadyGone,
}

const EXPIRED_PREFIX: &str = "Your session has expired; sign in again to";

/// Puts the load state back to `Ready` however the refresh ends.
struct ReadyOnDrop<'a>(&'a mut LoadState);

impl Drop for ReadyOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = LoadState::Ready;
    }
}

/// In-memory list of one instrument class for the current session.
///
/// The backend is the system of record; this list is a cache kept in step
/// with it. Every mutating method takes `&mut self`, so calls on one
/// container are serialized and a slow refresh can never land on top of a
/// later add/remove. A failed write leaves the list exactly as it was.
pub struct OperationState<I: Instrument> {
    store: OperationStore<I>,
    notifier: Arc<dyn Notifier>,
    operations: Vec<I::Operation>,
    state: LoadState,
}

impl<I: Instrument> std::fmt::Debug for OperationState<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationState")
            .field("class", &I::CLASS)
            .field("operations", &self.operations.len())
            .field("state", &self.state)
            .finish()
    }
}

impl<I: Instrument> OperationState<I> {
    pub fn new(store: OperationStore<I>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            operations: Vec::new(),
            state: LoadState::Loading,
        }
    }

    /// Reload the list from the backend, replacing it wholesale.
    ///
    /// Without a session there is nothing to show: the list is cleared. An
    /// expired session clears it too, with the same notice writes give. If
    /// the returned future is dropped mid-fetch the list keeps its previous
    /// contents and the state still returns to `Ready`.
    pub async fn refresh(&mut self, session: Option<&Session>) {
        let session = match session {
            Some(s) if s.is_expired(Utc::now()) => {
                self.notifier
                    .error(&format!("{EXPIRED_PREFIX} load operations"));
                None
            }
            other => other,
        };

        let Self {
            store,
            operations,
            state,
            ..
        } = self;
        *state = LoadState::Loading;
        let _ready = ReadyOnDrop(state);
        *operations = match session {
            Some(session) => store.fetch_all(Some(session)).await,
            None => Vec::new(),
        };
    }

    /// Persist a new operation and prepend the confirmed record.
    pub async fn add(
        &mut self,
        session: Option<&Session>,
        draft: &I::Draft,
    ) -> Result<I::Operation, CoreError> {
        let session = self.require_session(session, "add operations")?;

        match self.store.create(session, draft).await {
            Ok(operation) => {
                self.operations.insert(0, operation.clone());
                self.notifier.success("Operation added");
                Ok(operation)
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Delete an operation; it leaves the list only once the backend agrees
    /// (or reports it was already gone).
    pub async fn remove(
        &mut self,
        session: Option<&Session>,
        id: &OperationId,
    ) -> Result<RemoveOutcome, CoreError> {
        let session = self.require_session(session, "remove operations")?;

        match self.store.remove(session, id).await {
            Ok(()) => {
                self.operations.retain(|op| op.id() != id);
                self.notifier.success("Operation removed");
                Ok(RemoveOutcome::Removed)
            }
            Err(e) if e.is_not_found() => {
                self.operations.retain(|op| op.id() != id);
                self.notifier
                    .warning("Operation was already removed elsewhere");
                Ok(RemoveOutcome::AlreadyGone)
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn require_session<'s>(
        &self,
        session: Option<&'s Session>,
        action: &str,
    ) -> Result<&'s Session, CoreError> {
        let Some(session) = session else {
            let message = format!("You need to be signed in to {action}");
            self.notifier.error(&message);
            return Err(CoreError::Unauthenticated(message));
        };
        if session.is_expired(Utc::now()) {
            let message = format!("{EXPIRED_PREFIX} {action}");
            self.notifier.error(&message);
            return Err(CoreError::Unauthenticated(message));
        }
        Ok(session)
    }

    /// Current list, most recently created first.
    #[must_use]
    pub fn operations(&self) -> &[I::Operation] {
        &self.operations
    }

    #[must_use]
    pub fn get(&self, id: &OperationId) -> Option<&I::Operation> {
        self.operations.iter().find(|op| op.id() == id)
    }

    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
