//! Per-handler view of a state snapshot, plus the write-lease gate's
//! synchronous/asynchronous split.

use std::cell::Cell;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::compiler::CompilerBackend;
use crate::state::{MetadataEntry, MetadataKey, StateEvent, StateHandle, StateSnapshot};

/// Read-only scope: a snapshot taken once at acquisition, with helpers that
/// consult the compiler backend. Disposal is a no-op.
pub struct ReadScope {
    pub snapshot: StateSnapshot,
    state: StateHandle,
    backend: Arc<dyn CompilerBackend>,
}

impl ReadScope {
    pub async fn acquire(state: &StateHandle, backend: Arc<dyn CompilerBackend>) -> Self {
        let snapshot = state.get_state().await;
        Self {
            snapshot,
            state: state.clone(),
            backend,
        }
    }

    pub fn backend(&self) -> &Arc<dyn CompilerBackend> {
        &self.backend
    }

    /// `DecompiledMetadataAdd` is monotone and commutative and therefore
    /// admitted from a read scope as well as a write scope.
    pub fn post_metadata_add(&self, key: MetadataKey, entry: MetadataEntry) {
        self.state.post(StateEvent::DecompiledMetadataAdd(key, entry));
    }

    pub fn mark_pending_diagnostics(&self, uri: tower_lsp::lsp_types::Url) {
        self.state.post(StateEvent::PublishDiagnosticsOnDocument(uri));
    }
}

/// The synchronous half of acquiring a write scope: posting
/// `StartSolutionChange` before the handler's first `.await` so write
/// handlers queue in wire order. Obtained with [`WriteScope::begin`],
/// then completed with [`WriteTicket::into_scope`].
pub struct WriteTicket {
    receiver: oneshot::Receiver<StateSnapshot>,
    state: StateHandle,
}

impl WriteTicket {
    pub async fn into_scope(self, backend: Arc<dyn CompilerBackend>) -> WriteScope {
        let snapshot = self
            .receiver
            .await
            .expect("state actor dropped the write-lease reply channel");
        WriteScope {
            snapshot,
            state: self.state,
            backend,
            closed: Cell::new(false),
        }
    }
}

/// Read-write scope. Disposal posts `FinishSolutionChange` exactly
/// once, whether via explicit [`WriteScope::finish`] or the `Drop` fallback.
pub struct WriteScope {
    pub snapshot: StateSnapshot,
    state: StateHandle,
    backend: Arc<dyn CompilerBackend>,
    closed: Cell<bool>,
}

impl WriteScope {
    /// The synchronous half — call this at handler entry, before any
    /// `.await`, then complete acquisition with `into_scope`.
    pub fn begin(state: &StateHandle) -> WriteTicket {
        WriteTicket {
            receiver: state.start_solution_change(),
            state: state.clone(),
        }
    }

    pub fn backend(&self) -> &Arc<dyn CompilerBackend> {
        &self.backend
    }

    pub fn post(&self, event: StateEvent) {
        self.state.post(event);
    }

    pub fn emit_solution_change(&self) {
        self.post(StateEvent::SolutionChange);
    }

    /// Releases the write lease. Safe to call at most once; later `Drop`
    /// becomes a no-op.
    pub fn finish(self) {
        self.closed.set(true);
        self.state.post(StateEvent::FinishSolutionChange);
    }
}

impl Drop for WriteScope {
    fn drop(&mut self) {
        if !self.closed.get() {
            self.closed.set(true);
            self.state.post(StateEvent::FinishSolutionChange);
        }
    }
}
