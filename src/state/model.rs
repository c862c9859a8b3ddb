//! Server state (§3 Data Model) — owned exclusively by the state actor
//! (`state::actor`); handlers only ever see a `StateSnapshot` or post events.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::oneshot;
use tower_lsp::lsp_types::{ClientCapabilities, Url};

use crate::compiler::{ProjectId, TextSpan};
use crate::config::ServerOptions;

/// Identity of one decompiled-metadata cache entry (§4.E / §3 invariant 3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataKey {
    pub project: ProjectId,
    pub assembly: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct MetadataEntry {
    pub uri: Url,
    /// Cached so a second resolution of the same symbol skips re-walking the
    /// synthesized tree (§4.E "Subsequent requests ... return the cached
    /// document").
    pub best_match_span: Option<TextSpan>,
}

/// Mutable server state, singleton, owned by the actor task in `state::actor`.
pub struct ServerState {
    pub options: ServerOptions,
    pub client_capabilities: Option<ClientCapabilities>,
    /// Non-null for the remainder of the session once `initialize` succeeds
    /// (§3 invariant 5); an opaque generation counter stands in for the
    /// compiler backend's actual solution handle, which lives in the
    /// `CompilerBackend` implementation rather than here.
    pub solution_generation: Option<u64>,
    pub open_doc_versions: FxHashMap<Url, i32>,
    pub decompiled_metadata: FxHashMap<MetadataKey, MetadataEntry>,
    pub pending_diagnostics: FxHashSet<Url>,
    /// `runningChangeRequest` (§3): `true` while a write lease is held.
    pub write_lease_active: bool,
    /// `changeRequestQueue` (§3): FIFO of waiters for the write lease.
    pub change_request_queue: VecDeque<oneshot::Sender<StateSnapshot>>,
}

impl ServerState {
    pub fn new(options: ServerOptions) -> Self {
        Self {
            options,
            client_capabilities: None,
            solution_generation: None,
            open_doc_versions: FxHashMap::default(),
            decompiled_metadata: FxHashMap::default(),
            pending_diagnostics: FxHashSet::default(),
            write_lease_active: false,
            change_request_queue: VecDeque::new(),
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            options: self.options.clone(),
            client_capabilities: self.client_capabilities.clone(),
            solution_generation: self.solution_generation,
            open_doc_versions: Arc::new(self.open_doc_versions.clone()),
            decompiled_metadata: Arc::new(self.decompiled_metadata.clone()),
        }
    }
}

/// A cheap, immutable view of server state as of the moment it was captured,
/// handed to request scopes (§4.D). Cloning is an `Arc` bump, not a deep copy.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub options: ServerOptions,
    pub client_capabilities: Option<ClientCapabilities>,
    pub solution_generation: Option<u64>,
    pub open_doc_versions: Arc<FxHashMap<Url, i32>>,
    pub decompiled_metadata: Arc<FxHashMap<MetadataKey, MetadataEntry>>,
}

impl StateSnapshot {
    pub fn is_initialized(&self) -> bool {
        self.solution_generation.is_some()
    }
}
