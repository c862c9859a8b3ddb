//! The state actor: a single-consumer event loop owning `ServerState`,
//! implementing the write-lease gate and diagnostics tick.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tower_lsp::Client;

use crate::compiler::CompilerBackend;
use crate::config::ServerOptions;
use crate::state::events::StateEvent;
use crate::state::model::{ServerState, StateSnapshot};

/// A cloneable front for posting events to the actor. `send` on an unbounded
/// channel never blocks or suspends, which is what lets `StartSolutionChange`
/// be posted synchronously at handler entry (§9 "Write-lease gate").
#[derive(Clone)]
pub struct StateHandle {
    tx: mpsc::UnboundedSender<StateEvent>,
}

impl StateHandle {
    pub fn post(&self, event: StateEvent) {
        // The actor task only stops when the handle (and the server) is
        // being torn down; a failed send at that point is not actionable.
        let _ = self.tx.send(event);
    }

    pub async fn get_state(&self) -> StateSnapshot {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.post(StateEvent::GetState(reply_tx));
        reply_rx.await.expect("state actor task terminated unexpectedly")
    }

    /// Posts `StartSolutionChange` synchronously and returns the receiver to
    /// be awaited afterward — the synchronous/asynchronous split §9 calls for.
    pub fn start_solution_change(&self) -> oneshot::Receiver<StateSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.post(StateEvent::StartSolutionChange(reply_tx));
        reply_rx
    }

    pub fn finish_solution_change(&self) {
        self.post(StateEvent::FinishSolutionChange);
    }
}

pub fn spawn(options: ServerOptions, backend: Arc<dyn CompilerBackend>, client: Client) -> StateHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let state = ServerState::new(options);
    tokio::spawn(run(rx, state, backend, client));
    StateHandle { tx }
}

async fn run(
    mut events: mpsc::UnboundedReceiver<StateEvent>,
    mut state: ServerState,
    backend: Arc<dyn CompilerBackend>,
    client: Client,
) {
    while let Some(event) = events.recv().await {
        match event {
            StateEvent::GetState(reply) => {
                let _ = reply.send(state.snapshot());
            }

            StateEvent::StartSolutionChange(reply) => {
                if state.write_lease_active {
                    state.change_request_queue.push_back(reply);
                } else {
                    state.write_lease_active = true;
                    let _ = reply.send(state.snapshot());
                }
            }

            StateEvent::FinishSolutionChange => {
                if let Some(next) = state.change_request_queue.pop_front() {
                    let _ = next.send(state.snapshot());
                } else {
                    state.write_lease_active = false;
                }
            }

            StateEvent::ClientCapabilityChange(caps) => {
                state.client_capabilities = Some(caps);
            }

            StateEvent::SolutionChange => {
                state.solution_generation = Some(state.solution_generation.unwrap_or(0) + 1);
            }

            StateEvent::DecompiledMetadataAdd(key, entry) => {
                // Append-only (§3): never overwrite an existing entry.
                state.decompiled_metadata.entry(key).or_insert(entry);
            }

            StateEvent::OpenDocVersionAdd(uri, version) => {
                state.open_doc_versions.insert(uri, version);
            }

            StateEvent::OpenDocVersionRemove(uri) => {
                state.open_doc_versions.remove(&uri);
            }

            StateEvent::PublishDiagnosticsOnDocument(uri) => {
                state.pending_diagnostics.insert(uri);
            }

            StateEvent::TimerTick => {
                let pending: Vec<_> = state.pending_diagnostics.drain().collect();
                for uri in pending {
                    // §4.F: silently drop if the document left the solution
                    // between marking and the tick.
                    if backend.text(&uri).await.is_none() {
                        continue;
                    }
                    let diagnostics = backend.diagnostics(&uri).await;
                    client.publish_diagnostics(uri, diagnostics, None).await;
                }
            }
        }
    }
}
