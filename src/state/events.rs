//! Events accepted by the state actor's single-consumer loop (§4.C).

use tokio::sync::oneshot;
use tower_lsp::lsp_types::{ClientCapabilities, Url};

use crate::state::model::{MetadataEntry, MetadataKey, StateSnapshot};

pub enum StateEvent {
    GetState(oneshot::Sender<StateSnapshot>),

    /// Requests a write lease. Answered immediately with the current
    /// snapshot if no lease is held; otherwise queued FIFO and answered by a
    /// later `FinishSolutionChange` (§4.C, §4.D, §9 "Write-lease gate").
    StartSolutionChange(oneshot::Sender<StateSnapshot>),

    /// Releases the current write lease, handing it to the next queued
    /// waiter if any (§4.C).
    FinishSolutionChange,

    ClientCapabilityChange(ClientCapabilities),

    /// Bumps the solution generation, marking a mutation visible to
    /// subsequently-taken snapshots (§3 invariant 1).
    SolutionChange,

    /// Monotone/commutative — admitted from any scope, not just a write
    /// scope (§5 "Suspension points").
    DecompiledMetadataAdd(MetadataKey, MetadataEntry),

    OpenDocVersionAdd(Url, i32),
    OpenDocVersionRemove(Url),
    PublishDiagnosticsOnDocument(Url),

    /// Posted by the diagnostics coalescer timer (§4.F).
    TimerTick,
}
