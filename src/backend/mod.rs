//! `CSharpBackend`: the `tower_lsp::LanguageServer` implementation (§4.G),
//! wired against the state actor (§4.C) and a `CompilerBackend` (§4.H).

pub mod conversions;
pub mod custom;
pub mod handlers;

use std::sync::Arc;

use tower_lsp::Client;

use crate::compiler::CompilerBackend;
use crate::state::StateHandle;

pub struct CSharpBackend {
    pub(crate) client: Client,
    pub(crate) state: StateHandle,
    pub(crate) compiler: Arc<dyn CompilerBackend>,
}

impl CSharpBackend {
    pub fn new(client: Client, state: StateHandle, compiler: Arc<dyn CompilerBackend>) -> Self {
        Self { client, state, compiler }
    }
}
