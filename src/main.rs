//! Process entry point (§6). A single JSON-RPC connection over stdio,
//! framed and routed by `tower_lsp`. Exit code policy: 0 on a clean
//! `shutdown`/`exit` sequence or signal, 3 if the core fails during startup.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tower_lsp::{LspService, Server};
use tracing::{error, info};

use csharp_language_server::backend::custom::METADATA_REQUEST;
use csharp_language_server::backend::CSharpBackend;
use csharp_language_server::compiler::treesitter::TreeSitterBackend;
use csharp_language_server::compiler::CompilerBackend;
use csharp_language_server::config::{Args, ServerOptions};
use csharp_language_server::logging::init_logger;
use csharp_language_server::state;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_logger(args.no_color, Some(&args.log_level)) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::from(3);
    }

    info!("starting csharp-language-server {}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(args).await {
        error!(error = %err, "server terminated abnormally");
        return ExitCode::from(3);
    }

    info!("server terminated");
    ExitCode::SUCCESS
}

async fn run(args: Args) -> io::Result<()> {
    let options = ServerOptions::from_args(&args);
    let compiler: Arc<dyn CompilerBackend> = Arc::new(TreeSitterBackend::new());

    let (service, socket) = LspService::build(move |client| {
        let state = state::spawn(options.clone(), compiler.clone(), client.clone());
        CSharpBackend::new(client, state, compiler.clone())
    })
    .custom_method(METADATA_REQUEST, CSharpBackend::metadata)
    .finish();

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let server = Server::new(stdin, stdout, socket);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = server.serve(service) => info!("connection closed"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = server.serve(service) => info!("connection closed"),
            _ = tokio::signal::ctrl_c() => info!("received Ctrl-C, shutting down"),
        }
    }

    Ok(())
}
