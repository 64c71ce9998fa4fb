//! `envelopr serve`: preview server with live reload.
//!
//! ```text
//! initial build ──► ws server ──► watcher ──► http request loop
//!                                                   │ Ctrl+C
//!                                                   ▼
//!                                             watcher.stop()
//! ```

mod index;
mod lifecycle;
mod path;
mod response;

use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Request, Server};

use crate::build::{Orchestrator, Rebuild};
use crate::config::ProjectConfig;
use crate::core::{is_shutdown, register_server};
use crate::reload::{Broadcaster, ReloadMessage, start_ws_server};
use crate::utils::plural_s;
use crate::watch::{WatchRoots, Watcher};
use crate::{debug, log};

use path::{Route, resolve_artifact};

/// Worker threads answering HTTP requests.
const REQUEST_THREADS: usize = 4;

/// Per-request state shared by the worker pool.
struct ServeContext {
    config: Arc<ProjectConfig>,
    ws_port: u16,
}

/// Build everything, then serve previews and rebuild on change until Ctrl+C.
pub fn serve_project(config: Arc<ProjectConfig>) -> Result<()> {
    let orchestrator = Arc::new(Orchestrator::new(Arc::clone(&config)));
    let count = orchestrator.build_all().context("Initial build failed")?;
    log!("build"; "compiled {} document{}", count, plural_s(count));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let broadcaster = Arc::new(Broadcaster::<ReloadMessage>::new());
    let ws_port = start_ws_server(
        config.serve.interface,
        config.serve.reload_port,
        Arc::clone(&broadcaster),
    )
    .context("failed to start live reload server")?;
    debug!("reload"; "ws://{}:{}", config.serve.interface, ws_port);

    let roots = WatchRoots::new(&config.paths.documents, config.paths.partials_root());
    let watcher = {
        let _guard = runtime.enter();
        Watcher::new(roots, orchestrator, broadcaster)
            .start()
            .context("failed to start watcher")?
    };

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));
    log!("serve"; "http://{}", addr);

    let context = Arc::new(ServeContext { config, ws_port });
    let result = run_request_loop(&server, context);

    runtime.block_on(watcher.stop());
    debug!("serve"; "watcher stopped");
    result
}

fn run_request_loop(server: &Server, context: Arc<ServeContext>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let context = Arc::clone(&context);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &context) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

fn handle_request(request: Request, context: &ServeContext) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let output = &context.config.paths.output;
    let Some(route) = Route::parse(request.url()) else {
        return response::respond_not_found(request);
    };

    match route {
        Route::Index => {
            let tree = index::build_tree(output);
            let html = index::render_tree(&tree, &context.config.template);
            response::respond_index(request, &html, context.ws_port)
        }
        Route::Raw(relative) => match resolve_artifact(&relative, output) {
            Some(path) => response::respond_artifact(request, &path),
            None => response::respond_not_found(request),
        },
        Route::Preview(relative) => {
            if resolve_artifact(&relative, output).is_none() {
                return response::respond_not_found(request);
            }
            let name = relative
                .strip_suffix(&format!(".{}", crate::compiler::ARTIFACT_EXT))
                .unwrap_or(&relative);
            let title = context.config.template.title_of(name).unwrap_or(name);
            response::respond_preview(request, title, &relative, context.ws_port)
        }
    }
}
