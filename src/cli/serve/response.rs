//! HTTP response handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{INDEX_HTML, IndexVars, PREVIEW_HTML, PreviewVars};
use crate::utils::html::escape;

const HTML: &str = "text/html; charset=utf-8";
const PLAIN: &str = "text/plain; charset=utf-8";

/// Respond with the compiled artifact itself.
pub fn respond_artifact(request: Request, path: &Path) -> Result<()> {
    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    send_body(request, 200, HTML, body)
}

/// Respond with the preview page for one artifact.
pub fn respond_preview(request: Request, title: &str, path: &str, ws_port: u16) -> Result<()> {
    let body = PREVIEW_HTML.render(&PreviewVars {
        title: &escape(title),
        path: &escape(path),
        ws_port,
    });
    send_body(request, 200, HTML, body.into_bytes())
}

/// Respond with the index of compiled artifacts. `tree` is pre-rendered HTML.
pub fn respond_index(request: Request, tree: &str, ws_port: u16) -> Result<()> {
    let body = INDEX_HTML.render(&IndexVars { tree, ws_port });
    send_body(request, 200, HTML, body.into_bytes())
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    if request.method() == &Method::Head {
        let response = Response::empty(StatusCode(status))
            .with_header(make_header("Content-Type", content_type)?);
        request.respond(response)?;
        return Ok(());
    }

    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}
