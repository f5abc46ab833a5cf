// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loopback HTTP server that captures one authorization code.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::code::extract_code;
use super::pages::{render_login_page, SUCCESS_PAGE};
use crate::error::{AppError, ErrorKind};

pub const CALLBACK_PATH: &str = "/callback";

/// How long a graceful shutdown may drain connections before the serve task
/// is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Lifecycle of a [`LoginServer`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerState {
    Running = 0,
    ShuttingDown = 1,
    Stopped = 2,
}

impl ServerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Running,
            1 => Self::ShuttingDown,
            _ => Self::Stopped,
        }
    }
}

#[derive(Clone)]
struct CaptureState {
    page: Arc<str>,
    handoff: mpsc::Sender<String>,
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

/// Build the capture router: `/` serves the instruction page and
/// [`CALLBACK_PATH`] publishes the first code on `handoff`.
pub fn build_router(login_url: &str, callback_url: &str, handoff: mpsc::Sender<String>) -> Router {
    let state = CaptureState { page: render_login_page(login_url, callback_url).into(), handoff };
    Router::new()
        .route("/", get(index))
        .route(CALLBACK_PATH, get(callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(s): State<CaptureState>) -> Html<String> {
    Html(s.page.to_string())
}

async fn callback(State(s): State<CaptureState>, Query(params): Query<CallbackParams>) -> Response {
    let code = params.code.map(|c| extract_code(&c)).filter(|c| !c.is_empty());
    let Some(code) = code else {
        debug!("callback without code");
        return ErrorKind::MissingCode.error("Missing code").to_http_response().into_response();
    };

    match s.handoff.try_send(code) {
        Ok(()) => info!("authorization code captured"),
        Err(mpsc::error::TrySendError::Full(_) | mpsc::error::TrySendError::Closed(_)) => {
            warn!("duplicate login callback ignored");
        }
    }
    Html(SUCCESS_PAGE).into_response()
}

/// A running capture session bound to `127.0.0.1` on an ephemeral port.
///
/// Dropping the session without calling [`LoginServer::shutdown`] still
/// cancels the listener.
pub struct LoginServer {
    addr: SocketAddr,
    login_url: String,
    handoff: mpsc::Receiver<String>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    state: AtomicU8,
}

impl LoginServer {
    pub async fn start(login_url: impl Into<String>) -> Result<Self, AppError> {
        let bind_error = |e: std::io::Error| ErrorKind::Bind.with_source("Could not start local server", e);
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.map_err(bind_error)?;
        let addr = listener.local_addr().map_err(bind_error)?;

        let login_url = login_url.into();
        let (tx, rx) = mpsc::channel(1);
        let router = build_router(&login_url, &format!("http://{addr}{CALLBACK_PATH}"), tx);

        let cancel = CancellationToken::new();
        let sd = cancel.clone();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, router).with_graceful_shutdown(sd.cancelled_owned()).await;
            if let Err(e) = result {
                warn!("login server error: {e}");
            }
        });
        info!(%addr, "login server listening");

        Ok(Self {
            addr,
            login_url,
            handoff: rx,
            cancel,
            task: Some(task),
            state: AtomicU8::new(ServerState::Running as u8),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Address of the instruction page, e.g. `http://127.0.0.1:49152`.
    pub fn local_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn callback_url(&self) -> String {
        format!("http://{}{CALLBACK_PATH}", self.addr)
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn state(&self) -> ServerState {
        ServerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Wait for the first captured code, then shut the server down.
    ///
    /// Later callbacks get the success page but are dropped.
    pub async fn wait_for_code(&mut self, timeout: Duration) -> Result<String, AppError> {
        let received = tokio::time::timeout(timeout, self.handoff.recv()).await;
        self.handoff.close();
        while let Ok(late) = self.handoff.try_recv() {
            debug!(len = late.len(), "discarding duplicate login code");
        }
        self.shutdown().await;

        match received {
            Ok(Some(code)) => Ok(code),
            Ok(None) => Err(ErrorKind::Timeout.error("Login server stopped before a code arrived")),
            Err(_) => Err(ErrorKind::Timeout
                .error(format!("Login timed out after {}", human_duration(timeout)))),
        }
    }

    /// Stop serving. Only the first call does any work.
    pub async fn shutdown(&mut self) {
        let first = self
            .state
            .compare_exchange(
                ServerState::Running as u8,
                ServerState::ShuttingDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if !first {
            return;
        }

        self.cancel.cancel();
        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
                warn!("login server did not drain in time, aborting");
                task.abort();
            }
        }
        self.state.store(ServerState::Stopped as u8, Ordering::Release);
        info!(addr = %self.addr, "login server stopped");
    }
}

impl Drop for LoginServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn human_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        60 => "1 minute".to_owned(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_owned(),
        s if s > 0 => format!("{s} seconds"),
        _ => format!("{} ms", d.as_millis()),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
