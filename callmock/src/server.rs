//! Server-side interception: a real listening endpoint answering from the
//! configured calls.
//!
//! # Design
//! The server binds an ephemeral localhost port and serves from a background
//! thread running its own current-thread runtime, so it works from both sync
//! and async tests without borrowing the caller's runtime. Every accepted
//! request falls through an `axum::Router` into the shared dispatcher
//! pipeline. Dropping the server triggers a graceful shutdown.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use callmock_core::{Call, Calls, Reporter};

use crate::handler::Dispatcher;

/// A listening mock endpoint.
///
/// Point any real HTTP client at [`MockServer::uri`]; each inbound request is
/// verified against the next expected call and answered with its canned
/// response. The listener shuts down when the value is dropped.
pub struct MockServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    /// Starts a server over a strict ordered sequence: invocations beyond the
    /// list hard-fail with `no expected calls left`, and the end-of-test
    /// check asserts the whole list was exercised.
    pub fn start(reporter: Arc<dyn Reporter>, calls: Vec<Call>) -> io::Result<Self> {
        Self::serve(reporter, Calls::Sequence(calls))
    }

    /// Starts a server cycling through a fixed list; it always finds a call
    /// and is never incomplete.
    pub fn start_static(reporter: Arc<dyn Reporter>, calls: Vec<Call>) -> io::Result<Self> {
        Self::serve(reporter, Calls::Static(calls))
    }

    fn serve(reporter: Arc<dyn Reporter>, calls: Calls) -> io::Result<Self> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let dispatcher = Arc::new(Dispatcher::new(reporter, calls));
        let (shutdown, rx) = oneshot::channel();

        thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(err) => {
                    tracing::error!(%err, "build mock server runtime");

                    return;
                }
            };

            rt.block_on(async move {
                let listener = match TcpListener::from_std(listener) {
                    Ok(listener) => listener,
                    Err(err) => {
                        tracing::error!(%err, "register mock server listener");

                        return;
                    }
                };

                let serve = axum::serve(listener, app(dispatcher)).with_graceful_shutdown(async {
                    let _ = rx.await;
                });

                if let Err(err) = serve.await {
                    tracing::error!(%err, "serve mock calls");
                }
            });
        });

        tracing::debug!(%addr, "mock server listening");

        Ok(Self {
            addr,
            shutdown: Some(shutdown),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URI of the listening endpoint, e.g. `http://127.0.0.1:49152`.
    pub fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn app(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new().fallback(handle).with_state(dispatcher)
}

async fn handle(State(dispatcher): State<Arc<Dispatcher>>, req: Request) -> Response {
    dispatcher.serve(req).await
}
