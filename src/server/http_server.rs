use http::StatusCode;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::request::{read_request, RequestError};
use super::response::{error_response, to_wire_response};
use crate::dispatcher::Dispatcher;
use crate::runtime_config::DEFAULT_MAX_BODY_BYTES;

/// Serves a [`Dispatcher`] over HTTP/1.1, one thread per request.
#[derive(Clone)]
pub struct HttpServer {
    dispatcher: Dispatcher,
    max_body_bytes: usize,
}

/// Handle to a running HTTP server
///
/// Provides methods for waiting until the server is ready, stopping it gracefully,
/// or joining the accept thread.
pub struct ServerHandle {
    addr: SocketAddr,
    server: Arc<tiny_http::Server>,
    stopping: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound address. Useful when binding port `0`.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// Polls the server address by attempting TCP connections until successful.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server doesn't accept within ~250ms (50 attempts × 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting requests and wait for the accept thread to exit.
    ///
    /// Requests already handed to worker threads run to completion.
    pub fn stop(self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.server.unblock();
        if self.handle.join().is_err() {
            error!(addr = %self.addr, "Accept thread panicked");
        }
        info!(addr = %self.addr, "Server stopped");
    }

    /// Block until the accept thread finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if the accept thread panicked.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

impl HttpServer {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Start the HTTP server on the given address
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let server = tiny_http::Server::http(addr).map_err(io::Error::other)?;
        let addr = server.server_addr().to_ip().unwrap_or(addr);
        let server = Arc::new(server);
        let stopping = Arc::new(AtomicBool::new(false));
        let max_body_bytes = self.max_body_bytes;

        let handle = {
            let server = Arc::clone(&server);
            let stopping = Arc::clone(&stopping);
            thread::Builder::new()
                .name(String::from("gyr-accept"))
                .spawn(move || self.accept_loop(&server, &stopping))?
        };

        info!(
            addr = %addr,
            max_body_bytes,
            "Server listening"
        );
        Ok(ServerHandle {
            addr,
            server,
            stopping,
            handle,
        })
    }

    fn accept_loop(self, server: &tiny_http::Server, stopping: &AtomicBool) {
        loop {
            let request = match server.recv() {
                Ok(request) => request,
                Err(e) => {
                    if !stopping.load(Ordering::SeqCst) {
                        error!(error = %e, "Failed accepting request");
                    }
                    break;
                }
            };
            if stopping.load(Ordering::SeqCst) {
                break;
            }
            let worker = self.clone();
            let spawned = thread::Builder::new()
                .name(String::from("gyr-worker"))
                .spawn(move || worker.serve(request));
            if let Err(e) = spawned {
                error!(error = %e, "Failed spawning request thread");
            }
        }
        debug!("Accept loop exited");
    }

    fn serve(&self, mut request: tiny_http::Request) {
        let response = match read_request(&mut request, self.max_body_bytes) {
            Ok(http_request) => self.dispatch_guarded(http_request),
            Err(RequestError::TooLarge { limit }) => {
                warn!(limit, url = %request.url(), "Request body too large");
                error_response(StatusCode::PAYLOAD_TOO_LARGE)
            }
            Err(e) => {
                warn!(error = %e, url = %request.url(), "Rejecting malformed request");
                error_response(StatusCode::BAD_REQUEST)
            }
        };
        if let Err(e) = request.respond(to_wire_response(response)) {
            debug!(error = %e, "Client went away before the response was written");
        }
    }

    fn dispatch_guarded(&self, request: http::Request<Vec<u8>>) -> http::Response<Vec<u8>> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        match catch_unwind(AssertUnwindSafe(|| self.dispatcher.dispatch(request))) {
            Ok(response) => response,
            Err(_) => {
                error!(method = %method, uri = %uri, "Request handling panicked");
                error_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
