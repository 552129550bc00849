use may::coroutine::JoinHandle;
use may_minihttp::HttpService;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const READY_POLL: Duration = Duration::from_millis(5);
const READY_TIMEOUT: Duration = Duration::from_millis(250);

/// Serves an [`HttpService`] (normally an [`AppService`](super::AppService)) with
/// `may_minihttp`.
pub struct HttpServer<T>(pub T);

/// A running server. Dropping the handle leaves the server running; call
/// [`stop`](Self::stop) or [`join`](Self::join).
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to, with port `0` already resolved.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://host:port`, the prefix expected by [`Res`](crate::client::Res).
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Block until the server accepts TCP connections, for up to 250ms.
    ///
    /// # Errors
    ///
    /// `TimedOut` when the listener never came up.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_for(READY_TIMEOUT)
    }

    /// [`wait_ready`](Self::wait_ready) with an explicit deadline.
    ///
    /// # Errors
    ///
    /// `TimedOut` when the listener never came up.
    pub fn wait_ready_for(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if TcpStream::connect(self.addr).is_ok() {
                debug!(addr = %self.addr, "Server ready");
                return Ok(());
            }
            thread::sleep(READY_POLL);
        }
        warn!(addr = %self.addr, timeout_ms = timeout.as_millis() as u64, "Server not ready");
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the accept loop and wait for it to exit.
    pub fn stop(self) {
        // SAFETY: the handle is owned and joined right after, so the coroutine is not
        // observed after cancellation.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
        debug!(addr = %self.addr, "Server stopped");
    }

    /// Block until the server coroutine finishes.
    ///
    /// # Errors
    ///
    /// The panic payload if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind `addr` and start serving in a coroutine.
    ///
    /// Port `0` is resolved to a free port first, so [`ServerHandle::addr`] is
    /// always connectable.
    ///
    /// # Errors
    ///
    /// The address does not resolve or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let mut addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        if addr.port() == 0 {
            addr = TcpListener::bind(addr)?.local_addr()?;
        }
        let handle = may_minihttp::HttpServer(self.0).start(addr)?;
        Ok(ServerHandle { addr, handle })
    }
}
