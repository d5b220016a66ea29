use socket2::{Domain, Socket, Type};
use std::net::SocketAddr;
use std::os::unix::io::AsRawFd;
use std::sync::Arc;

/// Creates a connection to `(address, port)`, returning a raw socket
/// handle on success. `None` signals failure — a negative result, not an
/// exception.
pub type ConnectionFactory = Arc<dyn Fn(&str, u16) -> Option<i32> + Send + Sync>;

/// Opens a non-blocking UDP socket and `connect()`s it to the remote
/// address, which sets it as the default destination for subsequent
/// sends without performing a handshake (UDP has none).
pub fn default_connection_factory(address: &str, port: u16) -> Option<i32> {
    let remote: SocketAddr = format!("{address}:{port}").parse().ok()?;
    let socket = Socket::new(Domain::for_address(remote), Type::DGRAM, None).ok()?;
    socket.set_nonblocking(true).ok()?;
    socket.connect(&remote.into()).ok()?;
    Some(socket.into_raw_fd_boxed())
}

trait IntoRawFdBoxed {
    fn into_raw_fd_boxed(self) -> i32;
}

impl IntoRawFdBoxed for Socket {
    fn into_raw_fd_boxed(self) -> i32 {
        let fd = self.as_raw_fd();
        std::mem::forget(self);
        fd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_factory_succeeds_for_loopback() {
        let handle = default_connection_factory("127.0.0.1", 19999);
        assert!(handle.is_some());
    }

    #[test]
    fn default_factory_rejects_unparseable_address() {
        let handle = default_connection_factory("not-an-address", 1);
        assert!(handle.is_none());
    }
}
