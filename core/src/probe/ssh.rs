//! SSH handshake and password authentication probe.
//!
//! One connection per probe, closed on every exit path. The server's host
//! key is trusted as offered: the probe keeps no known-hosts state, a
//! deliberate trade-off for fleets of rebuilt devices rather than a security
//! guarantee. Credentials are never logged.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use ssh2::{ErrorCode, Session};
use tracing::debug;

use super::SshOutcome;

// libssh2 session error raised when the server rejects the credentials.
const LIBSSH2_ERROR_AUTHENTICATION_FAILED: i32 = -18;

/// Attempts a full handshake + password authentication against
/// `address:port`, bounded by `timeout` at every stage.
pub async fn authenticate(
    address: &str,
    port: u16,
    username: &str,
    password: &str,
    timeout: Duration,
) -> SshOutcome {
    let address = address.to_string();
    let username = username.to_string();
    let password = password.to_string();

    // libssh2 is synchronous; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        authenticate_blocking(&address, port, &username, &password, timeout)
    })
    .await;

    match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!("ssh probe task failed: {e}");
            SshOutcome::ConnectionFailed
        }
    }
}

fn authenticate_blocking(
    address: &str,
    port: u16,
    username: &str,
    password: &str,
    timeout: Duration,
) -> SshOutcome {
    let Some(socket_addr) = resolve(address, port) else {
        debug!("could not resolve {address}:{port}");
        return SshOutcome::ConnectionFailed;
    };

    let tcp = match TcpStream::connect_timeout(&socket_addr, timeout) {
        Ok(stream) => stream,
        Err(e) => {
            debug!("tcp connect to {socket_addr} failed: {e}");
            return SshOutcome::ConnectionFailed;
        }
    };
    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session = match Session::new() {
        Ok(session) => session,
        Err(e) => {
            debug!("ssh session init failed: {e}");
            return SshOutcome::ConnectionFailed;
        }
    };
    // Bounds every libssh2 operation, not just the TCP connect.
    session.set_timeout(timeout.as_millis() as u32);
    session.set_tcp_stream(tcp);

    if let Err(e) = session.handshake() {
        debug!("ssh handshake with {socket_addr} failed: {e}");
        return SshOutcome::ConnectionFailed;
    }

    let outcome = match session.userauth_password(username, password) {
        Ok(()) if session.authenticated() => SshOutcome::AccessGranted,
        Ok(()) => SshOutcome::AccessDenied,
        Err(e) => match e.code() {
            ErrorCode::Session(LIBSSH2_ERROR_AUTHENTICATION_FAILED) => SshOutcome::AccessDenied,
            _ => {
                debug!("ssh authentication transport failure for {socket_addr}: {e}");
                SshOutcome::ConnectionFailed
            }
        },
    };

    // Polite teardown; dropping the session closes the transport regardless.
    session
        .disconnect(None, "connectivity probe complete", None)
        .ok();
    outcome
}

fn resolve(address: &str, port: u16) -> Option<SocketAddr> {
    (address, port).to_socket_addrs().ok()?.next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unresolvable_host_is_a_connection_failure() {
        let outcome = authenticate(
            "device.invalid",
            22,
            "ops",
            "pw",
            Duration::from_millis(500),
        )
        .await;
        assert_eq!(outcome, SshOutcome::ConnectionFailed);
    }

    #[tokio::test]
    #[ignore]
    async fn closed_port_is_a_connection_failure() {
        // Port 9 on loopback is almost never listening.
        let outcome =
            authenticate("127.0.0.1", 9, "ops", "pw", Duration::from_millis(500)).await;
        assert_eq!(outcome, SshOutcome::ConnectionFailed);
    }
}
