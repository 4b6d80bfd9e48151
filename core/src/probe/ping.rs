//! ICMP echo reachability probe.
//!
//! Root runs send a raw ICMPv4 echo over a Layer 4 transport channel.
//! Without privileges, and for IPv6 targets, the probe falls back to the
//! system `ping` binary invoked with an argument vector, never a shell
//! string, so device addresses cannot smuggle shell syntax.

use std::net::{IpAddr, ToSocketAddrs};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

/// Sends a single echo request and reports whether the host answered.
///
/// Unreachable is a normal result: resolution failures, timeouts and probe
/// errors all map to `false`, never to a panic or an `Err`.
pub async fn icmp_echo(address: &str, timeout: Duration) -> bool {
    let Some(addr) = resolve(address) else {
        debug!("could not resolve '{address}', reporting unreachable");
        return false;
    };

    #[cfg(unix)]
    {
        if let IpAddr::V4(target) = addr
            && is_root::is_root()
        {
            match tokio::task::spawn_blocking(move || raw::echo_v4(target, timeout)).await {
                Ok(Ok(answered)) => return answered,
                Ok(Err(e)) => {
                    tracing::warn!("raw ICMP probe for {addr} failed: {e}, using system ping")
                }
                Err(e) => tracing::warn!("raw ICMP probe task for {addr} failed: {e}"),
            }
        }
    }

    system_ping(&addr.to_string(), timeout).await
}

/// Literal addresses parse directly; anything else goes through the system
/// resolver.
fn resolve(address: &str) -> Option<IpAddr> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Some(ip);
    }
    (address, 0u16)
        .to_socket_addrs()
        .ok()?
        .map(|socket_addr| socket_addr.ip())
        .next()
}

/// One echo via the system `ping` binary. Exit status 0 means an answer
/// came back; a missing binary or spawn failure reads as unreachable.
async fn system_ping(address: &str, timeout: Duration) -> bool {
    let mut command = Command::new("ping");

    #[cfg(target_os = "windows")]
    {
        let wait_ms = timeout.as_millis().to_string();
        command.args(["-n", "1", "-w", wait_ms.as_str()]);
    }
    #[cfg(not(target_os = "windows"))]
    {
        let wait_s = timeout.as_secs().max(1).to_string();
        command.args(["-c", "1", "-W", wait_s.as_str()]);
    }

    command
        .arg(address)
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match command.status().await {
        Ok(status) => status.success(),
        Err(e) => {
            debug!("failed to run system ping for {address}: {e}");
            false
        }
    }
}

#[cfg(unix)]
mod raw {
    //! Privileged ICMPv4 echo. Opening the transport channel needs a raw
    //! socket, hence root.

    use std::net::{IpAddr, Ipv4Addr};
    use std::time::{Duration, Instant};

    use anyhow::Context;
    use pnet::packet::Packet;
    use pnet::packet::icmp::echo_reply::EchoReplyPacket;
    use pnet::packet::icmp::echo_request::{IcmpCodes, MutableEchoRequestPacket};
    use pnet::packet::icmp::{self, IcmpPacket, IcmpTypes};
    use pnet::packet::ip::IpNextHeaderProtocols;
    use pnet::transport::{self, TransportChannelType, TransportProtocol};

    const TRANSPORT_BUFFER_SIZE: usize = 4096;
    // 8 byte ICMP header + 8 byte payload.
    const ECHO_REQUEST_LEN: usize = 16;
    const CHANNEL_TYPE_ICMP: TransportChannelType =
        TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

    /// Sends one echo request and waits for a matching reply until the
    /// deadline passes.
    pub fn echo_v4(target: Ipv4Addr, timeout: Duration) -> anyhow::Result<bool> {
        let (mut tx, mut rx) =
            transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)?;

        let mut buffer = [0u8; ECHO_REQUEST_LEN];
        let identifier: u16 = rand::random();
        let mut request = MutableEchoRequestPacket::new(&mut buffer)
            .context("failed to create echo request packet")?;
        request.set_icmp_type(IcmpTypes::EchoRequest);
        request.set_icmp_code(IcmpCodes::NoCode);
        request.set_identifier(identifier);
        request.set_sequence_number(1);

        request.set_checksum(0);
        let checksum = icmp::checksum(
            &IcmpPacket::new(request.packet()).context("failed to view echo request packet")?,
        );
        request.set_checksum(checksum);

        tx.send_to(request.to_immutable(), IpAddr::V4(target))?;

        let mut replies = transport::icmp_packet_iter(&mut rx);
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }

            match replies.next_with_timeout(remaining) {
                Ok(Some((packet, from))) => {
                    if from != IpAddr::V4(target) {
                        continue;
                    }
                    if packet.get_icmp_type() != IcmpTypes::EchoReply {
                        continue;
                    }
                    let ours = EchoReplyPacket::new(packet.packet())
                        .map(|reply| reply.get_identifier() == identifier)
                        .unwrap_or(false);
                    if ours {
                        return Ok(true);
                    }
                }
                Ok(None) => return Ok(false),
                // Undecodable frames on the raw socket; keep listening.
                Err(_) => continue,
            }
        }
    }
}
