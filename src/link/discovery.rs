//! UDP broadcast discovery
//!
//! The robot announces itself by sending a UDP datagram to the well-known
//! port on the local network. Discovery binds that port, blocks until one
//! datagram arrives and yields the sender's address; the payload itself is
//! ignored. This is a one-shot operation: after a disconnect the caller
//! starts a fresh discovery cycle.

use crate::error::Result;
use crossbeam_channel::{bounded, Receiver};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Block until one broadcast datagram arrives on `port`, then return the
/// sender's IP address.
pub fn wait_for_robot(port: u16) -> Result<IpAddr> {
    let bind = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let socket = UdpSocket::bind(bind)?;
    log::info!("Listening for robot broadcast on port {}", port);

    let mut buf = [0u8; 64];
    let (_, sender) = socket.recv_from(&mut buf)?;
    log::info!("Robot discovered at {}", sender.ip());
    Ok(sender.ip())
}

/// Run discovery on a background thread.
///
/// Returns a one-shot channel that yields the robot's address, or nothing
/// if the receive failed (the error is logged). Dropping the receiver
/// abandons the result; the thread still exits after the first datagram.
pub fn spawn(port: u16) -> Receiver<IpAddr> {
    let (tx, rx) = bounded(1);
    let builder = std::thread::Builder::new().name("discovery".to_string());
    let spawned = builder.spawn(move || match wait_for_robot(port) {
        Ok(ip) => {
            let _ = tx.send(ip);
        }
        Err(e) => log::warn!("Broadcast discovery failed: {}", e),
    });
    if let Err(e) = spawned {
        log::error!("Failed to spawn discovery thread: {}", e);
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_sender_address() {
        // Bind an ephemeral port for the test instead of the well-known one.
        let probe = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = {
            let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
            let port = listener.local_addr().unwrap().port();
            drop(listener);
            port
        };

        let rx = spawn(port);
        // Give the discovery thread time to bind before sending.
        std::thread::sleep(std::time::Duration::from_millis(50));
        probe.send_to(b"IP", ("127.0.0.1", port)).unwrap();

        let ip = rx.recv_timeout(std::time::Duration::from_secs(2)).unwrap();
        assert_eq!(ip, "127.0.0.1".parse::<IpAddr>().unwrap());
    }
}
