//! TCP connection to the robot
//!
//! One [`Connection`] owns one socket and at most one background receive
//! thread. The receive thread performs blocking reads, reassembles frames
//! with [`FrameDecoder`] and forwards each one exactly once, in wire order,
//! over a crossbeam channel. The single [`LinkEvent::Disconnected`] emitted
//! when the loop exits is the sole disconnect notification; the consumer
//! must reset all session state when it arrives.
//!
//! Stopping is a hard cancel: the running flag is cleared and the socket is
//! shut down, which aborts the blocking read. A new discover/connect cycle
//! is safe to start immediately afterwards.

use crate::error::{Error, Result};
use crate::link::frame::{encode_bytes, encode_text, Frame, FrameDecoder, Tag};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::io::{Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Read chunk size for the receive loop.
const RECV_CHUNK: usize = 1024;

/// Channel capacity for decoded frames. Camera frames arrive at display
/// rate, so the consumer drains this every tick; a modest buffer absorbs
/// bursts without holding stale data for long.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No socket, no discovery in progress
    Disconnected,
    /// Waiting for a UDP broadcast from the robot
    Discovering,
    /// TCP connect in progress
    Connecting,
    /// Link established, receive loop running
    Connected,
}

/// Event delivered from the receive thread to the control tick.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// One decoded frame, delivered in wire order
    Frame(Frame),
    /// Receive loop terminated (peer close, socket error or decode error).
    /// Emitted exactly once per connection lifetime.
    Disconnected,
}

/// TCP link to the robot.
pub struct Connection {
    stream: Arc<Mutex<Option<TcpStream>>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Connection {
    /// Connect to the robot at `ip` on the well-known port.
    pub fn connect(ip: IpAddr, port: u16) -> Result<Self> {
        let addr = SocketAddr::new(ip, port);
        log::info!("Connecting to robot at {}", addr);
        let stream = TcpStream::connect(addr)
            .map_err(|e| Error::Connection(format!("{}: {}", addr, e)))?;
        Ok(Self {
            stream: Arc::new(Mutex::new(Some(stream))),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        })
    }

    /// Send a text frame. Failures are logged, never propagated: a dead
    /// socket surfaces through the receive loop's disconnect event instead.
    pub fn send_text(&self, tag: Tag, content: &str) {
        self.send_encoded(tag, encode_text(tag, content));
    }

    /// Send a binary frame. Same failure semantics as [`send_text`](Self::send_text).
    pub fn send_bytes(&self, tag: Tag, content: &[u8]) {
        self.send_encoded(tag, encode_bytes(tag, content));
    }

    fn send_encoded(&self, tag: Tag, bytes: Vec<u8>) {
        let mut guard = self.stream.lock();
        match guard.as_mut() {
            Some(stream) => {
                if let Err(e) = stream.write_all(&bytes) {
                    log::warn!("Failed to send '{}' frame: {}", tag, e);
                }
            }
            None => log::warn!("Connection wasn't started, dropping '{}' frame", tag),
        }
    }

    /// Spawn the background receive thread.
    ///
    /// Returns the channel on which decoded frames and the final
    /// disconnect event arrive. May be called once per connection.
    pub fn start_receive(&mut self) -> Result<Receiver<LinkEvent>> {
        let stream = {
            let guard = self.stream.lock();
            match guard.as_ref() {
                Some(stream) => stream.try_clone()?,
                None => return Err(Error::NotConnected),
            }
        };

        self.running.store(true, Ordering::Relaxed);
        let running = Arc::clone(&self.running);
        let (tx, rx) = bounded(EVENT_CHANNEL_CAPACITY);

        let handle = std::thread::Builder::new()
            .name("link-receive".to_string())
            .spawn(move || receive_loop(stream, running, tx))
            .map_err(|e| Error::Other(format!("Failed to spawn receive thread: {}", e)))?;
        self.handle = Some(handle);
        Ok(rx)
    }

    /// Whether the receive loop is still running.
    pub fn is_receiving(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Current lifecycle state. `Discovering` is never reported here; it
    /// belongs to the discovery phase before a `Connection` exists.
    pub fn state(&self) -> LinkState {
        if self.is_receiving() {
            LinkState::Connected
        } else if self.stream.lock().is_some() {
            LinkState::Connecting
        } else {
            LinkState::Disconnected
        }
    }

    /// Hard-stop the connection: abort the receive thread and close the
    /// socket. Safe to call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(stream) = self.stream.lock().take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Blocking receive loop: read, reassemble, forward.
///
/// Exits on peer close (zero-length read), socket error, decode error or a
/// cleared running flag, then emits the single disconnect event.
fn receive_loop(mut stream: TcpStream, running: Arc<AtomicBool>, tx: Sender<LinkEvent>) {
    log::info!("Receive loop started for {:?}", stream.peer_addr());
    let mut decoder = FrameDecoder::new();
    let mut chunk = [0u8; RECV_CHUNK];

    'recv: while running.load(Ordering::Relaxed) {
        let n = match stream.read(&mut chunk) {
            Ok(0) => {
                log::info!("Robot closed the connection");
                break 'recv;
            }
            Ok(n) => n,
            Err(e) => {
                if running.load(Ordering::Relaxed) {
                    log::warn!("Socket read failed: {}", e);
                }
                break 'recv;
            }
        };

        decoder.push(&chunk[..n]);
        loop {
            match decoder.next_frame() {
                Ok(Some(frame)) => {
                    log::trace!("Frame '{}' ({} buffered bytes left)", frame.tag, decoder.buffered());
                    if tx.send(LinkEvent::Frame(frame)).is_err() {
                        log::debug!("Event channel closed, stopping receive loop");
                        break 'recv;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Frame decode failed: {}", e);
                    break 'recv;
                }
            }
        }
    }

    running.store(false, Ordering::Relaxed);
    let _ = tx.send(LinkEvent::Disconnected);
    log::info!("Receive loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::frame::Body;
    use std::net::TcpListener;

    /// Drive the receive loop against a local socket pair.
    #[test]
    fn receive_loop_delivers_frames_then_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            let mut bytes = encode_text(Tag::RESOLUTION, "500;500");
            bytes.extend_from_slice(&encode_bytes(Tag::IMAGE, &[1, 2, 3]));
            // Split mid-frame to exercise reassembly across reads.
            peer.write_all(&bytes[..5]).unwrap();
            peer.flush().unwrap();
            std::thread::sleep(std::time::Duration::from_millis(20));
            peer.write_all(&bytes[5..]).unwrap();
            // Dropping the socket closes the connection.
        });

        let mut conn = Connection::connect(addr.ip(), addr.port()).unwrap();
        let rx = conn.start_receive().unwrap();

        let timeout = std::time::Duration::from_secs(2);
        match rx.recv_timeout(timeout).unwrap() {
            LinkEvent::Frame(frame) => {
                assert_eq!(frame.tag, Tag::RESOLUTION);
                assert_eq!(frame.body, Body::Text("500;500".to_string()));
            }
            other => panic!("expected resolution frame, got {:?}", other),
        }
        match rx.recv_timeout(timeout).unwrap() {
            LinkEvent::Frame(frame) => assert_eq!(frame.body, Body::Bytes(vec![1, 2, 3])),
            other => panic!("expected image frame, got {:?}", other),
        }
        assert_eq!(rx.recv_timeout(timeout).unwrap(), LinkEvent::Disconnected);
        assert!(rx.recv_timeout(std::time::Duration::from_millis(100)).is_err());

        server.join().unwrap();
        conn.stop();
    }

    #[test]
    fn connect_to_unreachable_address_fails() {
        // Port 1 on localhost is essentially never listening.
        let result = Connection::connect("127.0.0.1".parse().unwrap(), 1);
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[test]
    fn stop_aborts_blocking_read() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (peer, _) = listener.accept().unwrap();
            std::thread::sleep(std::time::Duration::from_millis(200));
            drop(peer);
        });

        let mut conn = Connection::connect(addr.ip(), addr.port()).unwrap();
        let rx = conn.start_receive().unwrap();
        assert_eq!(conn.state(), LinkState::Connected);
        conn.stop();
        assert_eq!(
            rx.recv_timeout(std::time::Duration::from_secs(2)).unwrap(),
            LinkEvent::Disconnected
        );
        assert!(!conn.is_receiving());
        assert_eq!(conn.state(), LinkState::Disconnected);
        server.join().unwrap();
    }
}
