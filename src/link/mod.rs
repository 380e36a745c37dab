//! Framed TCP transport and UDP discovery for the robot link.

pub mod connection;
pub mod discovery;
pub mod frame;

pub use connection::{Connection, LinkEvent, LinkState};
pub use frame::{encode_bytes, encode_text, Body, Frame, FrameDecoder, Tag};
