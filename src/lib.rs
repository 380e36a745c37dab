//! YantraLink - Telemetry link and live mapping for a teleoperated robot
//!
//! This library provides the controller-side pipeline for a mobile
//! mapping robot:
//!
//! - Framed TCP link plus UDP discovery ([`link`])
//! - Typed dispatch of incoming telemetry ([`dispatch`])
//! - Map record parsing and the growable occupancy grid ([`map`])
//! - Drive instructions, input mapping and dead reckoning ([`motion`])
//! - Grid rasterization and the world-to-pixel viewport ([`render`])
//! - Session state tying it all together ([`session`])
//! - An offline simulator for hardware-free demos ([`sim`])

pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod map;
pub mod motion;
pub mod render;
pub mod session;
pub mod sim;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
