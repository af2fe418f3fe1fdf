//! game-link: the game client's connection to its backend server
//!
//! This library provides:
//! - A reconnecting JSON-over-WebSocket client with observer fan-out
//! - One-shot JSON HTTP requests against the same server
//! - A connection status display fed by connection changes
//! - Configuration, logging and metrics setup
//! - An in-memory connector for tests

pub mod cli;
pub mod config;
pub mod http;
pub mod status;
pub mod telemetry;
pub mod testing;
pub mod ws;
