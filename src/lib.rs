//! Valvebank — polarity-aware control of binary solenoid valves.
//!
//! Callers speak in logical states (`true` = closed); the controller
//! hides per-valve polarity, validates every batch against the configured
//! valve set, and drives either a real board or an in-memory simulation.
//!
//! ```text
//!   ValveController ──▶ PinBackend ──┬──▶ HardwareBackend ──▶ BoardDriver
//!                                    └──▶ VirtualBackend
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;

pub use adapters::backend::ModeBackend;
pub use adapters::hardware::HardwareBackend;
pub use adapters::simulated::VirtualBackend;
pub use app::polarity::{ValveId, ValveSet};
pub use app::ports::{BoardConnection, BoardDriver, ConnectionState, PinBackend};
pub use app::service::{BoardController, ValveController};
pub use config::{ConnectionParams, ControllerConfig, Mode};
pub use error::{BackendError, ErrorCode, ValveError};
