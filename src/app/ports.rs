//! Port traits — the boundary between controller logic and the board.
//!
//! ```text
//!   BoardDriver ──▶ HardwareBackend ─┐
//!                                    ├──▶ PinBackend ──▶ ValveController
//!                   VirtualBackend ──┘
//! ```
//!
//! The controller only ever talks to a [`PinBackend`].  Real boards are
//! reached through a [`BoardDriver`], which the hardware backend wraps;
//! driver errors never cross the backend boundary untranslated.

use core::fmt::Display;

use crate::app::polarity::ValveId;
use crate::config::{ConnectionParams, Mode};
use crate::error::BackendError;

// ───────────────────────────────────────────────────────────────
// Execution backend (controller → pins)
// ───────────────────────────────────────────────────────────────

/// Lifecycle of a backend's connection.
///
/// `Unopened → Open` on a successful open, `Open → Closed` on close,
/// `Closed → Open` on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unopened,
    Open,
    Closed,
}

/// Common contract of the hardware and virtual backends.
///
/// Levels are physical line levels; polarity translation has already
/// happened in the controller.
pub trait PinBackend {
    /// Which kind of backend this is.
    fn mode(&self) -> Mode;

    fn connection_state(&self) -> ConnectionState;

    /// Open (or reopen) the connection.
    fn open(&mut self) -> Result<(), BackendError>;

    /// Release the connection.  Calling it on a closed backend is a no-op.
    fn close(&mut self) -> Result<(), BackendError>;

    /// Drive the pin of `valve` to `level`.
    fn write_pin(&mut self, valve: ValveId, level: bool) -> Result<(), BackendError>;

    /// Sample the pin of `valve`.
    fn read_pin(&mut self, valve: ValveId) -> Result<bool, BackendError>;
}

// ───────────────────────────────────────────────────────────────
// Board driver (external collaborator)
// ───────────────────────────────────────────────────────────────

/// Opens connections to a physical board.
pub trait BoardDriver {
    type Connection: BoardConnection;
    type Error: Display;

    /// Connect to the board described by `params`.
    fn open(&mut self, params: &ConnectionParams) -> Result<Self::Connection, Self::Error>;
}

/// An open board connection with named digital pins (`"D0"`, `"D1"`, …).
pub trait BoardConnection {
    type Error: Display;

    fn write_digital(&mut self, pin: &str, level: bool) -> Result<(), Self::Error>;

    fn read_digital(&mut self, pin: &str) -> Result<bool, Self::Error>;

    /// Tear the connection down.
    fn close(self) -> Result<(), Self::Error>;
}
