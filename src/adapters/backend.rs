//! Backend selected at runtime from a [`Mode`] flag.
//!
//! Lets one controller type cover both modes when the choice comes from
//! configuration rather than from the caller's code.

use crate::app::polarity::{ValveId, ValveSet};
use crate::app::ports::{BoardDriver, ConnectionState, PinBackend};
use crate::config::{ConnectionParams, Mode};
use crate::error::BackendError;

use super::hardware::HardwareBackend;
use super::simulated::VirtualBackend;

/// Either a real board or its simulation.
pub enum ModeBackend<D: BoardDriver> {
    Hardware(HardwareBackend<D>),
    Virtual(VirtualBackend),
}

impl<D: BoardDriver> ModeBackend<D> {
    /// Build the backend for `mode`.  The driver is dropped unused in
    /// virtual mode.
    pub fn for_mode(mode: Mode, driver: D, params: ConnectionParams, valves: &ValveSet) -> Self {
        match mode {
            Mode::Real => Self::Hardware(HardwareBackend::new(driver, params)),
            Mode::Virtual => Self::Virtual(VirtualBackend::new(valves)),
        }
    }
}

impl<D: BoardDriver> PinBackend for ModeBackend<D> {
    fn mode(&self) -> Mode {
        match self {
            Self::Hardware(hw) => hw.mode(),
            Self::Virtual(sim) => sim.mode(),
        }
    }

    fn connection_state(&self) -> ConnectionState {
        match self {
            Self::Hardware(hw) => hw.connection_state(),
            Self::Virtual(sim) => sim.connection_state(),
        }
    }

    fn open(&mut self) -> Result<(), BackendError> {
        match self {
            Self::Hardware(hw) => hw.open(),
            Self::Virtual(sim) => sim.open(),
        }
    }

    fn close(&mut self) -> Result<(), BackendError> {
        match self {
            Self::Hardware(hw) => hw.close(),
            Self::Virtual(sim) => sim.close(),
        }
    }

    fn write_pin(&mut self, valve: ValveId, level: bool) -> Result<(), BackendError> {
        match self {
            Self::Hardware(hw) => hw.write_pin(valve, level),
            Self::Virtual(sim) => sim.write_pin(valve, level),
        }
    }

    fn read_pin(&mut self, valve: ValveId) -> Result<bool, BackendError> {
        match self {
            Self::Hardware(hw) => hw.read_pin(valve),
            Self::Virtual(sim) => sim.read_pin(valve),
        }
    }
}
