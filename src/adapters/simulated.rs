//! Virtual backend — an in-memory mirror of the valve lines.
//!
//! Used for tests and offline development.  Writes land in the mirror,
//! reads come straight back out of it, and nothing can fail.

use std::collections::BTreeMap;

use log::debug;

use crate::app::polarity::{ValveId, ValveSet, translate_write};
use crate::app::ports::{ConnectionState, PinBackend};
use crate::config::Mode;
use crate::error::BackendError;

/// Simulated board holding the last level written to each line.
#[derive(Debug, Clone, Default)]
pub struct VirtualBackend {
    levels: BTreeMap<ValveId, bool>,
}

impl VirtualBackend {
    /// Mirror with every valve at the line level for logical open.
    pub fn new(valves: &ValveSet) -> Self {
        let levels = valves
            .as_map()
            .iter()
            .map(|(&id, &polarity)| (id, translate_write(false, polarity)))
            .collect();
        Self { levels }
    }

    /// Current mirrored line level of `valve`.
    pub fn level(&self, valve: ValveId) -> Option<bool> {
        self.levels.get(&valve).copied()
    }
}

impl PinBackend for VirtualBackend {
    fn mode(&self) -> Mode {
        Mode::Virtual
    }

    fn connection_state(&self) -> ConnectionState {
        ConnectionState::Open
    }

    fn open(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn write_pin(&mut self, valve: ValveId, level: bool) -> Result<(), BackendError> {
        debug!("virtual: valve {} <- {}", valve, level);
        self.levels.insert(valve, level);
        Ok(())
    }

    fn read_pin(&mut self, valve: ValveId) -> Result<bool, BackendError> {
        Ok(self.levels.get(&valve).copied().unwrap_or(false))
    }
}
