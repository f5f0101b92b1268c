//! Board driver over `embedded-hal` digital pins.
//!
//! For hosts that expose valve lines as [`StatefulOutputPin`]s (Linux
//! GPIO character devices, port expanders, MCU HALs).  Pins are
//! registered under their digital name and shared with whichever
//! connection is currently open; only one connection may be open at a
//! time.

use core::fmt;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use embedded_hal::digital::{PinState, StatefulOutputPin};
use log::debug;

use crate::app::polarity::{ValveId, pin_name};
use crate::app::ports::{BoardConnection, BoardDriver};
use crate::config::ConnectionParams;

type PinMap<P> = Rc<RefCell<BTreeMap<String, P>>>;

/// Errors from [`HalBoard`] and [`HalConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalBoardError {
    /// The requested board type is not the one these pins belong to.
    BoardTypeMismatch { expected: String, requested: String },
    /// A connection is already open.
    Busy,
    /// No pin is registered under this name.
    UnknownPin(String),
    /// The HAL reported an error on a pin.
    Pin { pin: String, kind: String },
}

impl fmt::Display for HalBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardTypeMismatch {
                expected,
                requested,
            } => write!(f, "board is {expected}, not {requested}"),
            Self::Busy => write!(f, "board already has an open connection"),
            Self::UnknownPin(pin) => write!(f, "no pin registered as {pin}"),
            Self::Pin { pin, kind } => write!(f, "{pin}: {kind}"),
        }
    }
}

/// A set of named HAL output pins acting as one board.
pub struct HalBoard<P> {
    board_type: String,
    pins: PinMap<P>,
}

impl<P: StatefulOutputPin> HalBoard<P> {
    pub fn new(board_type: impl Into<String>) -> Self {
        Self {
            board_type: board_type.into(),
            pins: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    /// Register `pin` as the line for `valve` (`D<valve>`).
    #[must_use]
    pub fn with_valve_pin(self, valve: ValveId, pin: P) -> Self {
        self.pins.borrow_mut().insert(pin_name(valve), pin);
        self
    }

    pub fn board_type(&self) -> &str {
        &self.board_type
    }

    /// Whether a connection handed out by [`BoardDriver::open`] is still alive.
    pub fn is_connected(&self) -> bool {
        Rc::strong_count(&self.pins) > 1
    }
}

impl<P: StatefulOutputPin> BoardDriver for HalBoard<P> {
    type Connection = HalConnection<P>;
    type Error = HalBoardError;

    fn open(&mut self, params: &ConnectionParams) -> Result<HalConnection<P>, HalBoardError> {
        if params.board_type != self.board_type {
            return Err(HalBoardError::BoardTypeMismatch {
                expected: self.board_type.clone(),
                requested: params.board_type.clone(),
            });
        }
        if self.is_connected() {
            return Err(HalBoardError::Busy);
        }
        debug!("hal board {} opened as {}", self.board_type, params.port);
        Ok(HalConnection {
            pins: Rc::clone(&self.pins),
        })
    }
}

/// Open connection to a [`HalBoard`].
pub struct HalConnection<P> {
    pins: PinMap<P>,
}

impl<P: StatefulOutputPin> HalConnection<P> {
    fn with_pin<T>(
        &mut self,
        pin: &str,
        op: impl FnOnce(&mut P) -> Result<T, P::Error>,
    ) -> Result<T, HalBoardError> {
        let mut pins = self.pins.borrow_mut();
        let line = pins
            .get_mut(pin)
            .ok_or_else(|| HalBoardError::UnknownPin(pin.to_owned()))?;
        op(line).map_err(|e| HalBoardError::Pin {
            pin: pin.to_owned(),
            kind: format!("{:?}", embedded_hal::digital::Error::kind(&e)),
        })
    }
}

impl<P: StatefulOutputPin> BoardConnection for HalConnection<P> {
    type Error = HalBoardError;

    fn write_digital(&mut self, pin: &str, level: bool) -> Result<(), HalBoardError> {
        self.with_pin(pin, |line| line.set_state(PinState::from(level)))
    }

    fn read_digital(&mut self, pin: &str) -> Result<bool, HalBoardError> {
        self.with_pin(pin, |line| line.is_set_high())
    }

    fn close(self) -> Result<(), HalBoardError> {
        Ok(())
    }
}
