//! Hardware backend — drives real digital lines through a [`BoardDriver`].
//!
//! Owns the board connection exclusively.  Every driver error is folded
//! into a [`BackendError`] here, so nothing driver-specific reaches the
//! controller.  Valve `v` is always addressed as pin `D<v>`.

use log::{error, info, warn};

use crate::app::polarity::{ValveId, pin_name};
use crate::app::ports::{BoardConnection, BoardDriver, ConnectionState, PinBackend};
use crate::config::{ConnectionParams, Mode};
use crate::error::BackendError;

enum Link<C> {
    Unopened,
    Open(C),
    Closed,
}

/// Backend bound to one board connection.
pub struct HardwareBackend<D: BoardDriver> {
    driver: D,
    params: ConnectionParams,
    link: Link<D::Connection>,
}

impl<D: BoardDriver> HardwareBackend<D> {
    /// Bind to `driver` without connecting yet.
    pub fn new(driver: D, params: ConnectionParams) -> Self {
        Self {
            driver,
            params,
            link: Link::Unopened,
        }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn connection(&mut self) -> Result<&mut D::Connection, BackendError> {
        match &mut self.link {
            Link::Open(conn) => Ok(conn),
            Link::Unopened | Link::Closed => Err(BackendError::NotOpen),
        }
    }
}

impl<D: BoardDriver> PinBackend for HardwareBackend<D> {
    fn mode(&self) -> Mode {
        Mode::Real
    }

    fn connection_state(&self) -> ConnectionState {
        match self.link {
            Link::Unopened => ConnectionState::Unopened,
            Link::Open(_) => ConnectionState::Open,
            Link::Closed => ConnectionState::Closed,
        }
    }

    fn open(&mut self) -> Result<(), BackendError> {
        if matches!(self.link, Link::Open(_)) {
            let _ = self.close();
        }
        match self.driver.open(&self.params) {
            Ok(conn) => {
                info!(
                    "board {} connected on {}",
                    self.params.board_type, self.params.port
                );
                self.link = Link::Open(conn);
                Ok(())
            }
            Err(e) => {
                error!(
                    "board {} on {} failed to connect: {}",
                    self.params.board_type, self.params.port, e
                );
                Err(BackendError::Connect(e.to_string()))
            }
        }
    }

    fn close(&mut self) -> Result<(), BackendError> {
        let link = core::mem::replace(&mut self.link, Link::Closed);
        match link {
            Link::Open(conn) => conn.close().map_err(|e| {
                warn!("closing {} failed: {}", self.params.port, e);
                BackendError::Close(e.to_string())
            }),
            Link::Unopened => {
                self.link = Link::Unopened;
                Ok(())
            }
            Link::Closed => Ok(()),
        }
    }

    fn write_pin(&mut self, valve: ValveId, level: bool) -> Result<(), BackendError> {
        let pin = pin_name(valve);
        self.connection()?
            .write_digital(&pin, level)
            .map_err(|e| BackendError::Io {
                pin,
                reason: e.to_string(),
            })
    }

    fn read_pin(&mut self, valve: ValveId) -> Result<bool, BackendError> {
        let pin = pin_name(valve);
        self.connection()?
            .read_digital(&pin)
            .map_err(|e| BackendError::Io {
                pin,
                reason: e.to_string(),
            })
    }
}

impl<D: BoardDriver> Drop for HardwareBackend<D> {
    fn drop(&mut self) {
        // Teardown is best-effort; failures are already logged.
        let _ = self.close();
    }
}
