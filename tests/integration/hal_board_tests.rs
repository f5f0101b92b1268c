//! End-to-end: controller → hardware backend → `embedded-hal` pins.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use valvebank::adapters::delay::NoDelay;
use valvebank::adapters::hal_board::HalBoard;
use valvebank::{ConnectionParams, ErrorCode, HardwareBackend, ValveController, ValveSet};

/// Output pin whose level is observable from the test.
#[derive(Clone, Default)]
struct ProbePin(Rc<Cell<bool>>);

impl ErrorType for ProbePin {
    type Error = core::convert::Infallible;
}

impl OutputPin for ProbePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

impl StatefulOutputPin for ProbePin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

#[test]
fn hal_pins_follow_logical_commands() {
    let (d2, d3) = (ProbePin::default(), ProbePin::default());
    let board = HalBoard::new("uno")
        .with_valve_pin(2, d2.clone())
        .with_valve_pin(3, d3.clone());
    let valves: ValveSet = [(2, false), (3, true)].into_iter().collect();
    let backend = HardwareBackend::new(board, ConnectionParams::new("gpiochip0", "uno"));
    let mut ctl = ValveController::with_delay(backend, valves, NoDelay, Duration::ZERO);

    assert_eq!(ctl.last_error(), ErrorCode::NoError);
    // All open: normally-closed valve 3 held high.
    assert!(!d2.0.get());
    assert!(d3.0.get());

    ctl.set_valves(&[2, 3], &[true, true]).unwrap();
    assert!(d2.0.get());
    assert!(!d3.0.get());
    assert_eq!(ctl.get_valves(&[2, 3]).unwrap(), vec![true, true]);

    ctl.reset().unwrap();
    assert_eq!(ctl.get_valves(&[3]).unwrap(), vec![true]);
}

#[test]
fn missing_hal_pin_is_a_backend_failure() {
    let board = HalBoard::new("uno").with_valve_pin(0, ProbePin::default());
    let valves: ValveSet = [(0, false), (1, false)].into_iter().collect();
    let backend = HardwareBackend::new(board, ConnectionParams::new("gpiochip0", "uno"));
    let ctl = ValveController::with_delay(backend, valves, NoDelay, Duration::ZERO);

    // Construction drives D1 too, which has no pin behind it.
    assert_eq!(ctl.last_error(), ErrorCode::BackendFailure);
}

#[test]
fn board_type_mismatch_fails_to_connect() {
    let board = HalBoard::new("mega").with_valve_pin(0, ProbePin::default());
    let valves: ValveSet = [(0, false)].into_iter().collect();
    let backend = HardwareBackend::new(board, ConnectionParams::new("gpiochip0", "uno"));
    let mut ctl = ValveController::with_delay(backend, valves, NoDelay, Duration::ZERO);

    assert_eq!(ctl.last_error(), ErrorCode::BackendFailure);
    assert_eq!(ctl.set_valve(0, true).unwrap_err().code(), ErrorCode::BackendFailure);
}
