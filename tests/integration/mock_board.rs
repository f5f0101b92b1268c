//! Scripted board driver for integration tests.
//!
//! Records every pin call in a shared log and can be told to refuse
//! connections, fail the Nth write, or fail teardown, so tests can
//! assert on exactly what reached the lines.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use valvebank::{BoardConnection, BoardDriver, ConnectionParams};

// ── Pin call record ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinCall {
    Write { pin: String, level: bool },
    Read { pin: String },
}

#[derive(Debug, Default)]
pub struct BoardState {
    pub calls: Vec<PinCall>,
    pub levels: BTreeMap<String, bool>,
    pub opens: u32,
    pub closes: u32,
    pub params: Option<ConnectionParams>,
    /// Refuse every `open` while set.
    pub refuse_open: bool,
    fail_write_at: Option<usize>,
    /// Fail every read while set.
    pub fail_reads: bool,
    /// Fail every `close` while set.
    pub fail_close: bool,
    writes: usize,
}

#[allow(dead_code)]
impl BoardState {
    pub fn writes(&self) -> Vec<(String, bool)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PinCall::Write { pin, level } => Some((pin.clone(), *level)),
                PinCall::Read { .. } => None,
            })
            .collect()
    }

    pub fn level(&self, pin: &str) -> Option<bool> {
        self.levels.get(pin).copied()
    }
}

// ── MockBoard ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockBoard {
    pub state: Rc<RefCell<BoardState>>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        let board = Self::new();
        board.state.borrow_mut().refuse_open = true;
        board
    }

    /// Fail the `n`th write issued from now on (1 = the very next one).
    pub fn fail_write_in(&self, n: usize) {
        let mut state = self.state.borrow_mut();
        state.fail_write_at = Some(state.writes + n);
    }

    /// Flip a line behind the controller's back (e.g. board reboot).
    pub fn force_level(&self, pin: &str, level: bool) {
        self.state.borrow_mut().levels.insert(pin.to_owned(), level);
    }
}

pub struct MockConnection {
    state: Rc<RefCell<BoardState>>,
}

impl BoardDriver for MockBoard {
    type Connection = MockConnection;
    type Error = String;

    fn open(&mut self, params: &ConnectionParams) -> Result<MockConnection, String> {
        let mut state = self.state.borrow_mut();
        if state.refuse_open {
            return Err(format!("cannot open {}", params.port));
        }
        state.opens += 1;
        state.params = Some(params.clone());
        Ok(MockConnection {
            state: Rc::clone(&self.state),
        })
    }
}

impl BoardConnection for MockConnection {
    type Error = String;

    fn write_digital(&mut self, pin: &str, level: bool) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        state.writes += 1;
        if state.fail_write_at == Some(state.writes) {
            return Err("write timed out".to_owned());
        }
        state.calls.push(PinCall::Write {
            pin: pin.to_owned(),
            level,
        });
        state.levels.insert(pin.to_owned(), level);
        Ok(())
    }

    fn read_digital(&mut self, pin: &str) -> Result<bool, String> {
        let mut state = self.state.borrow_mut();
        if state.fail_reads {
            return Err("read timed out".to_owned());
        }
        state.calls.push(PinCall::Read { pin: pin.to_owned() });
        Ok(state.levels.get(pin).copied().unwrap_or(false))
    }

    fn close(self) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        state.closes += 1;
        if state.fail_close {
            return Err("port vanished".to_owned());
        }
        Ok(())
    }
}

// ── Delay that only counts ────────────────────────────────────

#[derive(Clone, Default)]
pub struct CountingDelay {
    pub total_ns: Rc<RefCell<u64>>,
    pub calls: Rc<RefCell<u32>>,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        *self.calls.borrow_mut() += 1;
        *self.total_ns.borrow_mut() += u64::from(us) * 1_000;
    }
}
