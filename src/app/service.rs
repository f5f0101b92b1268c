//! Valve controller — the orchestration core.
//!
//! [`ValveController`] owns the valve set, the current-value table, the
//! last-error field and the execution backend.  There is exactly one code
//! path for validation and polarity translation; only the final pin
//! read/write is delegated to the backend.
//!
//! ```text
//!  set_valves ──▶ validate ──▶ translate ──▶ PinBackend::write_pin ──▶ settle
//!  get_valves ──▶ validate ──▶ PinBackend::read_pin ──▶ translate back
//!                                  │
//!                                  └──▶ last error (queried after the fact)
//! ```
//!
//! Every operation returns its outcome directly *and* records it as the
//! last error.  [`ValveController::last_error`] exists for callers that
//! check errors after the fact.

use core::time::Duration;
use std::collections::BTreeMap;

use anyhow::Context;
use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::adapters::backend::ModeBackend;
use crate::adapters::delay::{NoDelay, StdDelay};
use crate::adapters::simulated::VirtualBackend;
use crate::config::{ConnectionParams, ControllerConfig, Mode};
use crate::error::{BackendError, ErrorCode, Result, ValveError};

use super::polarity::{
    ValveId, ValveSet, first_unknown, pin_name, translate_read, translate_write,
    validate_lengths,
};
use super::ports::{BoardDriver, ConnectionState, PinBackend};

/// Pause after a successful hardware write unless configured otherwise.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Controller whose mode is picked at runtime from configuration.
pub type BoardController<D> = ValveController<ModeBackend<D>, StdDelay>;

/// Polarity-aware controller for one bank of valves on one board.
///
/// Not internally synchronised: one owner, or external serialisation.
pub struct ValveController<B: PinBackend, T: DelayNs = StdDelay> {
    valves: ValveSet,
    /// Last known logical state per valve (`true` = closed).
    current: BTreeMap<ValveId, bool>,
    backend: B,
    delay: T,
    settle_delay: Duration,
    last_error: ErrorCode,
}

impl<B: PinBackend> ValveController<B, StdDelay> {
    /// Bind `backend` with the default blocking settle delay.
    pub fn new(backend: B, valves: ValveSet) -> Self {
        Self::with_delay(backend, valves, StdDelay, DEFAULT_SETTLE_DELAY)
    }
}

impl<D: BoardDriver> ValveController<ModeBackend<D>, StdDelay> {
    /// Build a controller for `mode`.  In [`Mode::Virtual`] the driver is
    /// never touched.
    pub fn connect(driver: D, params: ConnectionParams, valves: ValveSet, mode: Mode) -> Self {
        let backend = ModeBackend::for_mode(mode, driver, params, &valves);
        Self::new(backend, valves)
    }

    /// Build a controller from a configuration.  The configuration is
    /// validated first; a rejected one never reaches the driver.
    pub fn from_config(driver: D, config: &ControllerConfig) -> anyhow::Result<Self> {
        config.validate().context("validating controller config")?;
        let valves = config.valve_set();
        let backend =
            ModeBackend::for_mode(config.mode, driver, config.connection.clone(), &valves);
        Ok(Self::with_delay(
            backend,
            valves,
            StdDelay,
            config.settle_delay(),
        ))
    }
}

impl ValveController<VirtualBackend, NoDelay> {
    /// Simulated controller; no hardware, no settle delay.
    pub fn simulated(valves: ValveSet) -> Self {
        let backend = VirtualBackend::new(&valves);
        Self::with_delay(backend, valves, NoDelay, Duration::ZERO)
    }
}

impl<B: PinBackend, T: DelayNs> ValveController<B, T> {
    /// Bind `backend`, open it and drive every valve open.
    ///
    /// A failed open does not fail construction: the last error becomes
    /// [`ErrorCode::BackendFailure`] and the controller stays usable for
    /// [`last_error`](Self::last_error), [`close`](Self::close) and
    /// [`reset`](Self::reset).
    pub fn with_delay(backend: B, valves: ValveSet, delay: T, settle_delay: Duration) -> Self {
        let current = valves.ids().map(|id| (id, false)).collect();
        let mut ctl = Self {
            valves,
            current,
            backend,
            delay,
            settle_delay,
            last_error: ErrorCode::NoError,
        };
        info!(
            "valve controller: {} valves, {:?} mode",
            ctl.valves.len(),
            ctl.backend.mode()
        );

        let opened = ctl.backend.open().map_err(ValveError::from);
        if ctl.record(opened).is_ok() {
            // Boot state of the lines is unknown until commanded.
            let _ = ctl.open_all();
        }
        ctl
    }

    // ── Valve operations ──────────────────────────────────────

    /// Set logical state `values[i]` (`true` = closed) on valve `ids[i]`.
    ///
    /// Validation failures write nothing.  A backend failure abandons the
    /// rest of the batch: writes already made stay on the lines, and the
    /// current-value table is left untouched.
    pub fn set_valves(&mut self, ids: &[ValveId], values: &[bool]) -> Result<()> {
        let outcome = self.write_batch(ids, values);
        self.record(outcome)
    }

    /// Logical state (`true` = closed) of each valve in `ids`.
    pub fn get_valves(&mut self, ids: &[ValveId]) -> Result<Vec<bool>> {
        let outcome = self.read_batch(ids);
        self.record(outcome)
    }

    pub fn set_valve(&mut self, id: ValveId, closed: bool) -> Result<()> {
        self.set_valves(&[id], &[closed])
    }

    pub fn get_valve(&mut self, id: ValveId) -> Result<bool> {
        self.get_valves(&[id]).map(|states| states[0])
    }

    /// Drive every configured valve to logical open.
    pub fn open_all(&mut self) -> Result<()> {
        let ids: Vec<ValveId> = self.valves.ids().collect();
        let values = vec![false; ids.len()];
        self.set_valves(&ids, &values)
    }

    // ── Connection lifecycle ──────────────────────────────────

    /// Release the backend connection.  Idempotent; teardown failures are
    /// logged and swallowed.
    pub fn close(&mut self) {
        if let Err(e) = self.backend.close() {
            warn!("ignoring teardown failure: {}", e);
        }
    }

    /// Close and reopen the connection.  Valve states are not restored.
    pub fn reset(&mut self) -> Result<()> {
        info!("resetting {:?} backend", self.backend.mode());
        self.close();
        let reopened = self.backend.open().map_err(ValveError::from);
        self.record(reopened)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Valve id → polarity (`true` = normally closed).
    pub fn polarity(&self) -> &BTreeMap<ValveId, bool> {
        self.valves.as_map()
    }

    pub fn num_valves(&self) -> usize {
        self.valves.len()
    }

    pub fn valve_set(&self) -> &ValveSet {
        &self.valves
    }

    /// Last known logical state per valve.
    pub fn current_values(&self) -> &BTreeMap<ValveId, bool> {
        &self.current
    }

    /// Outcome of the most recent valve or connection operation.
    pub fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    /// Last error as `(code, description)`.
    pub fn last_error_report(&self) -> (u32, &'static str) {
        (self.last_error.code(), self.last_error.description())
    }

    pub fn mode(&self) -> Mode {
        self.backend.mode()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.backend.connection_state()
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ── Internal ──────────────────────────────────────────────

    fn record<R>(&mut self, outcome: Result<R>) -> Result<R> {
        self.last_error = match &outcome {
            Ok(_) => ErrorCode::NoError,
            Err(e) => e.code(),
        };
        outcome
    }

    fn polarity_of(&self, id: ValveId) -> Result<bool> {
        self.valves.polarity(id).ok_or(ValveError::OutOfBounds(id))
    }

    fn check_membership(&self, ids: &[ValveId]) -> Result<()> {
        match first_unknown(ids, &self.valves) {
            Some(id) => {
                warn!("valve {} is not configured", id);
                Err(ValveError::OutOfBounds(id))
            }
            None => Ok(()),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.backend.connection_state() {
            ConnectionState::Open => Ok(()),
            state => {
                warn!("{:?} backend is {:?}", self.backend.mode(), state);
                Err(BackendError::NotOpen.into())
            }
        }
    }

    fn write_batch(&mut self, ids: &[ValveId], values: &[bool]) -> Result<()> {
        if !validate_lengths(ids, values) {
            warn!("{} valves but {} values", ids.len(), values.len());
            return Err(ValveError::LengthMismatch {
                valves: ids.len(),
                values: values.len(),
            });
        }
        self.check_membership(ids)?;
        self.ensure_open()?;

        let mut applied = Vec::with_capacity(ids.len());
        for (&id, &closed) in ids.iter().zip(values) {
            let level = translate_write(closed, self.polarity_of(id)?);
            debug!("valve {} closed={} -> {}={}", id, closed, pin_name(id), level);
            if let Err(source) = self.backend.write_pin(id, level) {
                error!("write to valve {} failed: {}", id, source);
                return Err(ValveError::Backend { source, applied });
            }
            applied.push(id);
        }

        for (&id, &closed) in ids.iter().zip(values) {
            self.current.insert(id, closed);
        }
        if !ids.is_empty() {
            self.settle();
        }
        Ok(())
    }

    fn read_batch(&mut self, ids: &[ValveId]) -> Result<Vec<bool>> {
        self.check_membership(ids)?;
        self.ensure_open()?;

        let mut states = Vec::with_capacity(ids.len());
        for &id in ids {
            let polarity = self.polarity_of(id)?;
            let level = self.backend.read_pin(id).map_err(|source| {
                error!("read of valve {} failed: {}", id, source);
                ValveError::from(source)
            })?;
            states.push(translate_read(level, polarity));
        }

        for (&id, &closed) in ids.iter().zip(&states) {
            self.current.insert(id, closed);
        }
        Ok(states)
    }

    fn settle(&mut self) {
        if self.backend.mode() != Mode::Real {
            return;
        }
        // DelayNs takes u32 microseconds; longer delays go in chunks.
        let mut remaining = self.settle_delay.as_micros();
        while remaining > 0 {
            let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
            self.delay.delay_us(chunk);
            remaining -= u128::from(chunk);
        }
    }
}
