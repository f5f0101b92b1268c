//! Error types for the valve controller.
//!
//! Two layers live here:
//!
//! - [`ErrorCode`]: the stable numeric table callers can query after the
//!   fact through [`ValveController::last_error`](crate::app::service::ValveController::last_error).
//! - [`ValveError`] / [`BackendError`]: typed errors returned directly by
//!   every controller operation.
//!
//! Every [`ValveError`] maps onto exactly one [`ErrorCode`].

use core::fmt;

use crate::app::polarity::ValveId;

// ---------------------------------------------------------------------------
// Numeric error table
// ---------------------------------------------------------------------------

/// Outcome codes recorded in the controller's last-error field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// The operation completed fully.
    NoError = 0,
    /// Valve and value sequences differ in length.
    LengthMismatch = 1,
    /// A valve id is not part of the valve set.
    OutOfBounds = 2,
    /// Reserved for non-volatile memory access; never produced here.
    InvalidMemoryOffset = 10,
    /// Reserved for non-volatile memory access; never produced here.
    MemoryRangeOutOfBounds = 11,
    /// The board connection failed to open, read or write.
    BackendFailure = 999,
}

/// Description reported for codes outside the table.
pub const UNRECOGNIZED: &str = "unrecognized error code";

impl ErrorCode {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::NoError => "no error",
            Self::LengthMismatch => "valve and value lists differ in length",
            Self::OutOfBounds => "valve number out of bounds",
            Self::InvalidMemoryOffset => "invalid memory offset",
            Self::MemoryRangeOutOfBounds => "memory range out of bounds",
            Self::BackendFailure => "unknown error",
        }
    }

    /// Look up a raw code. Returns `None` for anything not in the table.
    pub const fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::NoError),
            1 => Some(Self::LengthMismatch),
            2 => Some(Self::OutOfBounds),
            10 => Some(Self::InvalidMemoryOffset),
            11 => Some(Self::MemoryRangeOutOfBounds),
            999 => Some(Self::BackendFailure),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

/// Describe an arbitrary raw code the way 32-bit callers expect it.
///
/// Negative codes come back as their two's-complement `u32`
/// (`-1` becomes `4294967295`).  Codes outside the table keep their
/// numeric value and describe as [`UNRECOGNIZED`].  A code that fits
/// neither `u32` nor `i32` reports as `u32::MAX`.
pub fn describe_code(raw: i64) -> (u32, &'static str) {
    if let Some(code) = ErrorCode::from_raw(raw) {
        return (code.code(), code.description());
    }
    let wire = u32::try_from(raw)
        .or_else(|_| i32::try_from(raw).map(|signed| signed as u32))
        .unwrap_or(u32::MAX);
    (wire, UNRECOGNIZED)
}

// ---------------------------------------------------------------------------
// Backend errors
// ---------------------------------------------------------------------------

/// Failures raised at the execution-backend boundary.
///
/// Anything the board driver reports is folded into one of these before
/// it reaches the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The hardware connection is unopened or closed.
    NotOpen,
    /// Opening the board connection failed.
    Connect(String),
    /// A digital read or write on `pin` failed.
    Io { pin: String, reason: String },
    /// Tearing the connection down failed.
    Close(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOpen => write!(f, "board connection is not open"),
            Self::Connect(reason) => write!(f, "connect failed: {reason}"),
            Self::Io { pin, reason } => write!(f, "I/O on {pin} failed: {reason}"),
            Self::Close(reason) => write!(f, "close failed: {reason}"),
        }
    }
}

impl std::error::Error for BackendError {}

// ---------------------------------------------------------------------------
// Controller operation errors
// ---------------------------------------------------------------------------

/// Errors returned by [`ValveController`](crate::app::service::ValveController) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValveError {
    /// `set_valves` received sequences of different lengths.
    LengthMismatch { valves: usize, values: usize },
    /// The valve id is not in the valve set.
    OutOfBounds(ValveId),
    /// The backend failed part-way through a batch.
    ///
    /// `applied` lists the valves already written before the failure.
    /// Those physical writes are not rolled back.
    Backend {
        source: BackendError,
        applied: Vec<ValveId>,
    },
}

impl ValveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::LengthMismatch { .. } => ErrorCode::LengthMismatch,
            Self::OutOfBounds(_) => ErrorCode::OutOfBounds,
            Self::Backend { .. } => ErrorCode::BackendFailure,
        }
    }
}

impl fmt::Display for ValveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { valves, values } => {
                write!(f, "{valves} valves but {values} values")
            }
            Self::OutOfBounds(id) => write!(f, "valve {id} is not configured"),
            Self::Backend { source, applied } if applied.is_empty() => {
                write!(f, "backend: {source}")
            }
            Self::Backend { source, applied } => {
                write!(f, "backend: {source} (already applied: {applied:?})")
            }
        }
    }
}

impl std::error::Error for ValveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<BackendError> for ValveError {
    fn from(source: BackendError) -> Self {
        Self::Backend {
            source,
            applied: Vec::new(),
        }
    }
}

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, ValveError>;
