//! Polarity translation and input validation.
//!
//! Pure logic: no hardware, no controller state.  The controller runs
//! every batch through [`validate_lengths`] and [`validate_membership`]
//! before any I/O happens, then maps logical states to line levels with
//! [`translate_write`].
//!
//! ## Polarity
//!
//! `true` marks a normally-closed valve, `false` a normally-open one.
//! The same logical "closed" needs opposite line levels on the two kinds,
//! so the polarity toggles the level:
//!
//! | logical closed | polarity | line level |
//! |----------------|----------|------------|
//! | true           | true     | false      |
//! | false          | true     | true       |
//! | true           | false    | true       |
//! | false          | false    | false      |

use std::collections::BTreeMap;

/// Caller-assigned valve number.  Also selects digital pin `D<id>`.
pub type ValveId = u32;

/// Immutable mapping from valve id to polarity (`true` = normally closed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValveSet {
    polarity: BTreeMap<ValveId, bool>,
}

impl ValveSet {
    pub fn new(polarity: BTreeMap<ValveId, bool>) -> Self {
        Self { polarity }
    }

    pub fn contains(&self, id: ValveId) -> bool {
        self.polarity.contains_key(&id)
    }

    /// Polarity of `id`, or `None` if the valve is not configured.
    pub fn polarity(&self, id: ValveId) -> Option<bool> {
        self.polarity.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.polarity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polarity.is_empty()
    }

    /// Valve ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ValveId> + '_ {
        self.polarity.keys().copied()
    }

    pub fn as_map(&self) -> &BTreeMap<ValveId, bool> {
        &self.polarity
    }
}

impl FromIterator<(ValveId, bool)> for ValveSet {
    fn from_iter<I: IntoIterator<Item = (ValveId, bool)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<BTreeMap<ValveId, bool>> for ValveSet {
    fn from(polarity: BTreeMap<ValveId, bool>) -> Self {
        Self::new(polarity)
    }
}

/// `true` iff both sequences of a set-operation have equal length.
pub fn validate_lengths<A, B>(ids: &[A], values: &[B]) -> bool {
    ids.len() == values.len()
}

/// `true` iff every id is configured in `valves`.
pub fn validate_membership(ids: &[ValveId], valves: &ValveSet) -> bool {
    first_unknown(ids, valves).is_none()
}

/// First id in `ids` that is not in `valves`.
pub fn first_unknown(ids: &[ValveId], valves: &ValveSet) -> Option<ValveId> {
    ids.iter().copied().find(|id| !valves.contains(*id))
}

/// Line level to drive so the valve ends up in `logical_closed`.
pub const fn translate_write(logical_closed: bool, polarity: bool) -> bool {
    logical_closed ^ polarity
}

/// Logical state represented by a line level.  The toggle is its own inverse.
pub const fn translate_read(level: bool, polarity: bool) -> bool {
    translate_write(level, polarity)
}

/// Physical pin name for a valve: valve `v` lives on digital pin `D<v>`.
pub fn pin_name(id: ValveId) -> String {
    format!("D{id}")
}
