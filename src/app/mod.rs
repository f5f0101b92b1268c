//! Application core — controller logic behind port traits.
//!
//! [`polarity`] holds the pure translation and validation rules,
//! [`ports`] the traits backends and board drivers implement, and
//! [`service`] the [`ValveController`](service::ValveController) that
//! ties them together.

pub mod polarity;
pub mod ports;
pub mod service;
