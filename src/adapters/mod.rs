//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter     | Implements    | Connects to                        |
//! |-------------|---------------|------------------------------------|
//! | `hardware`  | PinBackend    | any `BoardDriver`                  |
//! | `simulated` | PinBackend    | in-memory line mirror              |
//! | `backend`   | PinBackend    | hardware or simulated, by `Mode`   |
//! | `hal_board` | BoardDriver   | `embedded-hal` output pins         |
//! | `delay`     | DelayNs       | thread sleep / no-op               |

pub mod backend;
pub mod delay;
pub mod hal_board;
pub mod hardware;
pub mod simulated;
