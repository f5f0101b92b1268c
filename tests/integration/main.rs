//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the controller against
//! mock boards.  All tests run on the host with no real hardware.

mod config_tests;
mod hal_board_tests;
mod mock_board;
