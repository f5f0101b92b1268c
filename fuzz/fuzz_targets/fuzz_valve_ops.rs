//! Fuzz target: simulated valve controller
//!
//! Decodes the input into a valve set and a sequence of set/get/reset
//! operations, runs them against the simulated controller and checks:
//! - No panics under arbitrary byte inputs
//! - A rejected batch never changes the current-value table
//! - The last error always matches the outcome just returned
//! - Every line level equals `closed XOR polarity` after a successful set
//!
//! cargo fuzz run fuzz_valve_ops

#![no_main]

use libfuzzer_sys::fuzz_target;
use valvebank::{ErrorCode, ValveController, ValveSet};

fuzz_target!(|data: &[u8]| {
    let Some((&header, rest)) = data.split_first() else {
        return;
    };

    // Low nibble: valve count; each valve takes one id byte, polarity from bit 7.
    let count = usize::from(header & 0x0F);
    if rest.len() < count {
        return;
    }
    let (valve_bytes, mut ops) = rest.split_at(count);
    let valves: ValveSet = valve_bytes
        .iter()
        .map(|b| (u32::from(b & 0x3F), b & 0x80 != 0))
        .collect();

    let mut ctl = ValveController::simulated(valves);
    assert_eq!(ctl.last_error(), ErrorCode::NoError);

    while let Some((&op, tail)) = ops.split_first() {
        let len = usize::from((op >> 2) & 0x0F).min(tail.len());
        let (args, next) = tail.split_at(len);
        ops = next;

        let ids: Vec<u32> = args.iter().map(|b| u32::from(b & 0x3F)).collect();
        match op & 0x03 {
            0 | 1 => {
                // Bit 6 drops the last value to provoke a length mismatch.
                let mut values: Vec<bool> = args.iter().map(|b| b & 0x40 != 0).collect();
                if op & 0x40 != 0 {
                    values.pop();
                }
                let before = ctl.current_values().clone();
                match ctl.set_valves(&ids, &values) {
                    Ok(()) => {
                        assert_eq!(ctl.last_error(), ErrorCode::NoError);
                        for (&id, _) in ids.iter().zip(&values) {
                            let closed = ctl.current_values()[&id];
                            let polarity = ctl.polarity()[&id];
                            assert_eq!(ctl.backend().level(id), Some(closed ^ polarity));
                        }
                    }
                    Err(e) => {
                        assert_eq!(ctl.last_error(), e.code());
                        assert_eq!(ctl.current_values(), &before);
                    }
                }
            }
            2 => match ctl.get_valves(&ids) {
                Ok(states) => {
                    assert_eq!(states.len(), ids.len());
                    assert_eq!(ctl.last_error(), ErrorCode::NoError);
                }
                Err(e) => assert_eq!(ctl.last_error(), e.code()),
            },
            _ => {
                ctl.close();
                assert!(ctl.reset().is_ok());
            }
        }
    }
});
