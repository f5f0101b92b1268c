//! Controllers built from a mode flag or a JSON configuration.

use std::time::Duration;

use super::mock_board::MockBoard;
use valvebank::{
    BoardController, ConnectionParams, ConnectionState, ControllerConfig, ErrorCode, Mode,
    ModeBackend, ValveController, ValveSet,
};

fn valves() -> ValveSet {
    [(0, false), (1, true), (4, true)].into_iter().collect()
}

#[test]
fn virtual_mode_never_touches_the_driver() {
    let board = MockBoard::new();
    let mut ctl: BoardController<MockBoard> = ValveController::connect(
        board.clone(),
        ConnectionParams::new("/dev/ttyACM0", "uno"),
        valves(),
        Mode::Virtual,
    );

    assert_eq!(ctl.mode(), Mode::Virtual);
    assert!(matches!(ctl.backend(), ModeBackend::Virtual(_)));
    ctl.set_valves(&[0, 1, 4], &[true, false, true]).unwrap();
    assert_eq!(ctl.get_valves(&[4, 1, 0]).unwrap(), vec![true, false, true]);
    ctl.close();
    ctl.reset().unwrap();

    let state = board.state.borrow();
    assert_eq!(state.opens, 0);
    assert!(state.calls.is_empty());
}

#[test]
fn real_mode_connects_with_the_given_params() {
    let board = MockBoard::new();
    let params = ConnectionParams::new("COM7", "mega");
    let ctl = ValveController::connect(board.clone(), params.clone(), valves(), Mode::Real);

    assert_eq!(ctl.mode(), Mode::Real);
    assert_eq!(ctl.connection_state(), ConnectionState::Open);
    assert_eq!(ctl.settle_delay(), Duration::from_millis(10));
    assert_eq!(board.state.borrow().params.as_ref(), Some(&params));
    assert_eq!(board.state.borrow().writes().len(), 3);
}

#[test]
fn json_config_drives_construction() {
    let config = ControllerConfig::from_json(
        r#"{
            "connection": { "port": "/dev/ttyUSB1", "board_type": "uno" },
            "valves": { "0": false, "1": true },
            "settle_delay_ms": 0
        }"#,
    )
    .unwrap();
    let board = MockBoard::new();
    let mut ctl = ValveController::from_config(board.clone(), &config).unwrap();

    assert_eq!(ctl.last_error(), ErrorCode::NoError);
    assert_eq!(ctl.settle_delay(), Duration::ZERO);
    assert_eq!(ctl.num_valves(), 2);
    assert_eq!(ctl.polarity().get(&1), Some(&true));

    ctl.set_valves(&[0, 1], &[true, true]).unwrap();
    assert_eq!(board.state.borrow().level("D0"), Some(true));
    assert_eq!(board.state.borrow().level("D1"), Some(false));
}

#[test]
fn virtual_json_config_needs_no_port() {
    let config = ControllerConfig::from_json(r#"{ "mode": "virtual", "valves": { "2": true } }"#)
        .unwrap();
    let mut ctl = ValveController::from_config(MockBoard::new(), &config).unwrap();
    assert_eq!(ctl.mode(), Mode::Virtual);
    ctl.set_valve(2, true).unwrap();
    assert!(ctl.get_valve(2).unwrap());
}

#[test]
fn invalid_config_is_refused_before_connecting() {
    let board = MockBoard::new();

    let mut no_port = ControllerConfig::default();
    no_port.valves.insert(0, false);
    let err = ValveController::from_config(board.clone(), &no_port)
        .err()
        .expect("real mode without a port must be refused");
    assert!(format!("{err:#}").contains("connection.port"));

    let huge_delay = ControllerConfig {
        connection: ConnectionParams::new("/dev/ttyACM0", "uno"),
        settle_delay_ms: u32::MAX,
        ..ControllerConfig::default()
    };
    let err = ValveController::from_config(board.clone(), &huge_delay)
        .err()
        .expect("oversized settle delay must be refused");
    assert!(format!("{err:#}").contains("settle_delay_ms"));

    assert_eq!(board.state.borrow().opens, 0);
}
