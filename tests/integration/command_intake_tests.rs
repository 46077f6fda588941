//! End-to-end command intake: `(property, payload)` strings decoded and
//! dispatched into the service, checking that every rejected command
//! leaves hardware, state and storage untouched.

use crate::mock_hw::{CollectingSink, MockHardware, MockNvs};

use podctl::action::ActionKind;
use podctl::action::routing::{ActuatorId, routing};
use podctl::app::commands::AppCommand;
use podctl::app::persistence;
use podctl::app::service::AppService;
use podctl::config::PodConfig;
use podctl::error::{CommandError, Error};
use podctl::sensors::flow::FlowCounter;

/// Decode and dispatch like the console path does.
fn send(
    app: &mut AppService<'_>,
    hw: &mut MockHardware,
    nvs: &mut MockNvs,
    sink: &mut CollectingSink,
    property: &str,
    payload: &str,
) -> Result<(), Error> {
    let cmd = AppCommand::decode(property, payload)?;
    app.handle_command(cmd, 0, hw, nvs, sink)
}

#[test]
fn refill_command_starts_refill() {
    let flow = FlowCounter::new();
    let (mut hw, mut nvs, mut sink) = (MockHardware::new(), MockNvs::new(), CollectingSink::new());
    let mut app = AppService::new(PodConfig::default(), &flow);

    send(
        &mut app,
        &mut hw,
        &mut nvs,
        &mut sink,
        "actions/refill",
        r#"{"maxMl":250,"maxSeconds":120}"#,
    )
    .unwrap();

    assert_eq!(app.action(), ActionKind::Refill);
    assert_eq!(hw.outputs(), routing(ActionKind::Refill));
    assert_eq!(app.machine().run().unwrap().max_pulses, 250 * 7);
}

#[test]
fn malformed_payloads_never_reach_the_machine() {
    let flow = FlowCounter::new();
    let (mut hw, mut nvs, mut sink) = (MockHardware::new(), MockNvs::new(), CollectingSink::new());
    let mut app = AppService::new(PodConfig::default(), &flow);

    let cases = [
        ("actions/drain", "", CommandError::MalformedPayload),
        ("actions/drain", "{}", CommandError::MalformedPayload),
        ("actions/drain", r#"{"maxMl":"10","maxSeconds":5}"#, CommandError::MalformedPayload),
        ("actions/drain", r#"{"maxMl":1.5,"maxSeconds":5}"#, CommandError::MalformedPayload),
        ("actions/drain", r#"{"maxMl":0,"maxSeconds":5}"#, CommandError::OutOfRange),
        ("actions/drain", r#"{"maxMl":5,"maxSeconds":0}"#, CommandError::OutOfRange),
        ("actions/boil", r#"{"maxMl":5,"maxSeconds":5}"#, CommandError::UnknownProperty),
    ];
    for (property, payload, expected) in cases {
        let err = send(&mut app, &mut hw, &mut nvs, &mut sink, property, payload).unwrap_err();
        assert_eq!(err, Error::Command(expected), "{property} {payload}");
    }

    assert_eq!(app.action(), ActionKind::Idle);
    assert!(hw.writes.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn flow_reset_with_non_true_payload_has_no_side_effect() {
    let flow = FlowCounter::new();
    flow.restore(55);
    let (mut hw, mut nvs, mut sink) = (MockHardware::new(), MockNvs::new(), CollectingSink::new());
    let mut app = AppService::new(PodConfig::default(), &flow);

    for payload in ["false", "1", "TRUE", "yes"] {
        let err = send(&mut app, &mut hw, &mut nvs, &mut sink, "flow/reset", payload).unwrap_err();
        assert_eq!(err, Error::Command(CommandError::ResetRejected));
    }
    assert_eq!(flow.load(), 55);
    assert!(nvs.raw(persistence::NAMESPACE, persistence::FLOW_KEY).is_none());

    send(&mut app, &mut hw, &mut nvs, &mut sink, "flow/reset", "true").unwrap();
    assert_eq!(flow.load(), 0);
    assert!(nvs.raw(persistence::NAMESPACE, persistence::FLOW_KEY).is_some());
}

#[test]
fn scale_reset_with_non_true_payload_has_no_side_effect() {
    let flow = FlowCounter::new();
    let (mut hw, mut nvs, mut sink) = (MockHardware::new(), MockNvs::new(), CollectingSink::new());
    persistence::save_weight(&mut nvs, 300.0).unwrap();
    let mut app = AppService::new(PodConfig::default(), &flow);
    app.boot(&nvs, &mut sink);

    let err = send(&mut app, &mut hw, &mut nvs, &mut sink, "scale/reset", "0").unwrap_err();
    assert_eq!(err, Error::Command(CommandError::ResetRejected));
    assert!((app.weight_g() - 300.0).abs() < 0.01);
    assert!((persistence::load_weight(&nvs) - 300.0).abs() < 0.01);
}

#[test]
fn valve_override_writes_only_that_pin() {
    let flow = FlowCounter::new();
    let (mut hw, mut nvs, mut sink) = (MockHardware::new(), MockNvs::new(), CollectingSink::new());
    let mut app = AppService::new(PodConfig::default(), &flow);

    send(&mut app, &mut hw, &mut nvs, &mut sink, "valves/in-secondary", "true").unwrap();
    assert_eq!(hw.writes, vec![(ActuatorId::InSecondary, true)]);

    send(&mut app, &mut hw, &mut nvs, &mut sink, "valves/in-secondary", "false").unwrap();
    assert!(!hw.output(ActuatorId::InSecondary));

    let err = send(&mut app, &mut hw, &mut nvs, &mut sink, "valves/in-secondary", "open").unwrap_err();
    assert_eq!(err, Error::Command(CommandError::MalformedPayload));
    assert_eq!(hw.writes.len(), 2);
}

#[test]
fn idle_command_stops_running_action() {
    let flow = FlowCounter::new();
    let (mut hw, mut nvs, mut sink) = (MockHardware::new(), MockNvs::new(), CollectingSink::new());
    let mut app = AppService::new(PodConfig::default(), &flow);

    send(
        &mut app,
        &mut hw,
        &mut nvs,
        &mut sink,
        "actions/drain",
        r#"{"maxMl":10,"maxSeconds":10}"#,
    )
    .unwrap();
    let err = send(&mut app, &mut hw, &mut nvs, &mut sink, "actions/idle", "please").unwrap_err();
    assert_eq!(err, Error::Command(CommandError::ResetRejected));
    assert_eq!(app.action(), ActionKind::Drain);

    send(&mut app, &mut hw, &mut nvs, &mut sink, "actions/idle", "true").unwrap();
    assert_eq!(app.action(), ActionKind::Idle);
    assert!(hw.outputs().is_all_off());
}
