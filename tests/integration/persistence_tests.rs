//! Flow/weight slots and config blob against the simulated NVS backend.

use crate::mock_hw::{CollectingSink, MockHardware};

use podctl::adapters::nvs::NvsAdapter;
use podctl::app::events::AppEvent;
use podctl::app::persistence::{self, FLOW_ERASED_SENTINEL, FLOW_KEY, NAMESPACE, WEIGHT_KEY};
use podctl::app::ports::{ConfigError, ConfigPort, StoragePort};
use podctl::app::service::AppService;
use podctl::config::PodConfig;
use podctl::sensors::flow::FlowCounter;

#[test]
fn slots_survive_a_simulated_reboot() {
    let mut nvs = NvsAdapter::new().unwrap();
    persistence::save_flow_counter(&mut nvs, -4_321).unwrap();
    persistence::save_weight(&mut nvs, 512.25).unwrap();

    let flow = FlowCounter::new();
    let mut sink = CollectingSink::new();
    let mut app = AppService::new(PodConfig::default(), &flow);
    app.boot(&nvs, &mut sink);

    assert_eq!(flow.load(), -4_321);
    assert!((app.weight_g() - 512.25).abs() < 1e-3);
    match &sink.events[0] {
        AppEvent::Booted { flow_pulses, weight_g } => {
            assert_eq!(*flow_pulses, -4_321);
            assert!((weight_g - 512.25).abs() < 1e-3);
        }
        other => panic!("expected Booted, got {other:?}"),
    }
}

#[test]
fn empty_storage_keeps_defaults() {
    let nvs = NvsAdapter::new().unwrap();
    assert_eq!(persistence::load_flow_counter(&nvs), None);
    assert_eq!(persistence::load_weight(&nvs), 0.0);

    let flow = FlowCounter::new();
    flow.restore(12);
    let mut app = AppService::new(PodConfig::default(), &flow);
    app.boot(&nvs, &mut CollectingSink::new());
    assert_eq!(flow.load(), 12);
}

#[test]
fn erased_sentinel_is_treated_as_absent() {
    let mut nvs = NvsAdapter::new().unwrap();
    persistence::save_flow_counter(&mut nvs, FLOW_ERASED_SENTINEL).unwrap();
    assert_eq!(persistence::load_flow_counter(&nvs), None);
}

#[test]
fn non_finite_weight_loads_as_zero() {
    let mut nvs = NvsAdapter::new().unwrap();
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        persistence::save_weight(&mut nvs, bad).unwrap();
        assert_eq!(persistence::load_weight(&nvs), 0.0);
    }
}

#[test]
fn undecodable_slots_fall_back() {
    let mut nvs = NvsAdapter::new().unwrap();
    // A lone continuation byte is an unterminated varint.
    nvs.write(NAMESPACE, FLOW_KEY, &[0x80]).unwrap();
    nvs.write(NAMESPACE, WEIGHT_KEY, &[0x01]).unwrap();
    assert_eq!(persistence::load_flow_counter(&nvs), None);
    assert_eq!(persistence::load_weight(&nvs), 0.0);
}

#[test]
fn periodic_persist_lands_in_nvs() {
    let flow = FlowCounter::new();
    let mut nvs = NvsAdapter::new().unwrap();
    let mut hw = MockHardware::new();
    let mut sink = CollectingSink::new();
    let config = PodConfig::default();
    let persist_ms = config.persist_interval_ms();
    let mut app = AppService::new(config, &flow);
    app.boot(&nvs, &mut sink);

    hw.weight_samples.push_back(42.0);
    flow.restore(900);
    app.tick(0, &mut hw, &mut nvs, &mut sink);
    app.tick(persist_ms, &mut hw, &mut nvs, &mut sink);

    assert_eq!(persistence::load_flow_counter(&nvs), Some(900));
    assert!((persistence::load_weight(&nvs) - 42.0).abs() < 1e-3);
}

#[test]
fn config_blob_rejects_invalid_values() {
    let nvs = NvsAdapter::new().unwrap();
    let bad = PodConfig {
        pulses_per_ml: 0,
        ..Default::default()
    };
    assert!(matches!(nvs.save(&bad), Err(ConfigError::ValidationFailed(_))));
    assert_eq!(nvs.load().unwrap(), PodConfig::default());
}

#[test]
fn corrupted_config_blob_is_reported() {
    let mut nvs = NvsAdapter::new().unwrap();
    nvs.write("podcfg", "config", &[0xFF, 0xFF]).unwrap();
    assert!(matches!(nvs.load(), Err(ConfigError::Corrupted)));
}

#[test]
fn delete_removes_slot() {
    let mut nvs = NvsAdapter::new().unwrap();
    persistence::save_flow_counter(&mut nvs, 7).unwrap();
    assert!(nvs.exists(NAMESPACE, FLOW_KEY));
    nvs.delete(NAMESPACE, FLOW_KEY).unwrap();
    assert!(!nvs.exists(NAMESPACE, FLOW_KEY));
    assert_eq!(persistence::load_flow_counter(&nvs), None);
}
