mod common;

use common::strategies::*;
use common::{dict, thermometer_metadata, thermometer_type, Platform, THERMOMETER};
use lifecycle_core::handlers::{ConfigurationHandler, ProvidedServiceHandler};
use lifecycle_core::state_machine::ComponentState;
use lifecycle_core::value::Dictionary;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    /// Property: a service is registered iff the last transition was to VALID
    /// and the component has not been stopped since
    #[test]
    fn registration_tracks_validity(ops in lifecycle_ops_strategy()) {
        let platform = Platform::new();
        let (component_type, _) = thermometer_type();
        let manager =
            platform.instantiate(thermometer_metadata(), component_type, &Dictionary::new());

        let mut expected = false;
        for op in ops {
            match op {
                LifecycleOp::Start => manager.start(),
                LifecycleOp::Stop => manager.stop(),
                LifecycleOp::BecomeValid => manager.set_state(ComponentState::Valid),
                LifecycleOp::BecomeInvalid => manager.set_state(ComponentState::Invalid),
            }
            expected = matches!(op, LifecycleOp::Start | LifecycleOp::BecomeValid);

            let registered = platform.registry.lookup("Sensor").len();
            prop_assert_eq!(registered, usize::from(expected), "after {:?}", op);
            prop_assert!(registered <= 1);
        }
        prop_assert_eq!(manager.state().is_valid(), expected);
    }

    /// Property: no propagated key survives two consecutive updates
    #[test]
    fn propagation_replaces_previous_entries(
        first in unknown_entries_strategy(),
        second in unknown_entries_strategy(),
    ) {
        let platform = Platform::new();
        let (component_type, _) = thermometer_type();
        let manager =
            platform.instantiate(thermometer_metadata(), component_type, &Dictionary::new());
        manager.start();

        let configuration = manager.handler::<ConfigurationHandler>().unwrap();
        platform.host.push(THERMOMETER, Some(first.clone()));
        platform.host.push(THERMOMETER, Some(second.clone()));

        let visible = platform.registry.lookup("Sensor")[0].properties.clone();
        for (key, value) in &second {
            prop_assert_eq!(visible.get(key), Some(value));
        }
        for key in first.keys().filter(|k| !second.contains_key(*k)) {
            prop_assert!(!visible.contains_key(key), "stale key {}", key);
        }
        prop_assert_eq!(&visible["unit"], &json!("celsius"));
        prop_assert_eq!(visible.len(), second.len() + 1);

        let services = manager.handler::<ProvidedServiceHandler>().unwrap().provided_services();
        prop_assert_eq!(services[0].service_properties(), visible);
        prop_assert_eq!(configuration.propagated(), second);
    }

    /// Property: writing the same value twice changes the property once
    #[test]
    fn redundant_writes_are_suppressed(level in level_strategy()) {
        let platform = Platform::new();
        let (component_type, _) = thermometer_type();
        let manager =
            platform.instantiate(thermometer_metadata(), component_type, &Dictionary::new());
        let configuration = manager.handler::<ConfigurationHandler>().unwrap();
        let property = configuration.properties()[0].clone();
        let before = property.modifications();

        manager.setter_callback("m_level", json!(level.clone()));
        manager.setter_callback("m_level", json!(level.clone()));

        let expected = if level == "1" { before } else { before + 1 };
        prop_assert_eq!(property.modifications(), expected);
        prop_assert_eq!(manager.get_field("m_level"), Some(json!(level)));
    }

    /// Property: pushed configuration keeps the field in sync
    #[test]
    fn pushed_level_reaches_field(level in level_strategy()) {
        let platform = Platform::new();
        let (component_type, _) = thermometer_type();
        let manager =
            platform.instantiate(thermometer_metadata(), component_type, &Dictionary::new());
        manager.start();

        platform.host.push(THERMOMETER, Some(dict(&[("level", json!(level.clone()))])));
        prop_assert_eq!(manager.get_field("m_level"), Some(json!(level)));
    }
}
