//! Property tests for command-line assembly

use ntask_builder::*;
use proptest::prelude::*;
use std::path::Path;

fn property_map() -> impl Strategy<Value = IntegrationProperties> {
    prop::collection::hash_map(
        "[A-Za-z][A-Za-z0-9_]{0,11}",
        prop::option::of("[A-Za-z0-9 ./_-]{0,16}".prop_map(PropertyValue::Text)),
        0..8,
    )
}

proptest! {
    #[test]
    fn arguments_are_deterministic(props in property_map()) {
        let config = TaskConfig::default().with_targets(["build"]);
        let first = build_arguments(&config, Path::new("/artifacts"), &props);
        // Rebuilding the map changes its iteration order
        let rebuilt: IntegrationProperties = props.clone().into_iter().collect();
        let second = build_arguments(&config, Path::new("/artifacts"), &rebuilt);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn property_definitions_are_sorted_and_nulls_skipped(props in property_map()) {
        let args = build_arguments(&TaskConfig::default(), Path::new("/a"), &props);
        let positions: Vec<(usize, &String)> = {
            let mut defined: Vec<&String> = props
                .iter()
                .filter(|(_, v)| v.is_some())
                .map(|(k, _)| k)
                .collect();
            defined.sort();
            defined
                .into_iter()
                .map(|name| {
                    let needle = format!(" -D:{name}=");
                    (args.find(&needle).expect("defined property missing"), name)
                })
                .collect()
        };
        prop_assert!(positions.windows(2).all(|w| w[0].0 < w[1].0));

        for (name, value) in &props {
            if value.is_none() {
                let needle = format!(" -D:{name}=");
                prop_assert!(!args.contains(&needle));
            }
        }
    }

    #[test]
    fn targets_always_come_last(targets in prop::collection::vec("[a-z][a-z0-9-]{0,8}", 1..5)) {
        let config = TaskConfig::default().with_targets(targets.clone());
        let args = build_arguments(&config, Path::new("/a"), &IntegrationProperties::new());
        let expected_tail = format!(" {}", targets.join(" "));
        prop_assert!(args.ends_with(&expected_tail));
    }
}
