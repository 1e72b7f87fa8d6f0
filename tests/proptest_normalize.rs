//! Property-based tests using proptest
//!
//! These tests verify the normalization invariants over randomized
//! describe responses: one record per identifier, a fixed key shape
//! regardless of which optional data is present, and stable JSON text.

use awsrecon::resource::normalize_items;
use awsrecon::{AccountContext, ResourceCollection, ResourceKind};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Generate arbitrary raw instance items with optional fields randomly absent
fn arb_instance() -> impl Strategy<Value = Value> {
    (
        "i-[0-9a-f]{4}",
        prop_oneof![
            Just("pending"),
            Just("running"),
            Just("stopping"),
            Just("stopped"),
            Just("shutting-down"),
            Just("terminated"),
        ],
        proptest::option::of("10\\.0\\.[0-9]{1,3}\\.[0-9]{1,3}"),
        proptest::option::of("arn:aws:iam::[0-9]{12}:instance-profile/[a-z]{3,8}"),
        prop::collection::vec("10\\.1\\.[0-9]{1,3}\\.[0-9]{1,3}", 0..4),
        prop::collection::vec(("[A-Za-z]{1,8}", "[a-z0-9 ]{0,8}"), 0..4),
    )
        .prop_map(|(id, state, public_ip, role, secondary, tags)| {
            let mut item = json!({
                "InstanceId": id,
                "State": {"Name": state},
                "ImageId": "ami-0abcdef1234567890",
                "InstanceType": "t3.micro",
            });
            let obj = item.as_object_mut().unwrap();
            if let Some(ip) = public_ip {
                obj.insert("PublicIpAddress".into(), json!(ip));
            }
            if let Some(arn) = role {
                obj.insert("IamInstanceProfile".into(), json!({ "Arn": arn }));
            }
            if !secondary.is_empty() {
                obj.insert("SecondaryPrivateIpAddresses".into(), json!(secondary));
            }
            if !tags.is_empty() {
                let tags: Vec<Value> = tags
                    .into_iter()
                    .map(|(k, v)| json!({"Key": k, "Value": v}))
                    .collect();
                obj.insert("Tags".into(), Value::Array(tags));
            }
            item
        })
}

fn arb_instance_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_instance(), 0..40)
}

fn normalize(items: &[Value]) -> ResourceCollection {
    let def = ResourceKind::Instances.definition().unwrap();
    normalize_items(def, &AccountContext::new("sys", "us-east-1"), items).unwrap()
}

proptest! {
    /// Exactly one record per distinct instance identifier
    #[test]
    fn one_record_per_unique_id(items in arb_instance_list()) {
        let unique: HashSet<&str> = items
            .iter()
            .map(|i| i["InstanceId"].as_str().unwrap())
            .collect();

        let collection = normalize(&items);

        prop_assert_eq!(collection.len(), unique.len());
        for id in collection.ids() {
            prop_assert!(unique.contains(id));
        }
    }

    /// Every record has the same keys whatever optional data was present
    #[test]
    fn key_shape_is_uniform(items in arb_instance_list()) {
        let collection = normalize(&items);
        let mut shapes = collection
            .iter()
            .map(|(_, record)| record.keys().cloned().collect::<Vec<_>>());

        if let Some(first) = shapes.next() {
            prop_assert!(first.contains(&"Tags".to_string()));
            prop_assert!(first.contains(&"Available Private IPs".to_string()));
            for shape in shapes {
                prop_assert_eq!(&shape, &first);
            }
        }
    }

    /// serialize(parse(serialize(x))) == serialize(x)
    #[test]
    fn json_round_trip_is_stable(items in arb_instance_list()) {
        let collection = normalize(&items);
        let text = collection.to_json().unwrap();
        let reparsed = ResourceCollection::from_json(&text).unwrap();

        prop_assert_eq!(&reparsed, &collection);
        prop_assert_eq!(reparsed.to_json().unwrap(), text);
    }

    /// Normalizing the same response twice gives identical output
    #[test]
    fn normalization_is_deterministic(items in arb_instance_list()) {
        prop_assert_eq!(
            normalize(&items).to_json().unwrap(),
            normalize(&items).to_json().unwrap()
        );
    }
}
