//! Property tests over the namespace surface.

use nskv_core::{Object, Prefix, SetRemoval, Store};
use nskv_testkit::prelude::*;
use proptest::prelude::*;

fn memory_store() -> Store {
    let store = Store::new();
    store.initialize_in_memory().unwrap();
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stored_values_read_back(
        suffix in string_suffix_strategy(),
        number in any::<i64>(),
        text in ".{0,64}",
        record in record_strategy(),
    ) {
        let store = memory_store();
        let ns = store.namespace(1).unwrap();

        ns.put(suffix.as_str(), &number).unwrap();
        prop_assert_eq!(ns.get::<i64, _>(suffix.as_str()).unwrap(), Some(number));

        ns.put(suffix.as_str(), text.as_str()).unwrap();
        prop_assert_eq!(ns.get::<String, _>(suffix.as_str()).unwrap(), Some(text));

        let object = Object(record);
        ns.put(suffix.as_str(), &object).unwrap();
        prop_assert_eq!(ns.get::<Object<TestRecord>, _>(suffix.as_str()).unwrap(), Some(object));
    }

    #[test]
    fn same_suffix_under_distinct_prefixes_never_collides(
        (a, b) in distinct_prefixes_strategy(),
        suffix in string_suffix_strategy(),
    ) {
        let store = memory_store();
        let left = store.namespace_with_prefix(a).unwrap();
        let right = store.namespace_with_prefix(b).unwrap();

        prop_assert_ne!(left.generate_key(suffix.as_str()), right.generate_key(suffix.as_str()));

        left.put(suffix.as_str(), &1i32).unwrap();
        prop_assert_eq!(right.get::<i32, _>(suffix.as_str()).unwrap(), None);
    }

    #[test]
    fn prefix_can_only_be_claimed_once(prefix in prefix_strategy()) {
        let store = memory_store();
        let _first = store.namespace_with_prefix(prefix).unwrap();
        prop_assert!(store.namespace_with_prefix(prefix).is_err());
    }

    #[test]
    fn named_prefixes_are_stable(name in namespace_name_strategy()) {
        prop_assert_eq!(Prefix::from_name(&name), Prefix::from_name(&name));
    }

    #[test]
    fn set_matches_first_occurrence_order(additions in set_additions_strategy()) {
        let store = memory_store();
        let ns = store.namespace(1).unwrap();

        let mut expected = Vec::new();
        for value in &additions {
            let added = ns.add_to_set("s", *value).unwrap();
            prop_assert_eq!(added, !expected.contains(value));
            if added {
                expected.push(*value);
            }
        }
        prop_assert_eq!(ns.get_set("s").unwrap(), expected);
    }

    #[test]
    fn removal_drops_exactly_one_element(
        elements in distinct_elements_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!elements.is_empty());
        let store = memory_store();
        let ns = store.namespace(1).unwrap();
        for value in &elements {
            ns.add_to_set(9i64, *value).unwrap();
        }

        let victim = elements[pick.index(elements.len())];
        prop_assert_eq!(ns.remove_from_set(9i64, victim).unwrap(), SetRemoval::Removed);

        let expected: Vec<i64> = elements.iter().copied().filter(|v| *v != victim).collect();
        prop_assert_eq!(ns.get_set(9i64).unwrap(), expected);
        prop_assert!(!ns.contains_element(9i64, victim).unwrap());
    }
}
