use glam::DVec3;
use mesh_scene::attribute::AttributeCollection;
use proptest::prelude::*;

proptest! {
    /// Any sequence of resizes keeps every column in lock-step with the
    /// collection's element count.
    #[test]
    fn resize_keeps_lock_step(sizes in proptest::collection::vec(0usize..64, 1..12)) {
        let mut c = AttributeCollection::with_size(4);
        c.create("scalar", 1.5f64).unwrap();
        c.create("vector", DVec3::ONE).unwrap();
        c.create("label", 0i32).unwrap();

        for n in sizes {
            c.resize(n).unwrap();
            prop_assert_eq!(c.size(), n);
            for name in ["scalar", "vector", "label"] {
                let slot = c.find(name).unwrap();
                prop_assert_eq!(slot.len(), n);
                prop_assert_eq!(slot.view().len().unwrap(), n);
            }
        }
    }

    /// Grown rows always take the creation default, whatever the resize
    /// history was.
    #[test]
    fn grown_rows_take_defaults(before in 0usize..16, after in 0usize..32) {
        let mut c = AttributeCollection::with_size(before);
        c.create("d", 2.25f64).unwrap();
        c.resize(after).unwrap();
        let values = c.find("d").unwrap().view().to_vec::<f64>().unwrap();
        prop_assert_eq!(values.len(), after);
        prop_assert!(values.iter().all(|&v| v == 2.25));
    }

    /// find() mirrors the create/destroy history exactly.
    #[test]
    fn find_tracks_lifecycle(names in proptest::collection::vec("[a-z]{1,6}", 1..8)) {
        use std::collections::HashSet;

        let mut c = AttributeCollection::with_size(3);
        let mut live: HashSet<String> = HashSet::new();
        for name in &names {
            let fresh = live.insert(name.clone());
            let created = c.create(name.as_str(), 0i64).is_ok();
            // Only the first create for a name succeeds.
            prop_assert_eq!(created, fresh);
            prop_assert!(c.find(name).is_some());
        }
        for name in &live {
            c.destroy(name).unwrap();
            prop_assert!(c.find(name).is_none());
        }
        prop_assert_eq!(c.attribute_count(), 0);
    }
}
