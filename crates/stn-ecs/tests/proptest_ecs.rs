//! Property tests for entity composition, health bounds and deferred removal.
//!
//! Random operation sequences are applied and the invariants checked after
//! every step.

use proptest::prelude::*;
use stn_ecs::prelude::*;

// ---------------------------------------------------------------------------
// Extension add/remove
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum ExtOp {
    Add(usize),
    Remove(usize),
}

fn ext_op_strategy() -> impl Strategy<Value = ExtOp> {
    prop_oneof![
        (0..4usize).prop_map(ExtOp::Add),
        (0..4usize).prop_map(ExtOp::Remove),
    ]
}

const KINDS: [ExtensionKind; 4] = [
    ExtensionKind::Movable,
    ExtensionKind::Ignitable,
    ExtensionKind::Groupable,
    ExtensionKind::Destructible,
];

fn make(kind: ExtensionKind) -> Extension {
    match kind {
        ExtensionKind::Movable => Movable::new().into(),
        ExtensionKind::Ignitable => Ignitable::default().into(),
        ExtensionKind::Groupable => Groupable::new(Group::Enemy).into(),
        _ => Destructible::new(3).into(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn has_ext_matches_model(ops in prop::collection::vec(ext_op_strategy(), 0..40)) {
        let mut entity = Entity::new(EntityId::from_raw(1), EntityType::Zombie);
        let mut model = [false; 4];

        for op in &ops {
            match *op {
                ExtOp::Add(i) => {
                    let added = entity.add_extension(make(KINDS[i])).is_ok();
                    prop_assert_eq!(added, !model[i]);
                    model[i] = true;
                }
                ExtOp::Remove(i) => {
                    let removed = entity.remove_extension(KINDS[i]).is_some();
                    prop_assert_eq!(removed, model[i]);
                    model[i] = false;
                }
            }
            for (i, kind) in KINDS.iter().enumerate() {
                prop_assert_eq!(entity.has(*kind), model[i]);
            }
            prop_assert_eq!(entity.extension_kinds().len(), model.iter().filter(|m| **m).count());
            prop_assert_eq!(entity.serialize().extensions.len(), entity.extension_kinds().len());
        }
    }

    #[test]
    fn health_stays_within_bounds(
        max in 1u32..50,
        ops in prop::collection::vec((any::<bool>(), 0u32..20), 0..60),
    ) {
        let mut manager = EntityManager::new(EventLog::new(), 0);
        let deaths = std::rc::Rc::new(std::cell::Cell::new(0u32));
        let counter = deaths.clone();
        let id = manager.spawn(EntityType::Zombie, |e| {
            e.with(Destructible::new(max).on_death(move |_: &mut EntityManager, _| {
                counter.set(counter.get() + 1);
            }))
        });

        for (is_damage, amount) in ops {
            if is_damage {
                manager.damage(id, amount);
            } else {
                manager.heal(id, amount);
            }
            let d = manager.entity(id).unwrap().ext::<Destructible>().unwrap();
            prop_assert!(d.health() <= d.max_health());
            prop_assert_eq!(deaths.get(), u32::from(d.is_dead()));
        }
    }

    #[test]
    fn removal_only_lands_at_tick_boundary(
        count in 1usize..20,
        marks in prop::collection::vec(0usize..20, 0..30),
    ) {
        let mut manager = EntityManager::new(EventLog::new(), 0);
        let ids: Vec<EntityId> = (0..count)
            .map(|_| manager.spawn(EntityType::Wall, |e| e.with(Positionable::default())))
            .collect();

        let mut expected = std::collections::BTreeSet::new();
        for m in marks {
            let id = ids[m % count];
            manager.mark_entity_for_removal(id);
            expected.insert(id);
            prop_assert_eq!(manager.len(), count);
        }

        let report = manager.update(1.0 / 60.0);
        prop_assert_eq!(report.removed, expected.len());
        prop_assert_eq!(manager.len(), count - expected.len());
        for id in &ids {
            prop_assert_eq!(manager.entity(*id).is_none(), expected.contains(id));
        }
    }
}
