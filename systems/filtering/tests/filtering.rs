use proptest::prelude::*;
use seadog_core::{
    ActivityFilter, ActivityState, Category, CategoryFilter, Entity, EntityId, FilterSelection,
    Position,
};
use seadog_system_filtering::apply;
use seadog_world::{query, World};

fn category_strategy() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::GreatWhite),
        Just(Category::Hammerhead),
        Just(Category::Tiger),
        Just(Category::Bull),
    ]
}

fn activity_strategy() -> impl Strategy<Value = ActivityState> {
    prop_oneof![Just(ActivityState::Active), Just(ActivityState::Inactive)]
}

fn selection_strategy() -> impl Strategy<Value = FilterSelection> {
    let category = prop_oneof![
        Just(CategoryFilter::All),
        category_strategy().prop_map(CategoryFilter::Only),
    ];
    let activity = prop_oneof![
        Just(ActivityFilter::All),
        activity_strategy().prop_map(ActivityFilter::Only),
    ];
    (category, activity).prop_map(|(category, activity)| FilterSelection::new(category, activity))
}

fn entities_strategy() -> impl Strategy<Value = Vec<Entity>> {
    prop::collection::vec(
        (
            category_strategy(),
            activity_strategy(),
            0u32..200,
            -90.0f64..90.0,
            -180.0f64..180.0,
        ),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (category, activity, depth, latitude, longitude))| Entity {
                id: EntityId::new(index as u32),
                name: format!("entity-{index}"),
                category,
                position: Position::new(latitude, longitude),
                activity,
                depth,
                last_contact: "just now".to_owned(),
            })
            .collect()
    })
}

fn expected_inclusion(entity: &Entity, selection: FilterSelection) -> bool {
    let category_ok = match selection.category {
        CategoryFilter::All => true,
        CategoryFilter::Only(category) => entity.category == category,
    };
    let activity_ok = match selection.activity {
        ActivityFilter::All => true,
        ActivityFilter::Only(activity) => entity.activity == activity,
    };
    category_ok && activity_ok
}

proptest! {
    #[test]
    fn apply_matches_conjunctive_rule_exactly(
        entities in entities_strategy(),
        selection in selection_strategy(),
    ) {
        let view = apply(&entities, selection);
        let expected: Vec<EntityId> = entities
            .iter()
            .filter(|entity| expected_inclusion(entity, selection))
            .map(|entity| entity.id)
            .collect();
        let actual: Vec<EntityId> = view.ids().collect();

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(view.selection(), selection);
    }

    #[test]
    fn apply_is_a_subset_in_store_order(
        entities in entities_strategy(),
        selection in selection_strategy(),
    ) {
        let view = apply(&entities, selection);
        let mut cursor = entities.iter();
        for entity in view.iter() {
            prop_assert!(cursor.any(|candidate| candidate == entity));
        }
    }

    #[test]
    fn apply_is_repeatable(
        entities in entities_strategy(),
        selection in selection_strategy(),
    ) {
        prop_assert_eq!(apply(&entities, selection), apply(&entities, selection));
    }
}

#[test]
fn seed_list_splits_by_category_and_activity() {
    let world = World::new();
    let entities = query::entities(&world);

    let everything = apply(entities, FilterSelection::default());
    assert_eq!(everything.len(), 12);

    let great_whites = apply(
        entities,
        FilterSelection::new(CategoryFilter::Only(Category::GreatWhite), ActivityFilter::All),
    );
    let names: Vec<&str> = great_whites.iter().map(|entity| entity.name.as_str()).collect();
    assert_eq!(names, ["Bruce", "Jaws", "Megalodon Jr", "Deep Blue"]);

    let quiet_hammerheads = apply(
        entities,
        FilterSelection::new(
            CategoryFilter::Only(Category::Hammerhead),
            ActivityFilter::Only(ActivityState::Inactive),
        ),
    );
    let ids: Vec<u32> = quiet_hammerheads.ids().map(|id| id.get()).collect();
    assert_eq!(ids, [11]);

    let quiet_great_whites = apply(
        entities,
        FilterSelection::new(
            CategoryFilter::Only(Category::GreatWhite),
            ActivityFilter::Only(ActivityState::Inactive),
        ),
    );
    assert!(quiet_great_whites.is_empty());
}
