use std::time::Duration;

use seadog_core::{
    ActivityFilter, ActivityState, Category, CategoryFilter, Command, Entity, EntityId, Event,
    FilterSelection, Position, StatsReport, SyncOutcome,
};
use seadog_rendering::HeadlessMap;
use seadog_system_session::{Session, SessionConfig};
use seadog_world::{query, World};

const WINDOW: Duration = Duration::from_millis(100);
const TICK: Duration = Duration::from_secs(5);

fn shark(id: u32, category: Category, activity: ActivityState, depth: u32) -> Entity {
    Entity {
        id: EntityId::new(id),
        name: format!("shark-{id}"),
        category,
        position: Position::new(30.0 + f64::from(id), -120.0),
        activity,
        depth,
        last_contact: "1 min ago".to_owned(),
    }
}

/// A(X, active), B(X, inactive), C(Y, active).
fn trio() -> World {
    World::from_entities(vec![
        shark(1, Category::GreatWhite, ActivityState::Active, 40),
        shark(2, Category::GreatWhite, ActivityState::Inactive, 60),
        shark(3, Category::Tiger, ActivityState::Active, 20),
    ])
    .expect("unique ids")
}

fn synced(events: &[Event]) -> Vec<(FilterSelection, StatsReport, SyncOutcome)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ViewSynced {
                selection,
                stats,
                outcome,
            } => Some((*selection, *stats, *outcome)),
            _ => None,
        })
        .collect()
}

fn listed(session: &Session<HeadlessMap>) -> Vec<u32> {
    session.views().list().iter().map(|entry| entry.id.get()).collect()
}

fn drawn(session: &Session<HeadlessMap>) -> Vec<u32> {
    session.widget().markers().keys().map(|id| id.get()).collect()
}

#[test]
fn start_renders_everything() {
    let mut session =
        Session::new(&SessionConfig::default(), HeadlessMap::new()).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);

    let syncs = synced(&events);
    assert_eq!(syncs.len(), 1);
    let (selection, stats, outcome) = syncs[0];
    assert_eq!(selection, FilterSelection::default());
    assert_eq!(outcome, SyncOutcome::Rendered);
    assert_eq!(stats.count, 12);
    assert_eq!(stats.active_count, 9);
    assert_eq!(stats.recent_pings, 27);
    assert_eq!(stats.average_depth, Some(50));
    assert_eq!(drawn(&session).len(), 12);
}

#[test]
fn category_then_activity_selection_narrows_the_view() {
    let mut session = Session::with_world(&SessionConfig::default(), trio(), HeadlessMap::new())
        .expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    events.clear();

    session.submit(
        Command::SelectCategory {
            filter: CategoryFilter::Only(Category::GreatWhite),
        },
        &mut events,
    );
    session.advance(WINDOW, &mut events);

    let syncs = synced(&events);
    assert_eq!(syncs.len(), 1);
    assert_eq!(syncs[0].1.count, 2);
    assert_eq!(syncs[0].1.active_count, 1);
    assert_eq!(listed(&session), [1, 2]);
    assert_eq!(drawn(&session), [1, 2]);
    events.clear();

    session.submit(
        Command::SelectActivity {
            filter: ActivityFilter::Only(ActivityState::Active),
        },
        &mut events,
    );
    session.advance(WINDOW, &mut events);

    let syncs = synced(&events);
    assert_eq!(syncs.len(), 1);
    assert_eq!(
        syncs[0].1,
        StatsReport {
            count: 1,
            active_count: 1,
            recent_pings: 3,
            average_depth: Some(40),
        }
    );
    assert_eq!(
        session.applied_selection(),
        FilterSelection::new(
            CategoryFilter::Only(Category::GreatWhite),
            ActivityFilter::Only(ActivityState::Active),
        )
    );
    assert_eq!(listed(&session), [1]);
    assert_eq!(drawn(&session), [1]);
}

#[test]
fn burst_of_selections_produces_one_sync_with_final_state() {
    let mut session = Session::with_world(&SessionConfig::default(), trio(), HeadlessMap::new())
        .expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    events.clear();

    for filter in [
        CategoryFilter::Only(Category::Tiger),
        CategoryFilter::All,
        CategoryFilter::Only(Category::Bull),
    ] {
        session.submit(Command::SelectCategory { filter }, &mut events);
        session.advance(Duration::from_millis(30), &mut events);
    }
    assert!(synced(&events).is_empty(), "window still open");

    session.advance(Duration::from_millis(200), &mut events);
    let syncs = synced(&events);
    assert_eq!(syncs.len(), 1);
    assert_eq!(syncs[0].0.category, CategoryFilter::Only(Category::Bull));
    assert_eq!(syncs[0].1.count, 0);
    assert_eq!(syncs[0].1.average_depth, None);
    assert!(drawn(&session).is_empty());
}

#[test]
fn tick_moving_a_filtered_out_entity_touches_no_marker() {
    let config = SessionConfig {
        move_probability: 1.0,
        ..SessionConfig::default()
    };
    let mut session =
        Session::with_world(&config, trio(), HeadlessMap::new()).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    session.submit(
        Command::SelectCategory {
            filter: CategoryFilter::Only(Category::Tiger),
        },
        &mut events,
    );
    session.advance(WINDOW, &mut events);
    let calls = session.widget().calls();
    let stats = session.views().stats();
    events.clear();

    session.advance(TICK, &mut events);

    let moved: Vec<EntityId> = events
        .iter()
        .find_map(|event| match event {
            Event::EntitiesMoved { entities } => Some(entities.clone()),
            _ => None,
        })
        .expect("tick fired");
    assert_eq!(moved, [EntityId::new(1), EntityId::new(3)]);

    assert_eq!(drawn(&session), [3]);
    assert_eq!(session.widget().calls().markers_drawn, calls.markers_drawn + 1);
    assert_eq!(session.widget().calls().markers_removed, calls.markers_removed);
    assert_eq!(session.views().stats(), stats);

    let tiger = query::entity(session.world(), EntityId::new(3)).expect("entity");
    assert_eq!(session.widget().markers()[&EntityId::new(3)].position, tiger.position);
}

#[test]
fn ticks_fire_on_the_configured_interval() {
    let mut session =
        Session::new(&SessionConfig::default(), HeadlessMap::new()).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);

    session.advance(Duration::from_millis(4_999), &mut events);
    assert_eq!(query::tick_index(session.world()), 0);

    session.advance(Duration::from_millis(1), &mut events);
    assert_eq!(query::tick_index(session.world()), 1);

    session.advance(Duration::from_secs(12), &mut events);
    assert_eq!(query::tick_index(session.world()), 3);
    assert_eq!(session.now(), Duration::from_secs(17));
}

#[test]
fn filter_deadline_runs_before_a_coinciding_tick() {
    let mut session = Session::with_world(&SessionConfig::default(), trio(), HeadlessMap::new())
        .expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    session.advance(Duration::from_millis(4_900), &mut events);
    events.clear();

    session.submit(
        Command::SelectActivity {
            filter: ActivityFilter::Only(ActivityState::Inactive),
        },
        &mut events,
    );
    session.advance(Duration::from_millis(100), &mut events);

    let order: Vec<&'static str> = events
        .iter()
        .filter_map(|event| match event {
            Event::ViewSynced { .. } => Some("sync"),
            Event::EntitiesMoved { .. } => Some("tick"),
            _ => None,
        })
        .collect();
    assert_eq!(order, ["sync", "tick"]);
}

#[test]
fn flush_syncs_without_waiting() {
    let mut session = Session::with_world(&SessionConfig::default(), trio(), HeadlessMap::new())
        .expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    events.clear();

    session.select_category(CategoryFilter::Only(Category::Tiger));
    session.flush(&mut events);
    assert_eq!(synced(&events).len(), 1);
    assert_eq!(listed(&session), [3]);

    session.flush(&mut events);
    assert_eq!(synced(&events).len(), 1, "nothing left to flush");
}

#[test]
fn list_selection_focuses_or_rejects() {
    let mut session = Session::with_world(&SessionConfig::default(), trio(), HeadlessMap::new())
        .expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    session.submit(
        Command::SelectCategory {
            filter: CategoryFilter::Only(Category::Tiger),
        },
        &mut events,
    );
    session.flush(&mut events);
    events.clear();

    session.submit(
        Command::SelectEntry {
            entity: EntityId::new(3),
        },
        &mut events,
    );
    session.submit(
        Command::SelectEntry {
            entity: EntityId::new(1),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::EntryFocused {
                entity: EntityId::new(3),
                callout_opened: true,
            },
            Event::EntryRejected {
                entity: EntityId::new(1),
            },
        ]
    );
    assert_eq!(session.widget().callout_target(), Some(EntityId::new(3)));
    assert_eq!(session.widget().viewport().zoom, seadog_core::FOCUS_ZOOM);
    assert_eq!(
        session.select_entry(EntityId::new(2)),
        Event::EntryRejected {
            entity: EntityId::new(2),
        }
    );
}

#[test]
fn rendering_failure_degrades_and_recovers() {
    let mut map = HeadlessMap::new();
    map.reject_styled_markers(true);
    let mut session =
        Session::with_world(&SessionConfig::default(), trio(), map).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    assert_eq!(synced(&events)[0].2, SyncOutcome::Degraded);
    assert_eq!(drawn(&session), [1, 2, 3]);

    session.widget_mut().reject_styled_markers(false);
    session.submit(
        Command::SelectCategory {
            filter: CategoryFilter::Only(Category::Tiger),
        },
        &mut events,
    );
    session.flush(&mut events);
    assert_eq!(synced(&events)[1].2, SyncOutcome::Rendered);
    assert_eq!(drawn(&session), [3]);
}

#[test]
fn identical_configuration_replays_identically() {
    let run = || {
        let mut session =
            Session::new(&SessionConfig::default(), HeadlessMap::new()).expect("valid config");
        let mut events = Vec::new();
        session.start(&mut events);
        session.submit(
            Command::SelectActivity {
                filter: ActivityFilter::Only(ActivityState::Active),
            },
            &mut events,
        );
        for _ in 0..20 {
            session.advance(Duration::from_millis(2_500), &mut events);
        }
        let positions: Vec<(EntityId, Position)> = session
            .widget()
            .markers()
            .iter()
            .map(|(id, marker)| (*id, marker.position))
            .collect();
        (events, positions)
    };

    assert_eq!(run(), run());
}
