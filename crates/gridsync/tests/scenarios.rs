//! End-to-end scenarios for the engine: model reconciliation, gestures,
//! persistence hand-off, mode switches and teardown.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gridsync::{
    CellHeight, ContentKey, FloatPolicy, GestureError, GestureKind, GridConfig, GridEngine,
    GridError, GridEvent, GridHandle, GridItem, GridModel, GridRect, GridSurface,
    InteractionController, LayoutPersistence, LayoutSnapshot, LayoutValidationError, Margin, Mode,
    Orientation, PersistenceBridge, PersistenceError, Reconciler, SizeBounds, VirtualSurface,
};

// ============================================================================
// Helpers
// ============================================================================

fn engine(config: GridConfig) -> GridEngine<VirtualSurface> {
    let surface = VirtualSurface::new(&config);
    GridEngine::new(config, surface).expect("valid config")
}

type EventLog = Rc<RefCell<Vec<GridEvent>>>;

fn record(engine: &mut GridEngine<VirtualSurface>) -> EventLog {
    let log: EventLog = Rc::default();
    let sink = Rc::clone(&log);
    engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    log
}

fn layout_changes(log: &EventLog) -> Vec<Vec<GridItem>> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            GridEvent::LayoutChanged(items) => Some(items.clone()),
            _ => None,
        })
        .collect()
}

fn placements(items: &[GridItem]) -> Vec<(&str, u16, u16, u16, u16)> {
    items.iter().map(GridItem::placement).collect()
}

/// Persistence adapter that keeps every payload it is handed.
#[derive(Default)]
struct MemoryStore {
    saves: Rc<RefCell<Vec<Vec<GridItem>>>>,
    reject: bool,
}

impl LayoutPersistence for MemoryStore {
    fn save_layout(&mut self, items: &[GridItem]) -> Result<(), PersistenceError> {
        if self.reject {
            return Err(PersistenceError::new("backend unavailable"));
        }
        self.saves.borrow_mut().push(items.to_vec());
        Ok(())
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

#[test]
fn replacing_one_item_touches_only_that_item() {
    let mut e = engine(GridConfig::new(16));
    let w1 = GridItem::new("w1", 0, 0, 4, 2);
    let w2 = GridItem::new("w2", 4, 0, 4, 2);
    let w3 = GridItem::new("w3", 0, 0, 8, 2);

    e.reconcile(&[w1, w2.clone()]).unwrap();
    let report = e.reconcile(&[w2, w3]).unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(report.relayouts, 1);
    assert_eq!(
        placements(&e.snapshot()),
        vec![("w2", 4, 0, 4, 2), ("w3", 0, 0, 8, 2)]
    );
}

#[test]
fn reconciling_same_model_twice_is_a_noop() {
    let mut e = engine(GridConfig::for_orientation(Orientation::Portrait));
    let desired = vec![
        GridItem::new("clock", 0, 0, 3, 2),
        GridItem::new("weather", 3, 0, 6, 2),
        GridItem::new("news", 0, 2, 9, 4),
    ];
    e.reconcile(&desired).unwrap();
    let before = e.surface().relayout_count();

    let again = e.reconcile(&desired).unwrap();
    assert!(again.is_noop());
    assert_eq!(e.surface().relayout_count(), before);
}

#[test]
fn large_model_change_relayouts_once() {
    let mut e = engine(GridConfig::new(16));
    let first: Vec<GridItem> = (0..12)
        .map(|i| GridItem::new(format!("w{i}"), (i % 4) * 4, (i / 4) * 2, 4, 2))
        .collect();
    e.reconcile(&first).unwrap();

    // Drop a third, move a third, add four new ones.
    let mut next: Vec<GridItem> = first
        .iter()
        .filter(|item| !item.id.ends_with('0') && !item.id.ends_with('3'))
        .cloned()
        .collect();
    for item in next.iter_mut().take(4) {
        item.rect.y += 10;
    }
    next.extend((12..16).map(|i| GridItem::new(format!("w{i}"), (i % 4) * 4, 30, 4, 2)));

    let before = e.surface().relayout_count();
    let report = e.reconcile(&next).unwrap();
    assert!(report.added > 0 && report.updated > 0 && report.removed > 0);
    assert_eq!(report.relayouts, 1);
    assert_eq!(e.surface().relayout_count(), before + 1);
    assert_eq!(e.snapshot().len(), next.len());
}

#[test]
fn reconcile_never_emits_layout_changed() {
    let mut e = engine(GridConfig::new(16));
    let log = record(&mut e);
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2)]).unwrap();
    e.reconcile(&[GridItem::new("a", 4, 0, 2, 2)]).unwrap();
    e.reconcile(&[]).unwrap();
    assert!(layout_changes(&log).is_empty());
    assert!(log
        .borrow()
        .contains(&GridEvent::SurfaceItemAdded("a".into())));
}

#[test]
fn unbindable_item_is_retried_on_next_pass() {
    let config = GridConfig::new(9);
    let mut surface = VirtualSurface::new(&config).with_render_targets();
    let mut reconciler = Reconciler::new();
    let mut interactions = InteractionController::new();
    let desired = vec![GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 2, 0, 2, 2)];

    surface.mount_target("a");
    let first = reconciler.apply(&mut surface, &mut interactions, &desired);
    assert_eq!(first.skipped, vec!["b".to_owned()]);
    assert!(!reconciler.applied().contains_key("b"));

    surface.mount_target("b");
    let second = reconciler.apply(&mut surface, &mut interactions, &desired);
    assert_eq!(second.added, 1);
    assert_eq!(surface.len(), 2);
    assert_eq!(surface.batch_depth(), 0);
}

// ============================================================================
// Imperative handle
// ============================================================================

#[test]
fn added_item_reads_back_unchanged() {
    let mut e = engine(GridConfig::new(16));
    let item = GridItem::new("ticker", 2, 5, 6, 1)
        .with_content(ContentKey::new("ticker-widget"))
        .with_extension("speed", "slow");
    let rect = e.add_item(item.clone()).unwrap();

    assert_eq!(rect, item.rect);
    assert_eq!(e.snapshot(), vec![item]);
}

#[test]
fn imperative_add_pushes_neighbours_down() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&[GridItem::new("a", 0, 0, 3, 2)]).unwrap();
    let log = record(&mut e);

    let rect = e.add_item(GridItem::new("b", 1, 0, 3, 1)).unwrap();
    assert_eq!(rect, GridRect::new(1, 0, 3, 1));
    assert_eq!(
        placements(&e.snapshot()),
        vec![("a", 0, 1, 3, 2), ("b", 1, 0, 3, 1)]
    );
    assert_eq!(layout_changes(&log).len(), 1);
}

#[test]
fn imperative_calls_do_not_persist_on_static_canvas() {
    let mut e = engine(GridConfig::new(9).editable(false));
    let log = record(&mut e);
    e.add_item(GridItem::new("a", 0, 0, 2, 2)).unwrap();
    e.remove_item("a").unwrap();
    assert!(layout_changes(&log).is_empty());
    assert_eq!(
        e.remove_item("a"),
        Err(GridError::UnknownItem { id: "a".into() })
    );
}

#[test]
fn remove_all_empties_grid_in_one_relayout() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&[
        GridItem::new("a", 0, 0, 3, 1),
        GridItem::new("b", 3, 0, 3, 1),
        GridItem::new("c", 6, 0, 3, 1),
    ])
    .unwrap();
    let before = e.surface().relayout_count();

    assert_eq!(e.remove_all().unwrap(), 3);
    assert!(e.snapshot().is_empty());
    assert!(e.applied().is_empty());
    assert_eq!(e.surface().relayout_count(), before + 1);
}

#[test]
fn compact_closes_vertical_gaps() {
    let mut e = engine(GridConfig::new(4));
    e.reconcile(&[GridItem::new("a", 0, 3, 2, 2), GridItem::new("b", 2, 0, 2, 2)])
        .unwrap();
    let log = record(&mut e);

    let packed = e.compact().unwrap();
    assert_eq!(placements(&packed), vec![("a", 0, 0, 2, 2), ("b", 2, 0, 2, 2)]);
    assert_eq!(layout_changes(&log), vec![packed.clone()]);

    let again = e.compact().unwrap();
    assert_eq!(again, packed);
}

#[test]
fn compact_leaves_locked_items_in_place() {
    let mut e = engine(GridConfig::new(4));
    e.reconcile(&[
        GridItem::new("banner", 0, 1, 4, 1).locked(true),
        GridItem::new("a", 0, 4, 2, 2),
        GridItem::new("b", 2, 6, 2, 1),
    ])
    .unwrap();

    let packed = e.compact().unwrap();
    assert_eq!(
        placements(&packed),
        vec![("banner", 0, 1, 4, 1), ("a", 0, 2, 2, 2), ("b", 2, 0, 2, 1)]
    );
}

// ============================================================================
// Gestures and persistence
// ============================================================================

#[test]
fn drag_persists_full_layout_once() {
    let mut e = engine(GridConfig::new(4));
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 2, 0, 2, 2)])
        .unwrap();
    let store = MemoryStore::default();
    let saves = Rc::clone(&store.saves);
    let bridge = PersistenceBridge::new(store);
    e.subscribe(bridge.into_listener());

    e.begin_drag_at("b", &["title", "grid-item-content"]).unwrap();
    e.drag_to("b", 1, 0).unwrap();
    e.drag_to("b", 0, 0).unwrap();
    assert!(saves.borrow().is_empty());
    e.end_gesture("b").unwrap();

    let saves = saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(
        placements(&saves[0]),
        vec![("a", 0, 2, 2, 2), ("b", 0, 0, 2, 2)]
    );
}

#[test]
fn persistence_failure_keeps_visual_state() {
    let mut e = engine(GridConfig::new(4));
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2)]).unwrap();
    let bridge = Rc::new(RefCell::new(PersistenceBridge::new(MemoryStore {
        reject: true,
        ..MemoryStore::default()
    })));
    let listener = Rc::clone(&bridge);
    e.subscribe(move |event| listener.borrow_mut().handle(event));

    e.begin_gesture("a", GestureKind::Drag).unwrap();
    e.drag_to("a", 2, 1).unwrap();
    let committed = e.end_gesture("a").unwrap();

    assert_eq!(bridge.borrow().failed(), 1);
    assert_eq!(bridge.borrow().saved(), 0);
    assert_eq!(committed[0].rect, GridRect::new(2, 1, 2, 2));
    assert_eq!(e.snapshot(), committed);
}

#[test]
fn resize_respects_bounds_and_columns() {
    let mut e = engine(GridConfig::new(9));
    let bounds = SizeBounds {
        min_w: Some(2),
        max_w: Some(6),
        min_h: Some(1),
        max_h: Some(3),
    };
    e.reconcile(&[GridItem::new("a", 5, 0, 2, 2).with_bounds(bounds)])
        .unwrap();

    e.begin_gesture("a", GestureKind::Resize).unwrap();
    assert_eq!(e.resize_to("a", 1, 9).unwrap(), GridRect::new(5, 0, 2, 3));
    assert_eq!(e.resize_to("a", 8, 1).unwrap(), GridRect::new(3, 0, 6, 1));
    e.end_gesture("a").unwrap();
    assert_eq!(e.snapshot()[0].rect, GridRect::new(3, 0, 6, 1));
}

#[test]
fn model_writes_wait_for_gesture_to_settle() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2)]).unwrap();
    let log = record(&mut e);

    e.begin_gesture("a", GestureKind::Drag).unwrap();
    e.drag_to("a", 2, 0).unwrap();
    let report = e
        .reconcile(&[GridItem::new("a", 6, 0, 2, 2), GridItem::new("b", 0, 4, 2, 2)])
        .unwrap();
    assert_eq!(report.deferred, 1);
    assert_eq!(report.added, 1);
    assert_eq!(e.snapshot()[0].rect, GridRect::new(2, 0, 2, 2));
    assert_eq!(
        e.interaction_state("a"),
        gridsync::InteractionState::Interacting {
            kind: GestureKind::Drag,
            origin: GridRect::new(0, 0, 2, 2),
            sequence: 1,
        }
    );

    e.end_gesture("a").unwrap();
    let changes = layout_changes(&log);
    assert_eq!(changes.len(), 1);
    assert_eq!(
        placements(&changes[0]),
        vec![("a", 6, 0, 2, 2), ("b", 0, 4, 2, 2)]
    );
    assert!(e.reconcile(&[GridItem::new("a", 6, 0, 2, 2), GridItem::new("b", 0, 4, 2, 2)])
        .unwrap()
        .is_noop());
}

#[test]
fn commit_settles_model_writes_made_mid_gesture() {
    let mut e = engine(GridConfig::new(4));
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 2, 0, 2, 2)])
        .unwrap();
    let log = record(&mut e);

    e.begin_gesture("a", GestureKind::Drag).unwrap();
    e.drag_to("a", 0, 4).unwrap();
    // The console moves b onto the spot the pointer is holding.
    let report = e
        .reconcile(&[GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 0, 4, 2, 2)])
        .unwrap();
    assert_eq!(report.updated, 1);

    let committed = e.end_gesture("a").unwrap();
    assert_eq!(
        placements(&committed),
        vec![("a", 0, 4, 2, 2), ("b", 0, 6, 2, 2)]
    );
    assert_eq!(LayoutSnapshot::new(4, committed.clone()).validate(), Ok(()));
    assert_eq!(layout_changes(&log), vec![committed]);
}

#[test]
fn pushed_neighbours_are_tracked_on_static_canvas() {
    let mut e = engine(GridConfig::new(4).editable(false));
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2)]).unwrap();
    e.add_item(GridItem::new("b", 0, 0, 2, 2)).unwrap();
    assert_eq!(e.applied().get("a"), Some(&GridRect::new(0, 2, 2, 2)));

    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2), GridItem::new("c", 0, 2, 2, 2)])
        .unwrap();
    let snapshot = e.snapshot();
    assert_eq!(
        placements(&snapshot),
        vec![("a", 0, 0, 2, 2), ("c", 0, 2, 2, 2)]
    );
    assert_eq!(LayoutSnapshot::new(4, snapshot).validate(), Ok(()));
}

#[test]
fn cancelling_one_gesture_leaves_others_in_hand() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 4, 0, 2, 2)])
        .unwrap();
    e.begin_gesture("a", GestureKind::Drag).unwrap();
    e.begin_gesture("b", GestureKind::Drag).unwrap();
    e.drag_to("b", 6, 5).unwrap();

    e.cancel_gesture("a").unwrap();
    let b = e.snapshot()[1].clone();
    assert_eq!(b.rect, GridRect::new(6, 5, 2, 2));
    assert_eq!(e.applied().get("b"), Some(&GridRect::new(4, 0, 2, 2)));

    e.begin_gesture("a", GestureKind::Drag).unwrap();
    e.drag_to("a", 6, 4).unwrap();
    assert_eq!(
        placements(&e.snapshot()),
        vec![("a", 6, 7, 2, 2), ("b", 6, 5, 2, 2)]
    );
}

#[test]
fn cancel_keeps_layout_committed_by_another_gesture() {
    let mut e = engine(GridConfig::new(4));
    e.reconcile(&[
        GridItem::new("a", 0, 0, 2, 2),
        GridItem::new("b", 2, 0, 2, 2),
        GridItem::new("c", 0, 2, 2, 1),
    ])
    .unwrap();
    let log = record(&mut e);

    e.begin_gesture("a", GestureKind::Drag).unwrap();
    e.begin_gesture("b", GestureKind::Drag).unwrap();
    e.drag_to("a", 0, 1).unwrap();
    e.drag_to("b", 2, 4).unwrap();
    let committed = e.end_gesture("a").unwrap();
    assert_eq!(
        placements(&committed),
        vec![("a", 0, 1, 2, 2), ("b", 2, 4, 2, 2), ("c", 0, 3, 2, 1)]
    );

    e.cancel_gesture("b").unwrap();
    assert_eq!(
        placements(&e.snapshot()),
        vec![("a", 0, 1, 2, 2), ("b", 2, 0, 2, 2), ("c", 0, 3, 2, 1)]
    );
    assert_eq!(layout_changes(&log).len(), 1);
}

#[test]
fn mode_switch_unwinds_stacked_gestures() {
    let mut e = engine(GridConfig::new(4));
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2), GridItem::new("b", 2, 0, 2, 2)])
        .unwrap();
    let before = e.snapshot();

    e.begin_gesture("a", GestureKind::Drag).unwrap();
    e.drag_to("a", 2, 0).unwrap();
    e.begin_gesture("b", GestureKind::Drag).unwrap();
    e.drag_to("b", 0, 0).unwrap();
    assert_eq!(
        placements(&e.snapshot()),
        vec![("a", 2, 0, 2, 2), ("b", 0, 0, 2, 2)]
    );

    e.set_interactive(false).unwrap();
    assert_eq!(e.snapshot(), before);
    assert!(e.reconcile(&before).unwrap().is_noop());
}

#[test]
fn second_gesture_on_same_item_is_rejected() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&[GridItem::new("a", 0, 0, 2, 2)]).unwrap();
    e.begin_gesture("a", GestureKind::Drag).unwrap();
    assert!(matches!(
        e.begin_gesture("a", GestureKind::Resize),
        Err(GridError::Gesture(GestureError::AlreadyInteracting { .. }))
    ));
    assert!(matches!(
        e.end_gesture("missing"),
        Err(GridError::Gesture(GestureError::NotInteracting { .. }))
    ));
}

// ============================================================================
// Mode switching
// ============================================================================

fn seeded_layout() -> Vec<GridItem> {
    vec![
        GridItem::new("clock", 0, 0, 3, 2),
        GridItem::new("banner", 3, 0, 6, 1).locked(true),
        GridItem::new("feed", 0, 2, 9, 4),
    ]
}

#[test]
fn live_toggle_preserves_layout() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&seeded_layout()).unwrap();
    let before = e.snapshot();

    e.set_interactive(false).unwrap();
    assert_eq!(e.mode(), Mode::Static);
    assert!(e.surface().is_static());
    assert_eq!(e.snapshot(), before);

    e.set_interactive(true).unwrap();
    assert_eq!(e.mode(), Mode::Editable);
    assert!(!e.surface().is_static());
    assert_eq!(e.snapshot(), before);
}

#[test]
fn rebuild_preserves_layout() {
    let config = GridConfig::new(9);
    let builds = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&builds);
    let surface = VirtualSurface::new(&config).without_live_toggle();
    let mut e = GridEngine::new(config, surface)
        .unwrap()
        .with_rebuild(move |config| {
            counter.set(counter.get() + 1);
            VirtualSurface::new(config).without_live_toggle()
        });
    e.reconcile(&seeded_layout()).unwrap();
    let before = e.snapshot();
    let log = record(&mut e);

    e.set_interactive(false).unwrap();
    assert_eq!(builds.get(), 1);
    assert!(e.surface().is_static());
    assert!(!e.surface().animates());
    assert_eq!(e.snapshot(), before);
    assert!(!e.config().editable);

    e.set_interactive(true).unwrap();
    assert_eq!(builds.get(), 2);
    assert_eq!(e.snapshot(), before);
    assert!(e.reconcile(&seeded_layout()).unwrap().is_noop());
    assert!(log.borrow().is_empty());
}

#[test]
fn mode_switch_cancels_gesture_in_flight() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&seeded_layout()).unwrap();
    let before = e.snapshot();
    let log = record(&mut e);

    e.begin_gesture("clock", GestureKind::Drag).unwrap();
    e.drag_to("clock", 0, 3).unwrap();
    e.set_mode(Mode::Static).unwrap();

    assert_eq!(e.snapshot(), before);
    assert!(layout_changes(&log).is_empty());
    assert!(log.borrow().contains(&GridEvent::ItemInteractionEnded {
        id: "clock".into(),
        kind: GestureKind::Drag,
        committed: false,
    }));
    assert_eq!(
        e.begin_gesture("clock", GestureKind::Drag),
        Err(GridError::Gesture(GestureError::StaticMode))
    );
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn dropping_engine_releases_listeners() {
    let log: EventLog = Rc::default();
    {
        let mut e = engine(GridConfig::new(9));
        let sink = Rc::clone(&log);
        e.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        assert_eq!(Rc::strong_count(&log), 2);
    }
    assert_eq!(Rc::strong_count(&log), 1);
}

#[test]
fn torn_down_engine_refuses_work() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&seeded_layout()).unwrap();
    e.teardown();
    assert!(e.is_torn_down());
    assert!(e.snapshot().is_empty());
    assert_eq!(e.add_item(GridItem::new("x", 0, 0, 1, 1)), Err(GridError::TornDown));
    assert_eq!(e.set_interactive(false), Err(GridError::TornDown));
    assert_eq!(e.compact(), Err(GridError::TornDown));
}

// ============================================================================
// Serialized shapes
// ============================================================================

#[test]
fn config_reads_console_json() {
    let config: GridConfig = serde_json::from_str(
        r#"{"columns":9,"margin":6,"cellHeight":120,"editable":false,"animate":false}"#,
    )
    .unwrap();
    assert_eq!(config.margin, Margin::Uniform(6.0));
    assert_eq!(config.cell_height, CellHeight::Fixed(120.0));
    assert_eq!(config.float_policy, FloatPolicy::CollisionAvoid);
    assert_eq!(config.initial_mode(), Mode::Static);

    assert!(serde_json::from_str::<GridConfig>(r#"{"columns":9,"cellHeight":"tall"}"#).is_err());
}

#[test]
fn item_json_is_flat() {
    let item = GridItem::new("clock", 1, 2, 3, 4)
        .with_bounds(SizeBounds {
            min_w: Some(2),
            ..SizeBounds::UNBOUNDED
        })
        .locked(true)
        .with_content(ContentKey::new("clock-widget"));
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": "clock", "x": 1, "y": 2, "w": 3, "h": 4,
            "minW": 2, "locked": true, "content": "clock-widget"
        })
    );
    let back: GridItem = serde_json::from_value(json).unwrap();
    assert_eq!(back, item);
}

#[test]
fn persisted_snapshot_reloads_into_engine() {
    let mut e = engine(GridConfig::new(9));
    e.reconcile(&seeded_layout()).unwrap();
    let snapshot = LayoutSnapshot::new(9, e.snapshot());
    let json = serde_json::to_string(&snapshot).unwrap();

    let loaded: LayoutSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.state_hash(), snapshot.state_hash());

    let model = GridModel::from_snapshot(GridConfig::new(9), loaded.clone()).unwrap();
    let mut fresh = engine(model.config().clone());
    fresh.reconcile(model.items()).unwrap();
    assert_eq!(fresh.snapshot(), e.snapshot());

    assert!(matches!(
        GridModel::from_snapshot(GridConfig::new(16), loaded),
        Err(GridError::Layout(LayoutValidationError::ColumnMismatch { .. }))
    ));
}

#[test]
fn future_schema_is_rejected() {
    let loaded: LayoutSnapshot =
        serde_json::from_str(r#"{"schemaVersion":7,"columns":9,"items":[]}"#).unwrap();
    assert_eq!(
        loaded.validate(),
        Err(LayoutValidationError::UnsupportedVersion {
            found: 7,
            expected: 1,
        })
    );
}

// ============================================================================
// Logging
// ============================================================================

#[test]
fn engine_runs_under_a_tracing_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let mut e = engine(GridConfig::new(9));
        e.reconcile(&[GridItem::new("a", 0, 0, 2, 2), GridItem::new("a", 4, 0, 2, 2)])
            .unwrap();
        e.begin_gesture("a", GestureKind::Drag).unwrap();
        e.drag_to("a", 3, 0).unwrap();
        e.end_gesture("a").unwrap();
        e.set_interactive(false).unwrap();
        assert_eq!(e.snapshot()[0].rect, GridRect::new(3, 0, 2, 2));
    });
}
