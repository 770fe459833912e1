// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer state machine and the built-in plugins, driven end to end.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{Fixture, offset};
use kurbo::{Insets, Point, Rect, Size, Vec2};
use understory_draggable::memory::MemoryHost;
use understory_draggable::plugins::{
    Axis, Bounds, BoundsFrom, Grid, Threshold, ThresholdOptions,
};
use understory_draggable::style::{DATA_COUNT, DATA_ROOT, DATA_STATE};
use understory_draggable::{
    DragError, DraggableOptions, Engine, Host, PluginRef, PointerEvent, SECONDARY_BUTTON,
};

#[test]
fn sub_threshold_moves_change_nothing() {
    let mut fx = Fixture::new();
    let d = fx.mount([]);
    fx.down(10.0, 10.0).unwrap();
    fx.move_to(11.0, 11.0).unwrap();
    fx.move_to(12.0, 10.0).unwrap();

    assert!(d.is_interacting().unwrap());
    assert!(!d.is_dragging().unwrap());
    assert_eq!(offset(&d), Vec2::ZERO);
    assert_eq!(fx.translate(), None);
    assert_eq!(fx.data(DATA_STATE).as_deref(), Some("idle"));

    fx.up(12.0, 10.0).unwrap();
    assert_eq!(fx.data(DATA_COUNT).as_deref(), Some("0"));
    assert!(fx.host.click(fx.node), "no drag, no click suppression");
}

#[test]
fn distance_threshold_is_inclusive_and_keeps_the_transition_move() {
    let mut fx = Fixture::new();
    let d = fx.mount([]);
    fx.down(10.0, 10.0).unwrap();
    fx.move_to(12.9, 10.0).unwrap();
    assert!(!d.is_dragging().unwrap());

    fx.move_to(13.0, 10.0).unwrap();
    assert!(d.is_dragging().unwrap());
    assert_eq!(offset(&d), Vec2::new(3.0, 0.0), "the promoting move is not dropped");
    assert_eq!(fx.translate().as_deref(), Some("3px 0px"));
    assert_eq!(fx.data(DATA_STATE).as_deref(), Some("dragging"));
}

#[test]
fn delay_threshold_uses_event_time() {
    let mut fx = Fixture::new();
    // The fixture advances the clock 16ms per event.
    let d = fx.mount([PluginRef::new(Threshold::new(
        ThresholdOptions::default().with_delay_ms(40.0).with_distance(0.0),
    ))]);
    fx.down(10.0, 10.0).unwrap();
    fx.move_to(30.0, 10.0).unwrap(); // 16ms
    fx.move_to(40.0, 10.0).unwrap(); // 32ms
    assert!(!d.is_dragging().unwrap());
    fx.move_to(50.0, 10.0).unwrap(); // 48ms
    assert!(d.is_dragging().unwrap());
    assert_eq!(offset(&d), Vec2::new(40.0, 0.0));
}

#[test]
fn invalid_threshold_fails_mount_without_side_effects() {
    let fx = Fixture::new();
    let err = fx
        .engine
        .mount(
            fx.node,
            [PluginRef::new(Threshold::new(
                ThresholdOptions::default().with_distance(-1.0),
            ))],
        )
        .unwrap_err();
    assert!(matches!(err, DragError::InvalidThreshold { .. }));
    assert!(fx.engine.is_empty());
    assert_eq!(fx.data(DATA_ROOT), None, "setup effects were not flushed");
    assert_eq!(fx.host.style(&fx.node, "touch-action"), None);
}

#[test]
fn axis_x_drops_vertical_movement() {
    let mut fx = Fixture::new();
    let d = fx.mount([PluginRef::new(Axis::X)]);
    fx.drag((10.0, 10.0), (110.0, 110.0));
    assert_eq!(offset(&d), Vec2::new(100.0, 0.0));
    assert_eq!(fx.translate().as_deref(), Some("100px 0px"));
}

#[test]
fn axis_y_drops_horizontal_movement() {
    let mut fx = Fixture::new();
    let d = fx.mount([PluginRef::new(Axis::Y)]);
    fx.drag((10.0, 10.0), (110.0, 60.0));
    assert_eq!(offset(&d), Vec2::new(0.0, 50.0));
}

#[test]
fn bounds_clamp_to_the_right_edge() {
    let mut fx = Fixture::new();
    let d = fx.mount([PluginRef::new(Bounds::new(BoundsFrom::Rect(Rect::new(
        0.0, 0.0, 200.0, 200.0,
    ))))]);
    fx.drag((10.0, 10.0), (310.0, 10.0));
    assert_eq!(offset(&d).x, 100.0);
}

#[test]
fn bounds_from_parent_with_padding() {
    let host = Rc::new(MemoryHost::new(Size::new(800.0, 600.0)));
    let parent = host.create(host.body(), Rect::new(0.0, 0.0, 300.0, 300.0));
    let node = host.create(parent, Rect::new(10.0, 10.0, 110.0, 110.0));
    let engine = Engine::new(host.clone(), DraggableOptions::default());
    let d = engine
        .mount(
            node,
            [PluginRef::new(
                Bounds::new(BoundsFrom::Parent).with_padding(Insets::uniform(10.0)),
            )],
        )
        .unwrap();

    engine
        .pointer_down(&PointerEvent::new(1, node, Point::new(50.0, 50.0), 0.0))
        .unwrap();
    engine
        .pointer_move(&PointerEvent::new(1, node, Point::new(-500.0, 900.0), 16.0))
        .unwrap();
    assert_eq!(d.offset().unwrap(), Vec2::new(0.0, 180.0));
}

#[test]
fn missing_bounds_target_is_reported_from_drag_start() {
    let mut fx = Fixture::new();
    let d = fx.mount([PluginRef::new(Bounds::new(BoundsFrom::Selector(
        ".nowhere".into(),
    )))]);
    fx.down(10.0, 10.0).unwrap();
    assert_eq!(
        fx.move_to(60.0, 10.0),
        Err(DragError::BoundsTargetNotFound {
            selector: ".nowhere".into()
        })
    );
    assert!(!d.is_dragging().unwrap(), "promotion was abandoned");
    assert!(d.is_interacting().unwrap());
    assert_eq!(offset(&d), Vec2::ZERO);

    // Reported once; the next move drags without bounds.
    fx.move_to(70.0, 10.0).unwrap();
    assert!(d.is_dragging().unwrap());
    assert_eq!(offset(&d), Vec2::new(60.0, 0.0));
}

#[test]
fn bounds_smaller_than_element_fail_once_then_stand_aside() {
    let mut fx = Fixture::new();
    let d = fx.mount([PluginRef::new(Bounds::new(BoundsFrom::Rect(Rect::new(
        0.0, 0.0, 50.0, 50.0,
    ))))]);
    fx.down(10.0, 10.0).unwrap();
    assert!(matches!(
        fx.move_to(60.0, 10.0),
        Err(DragError::BoundsTooSmall { .. })
    ));
    assert!(!d.is_dragging().unwrap());

    fx.move_to(70.0, 10.0).unwrap();
    assert!(d.is_dragging().unwrap());
    fx.up(70.0, 10.0).unwrap();
    assert_eq!(offset(&d), Vec2::new(60.0, 0.0));

    // Still too small on the next gesture, but no longer an error.
    fx.drag((70.0, 10.0), (90.0, 10.0));
    assert_eq!(offset(&d), Vec2::new(80.0, 0.0));
    assert_eq!(fx.data(DATA_COUNT).as_deref(), Some("2"));
}

#[test]
fn grid_snaps_with_ceiling() {
    let mut fx = Fixture::new();
    let d = fx.mount([PluginRef::new(Grid::new(10.0, 10.0))]);
    fx.drag((10.0, 10.0), (104.0, 100.0));
    assert_eq!(offset(&d), Vec2::new(100.0, 90.0));
    assert_eq!(fx.translate().as_deref(), Some("100px 90px"));
}

#[test]
fn grid_runs_after_axis_lock() {
    let mut fx = Fixture::new();
    let d = fx.mount([PluginRef::new(Grid::new(10.0, 10.0)), PluginRef::new(Axis::X)]);
    fx.drag((10.0, 10.0), (104.0, 53.0));
    assert_eq!(offset(&d), Vec2::new(100.0, 0.0));
}

#[test]
fn count_increments_once_per_completed_drag() {
    let mut fx = Fixture::new();
    let _d = fx.mount([]);
    assert_eq!(fx.data(DATA_ROOT).as_deref(), Some(""));
    assert_eq!(fx.data(DATA_COUNT).as_deref(), Some("0"));

    fx.drag((10.0, 10.0), (50.0, 10.0));
    assert_eq!(fx.data(DATA_COUNT).as_deref(), Some("1"));
    assert_eq!(fx.data(DATA_STATE).as_deref(), Some("idle"));

    // Sub-threshold attempt.
    fx.drag((50.0, 10.0), (51.0, 10.0));
    assert_eq!(fx.data(DATA_COUNT).as_deref(), Some("1"));

    // Secondary button never starts.
    let event = fx.event(1, fx.node, 50.0, 10.0).with_button(SECONDARY_BUTTON);
    fx.engine.pointer_down(&event).unwrap();
    fx.move_to(90.0, 10.0).unwrap();
    fx.up(90.0, 10.0).unwrap();
    assert_eq!(fx.data(DATA_COUNT).as_deref(), Some("1"));

    fx.drag((50.0, 10.0), (20.0, 10.0));
    assert_eq!(fx.data(DATA_COUNT).as_deref(), Some("2"));
}

#[test]
fn second_pointer_cannot_drive_a_captured_instance() {
    let mut fx = Fixture::new();
    let d = fx.mount([]);
    fx.down(10.0, 10.0).unwrap();
    assert_eq!(fx.host.captured_pointer(fx.node), Some(1));

    let second_down = fx.event(2, fx.node, 20.0, 20.0).with_primary(false);
    fx.engine.pointer_down(&second_down).unwrap();
    let second_move = fx.event(2, fx.node, 200.0, 200.0).with_primary(false);
    fx.engine.pointer_move(&second_move).unwrap();
    assert_eq!(offset(&d), Vec2::ZERO);
    let second_up = fx.event(2, fx.node, 200.0, 200.0).with_primary(false);
    fx.engine.pointer_up(&second_up).unwrap();
    assert!(d.is_interacting().unwrap(), "foreign pointer-up is ignored");

    fx.move_to(30.0, 10.0).unwrap();
    assert_eq!(offset(&d), Vec2::new(20.0, 0.0));
    assert_eq!(fx.host.captured_pointer(fx.node), Some(1));
}

#[test]
fn non_primary_pointer_is_vetoed_by_default() {
    let mut fx = Fixture::new();
    let d = fx.mount([]);
    let event = fx.event(7, fx.node, 10.0, 10.0).with_primary(false);
    fx.engine.pointer_down(&event).unwrap();
    assert!(!d.is_interacting().unwrap());
}

#[test]
fn completed_drag_swallows_the_next_click_only() {
    let mut fx = Fixture::new();
    let _d = fx.mount([]);
    fx.drag((10.0, 10.0), (60.0, 10.0));
    assert_eq!(fx.host.captured_pointer(fx.node), None);
    assert!(!fx.host.click(fx.node));
    assert!(fx.host.click(fx.node));
}

#[test]
fn back_to_back_drags_swallow_a_single_click() {
    let mut fx = Fixture::new();
    let _d = fx.mount([]);
    fx.drag((10.0, 10.0), (60.0, 10.0));
    fx.drag((60.0, 10.0), (90.0, 10.0));
    assert!(!fx.host.click(fx.node));
    assert!(fx.host.click(fx.node), "later clicks are not eaten");
}

#[test]
fn move_default_is_prevented_once_dragging() {
    let mut fx = Fixture::new();
    let _d = fx.mount([]);
    fx.down(10.0, 10.0).unwrap();
    let early = fx.event(1, fx.node, 11.0, 10.0);
    fx.engine.pointer_move(&early).unwrap();
    assert!(!early.default_prevented());
    let late = fx.event(1, fx.node, 30.0, 10.0);
    fx.engine.pointer_move(&late).unwrap();
    assert!(late.default_prevented());
}

#[test]
fn user_select_is_suppressed_only_while_dragging() {
    let mut fx = Fixture::new();
    let _d = fx.mount([]);
    let body = fx.host.body();
    fx.host.set_style(&body, "user-select", "text");
    fx.down(10.0, 10.0).unwrap();
    fx.move_to(40.0, 10.0).unwrap();
    assert_eq!(fx.host.style(&body, "user-select").as_deref(), Some("none"));
    fx.up(40.0, 10.0).unwrap();
    assert_eq!(fx.host.style(&body, "user-select").as_deref(), Some("text"));
}

#[test]
fn scaled_elements_move_in_layout_units() {
    let mut fx = Fixture::new();
    fx.host.set_scale(fx.node, 2.0);
    let d = fx.mount([]);
    fx.drag((10.0, 10.0), (110.0, 10.0));
    assert_eq!(offset(&d), Vec2::new(50.0, 0.0));
}

#[test]
fn pointer_down_on_a_descendant_finds_the_draggable() {
    let mut fx = Fixture::new();
    let child = fx.host.create(fx.node, Rect::new(10.0, 10.0, 30.0, 30.0));
    let d = fx.mount([]);
    fx.down_on(child, 15.0, 15.0).unwrap();
    assert!(d.is_interacting().unwrap());
}

#[test]
fn pointer_cancel_ends_the_gesture() {
    let mut fx = Fixture::new();
    let d = fx.mount([]);
    fx.down(10.0, 10.0).unwrap();
    fx.move_to(40.0, 10.0).unwrap();
    let cancel = fx.event(1, fx.node, 40.0, 10.0);
    fx.engine.pointer_cancel(&cancel).unwrap();
    assert!(!d.is_interacting().unwrap());
    assert_eq!(fx.data(DATA_COUNT).as_deref(), Some("1"));
}

#[test]
fn only_one_instance_is_active_at_a_time() {
    let mut fx = Fixture::new();
    let other = fx.host.create(fx.host.body(), Rect::new(200.0, 0.0, 300.0, 100.0));
    let a = fx.mount([]);
    let b = fx.engine.mount(other, []).unwrap();

    fx.down(10.0, 10.0).unwrap();
    fx.down_on(other, 210.0, 10.0).unwrap();
    assert!(a.is_interacting().unwrap());
    assert!(!b.is_interacting().unwrap());
}

#[test]
fn listeners_are_installed_once_on_the_delegate_target() {
    let host = Rc::new(MemoryHost::new(Size::new(800.0, 600.0)));
    let panel = host.create(host.body(), Rect::new(0.0, 0.0, 400.0, 400.0));
    let a = host.create(panel, Rect::new(0.0, 0.0, 50.0, 50.0));
    let b = host.create(panel, Rect::new(100.0, 0.0, 150.0, 50.0));
    let outside = host.create(host.body(), Rect::new(500.0, 0.0, 550.0, 50.0));
    let engine = Engine::new(
        host.clone(),
        DraggableOptions::default().with_delegate_target(panel),
    );
    let _a = engine.mount(a, []).unwrap();
    let _b = engine.mount(b, []).unwrap();
    let c = engine.mount(outside, []).unwrap();
    assert_eq!(host.listener_targets(), [panel]);
    assert_eq!(engine.len(), 3);

    // Events outside the delegation root never reach an instance.
    engine
        .pointer_down(&PointerEvent::new(1, outside, Point::new(510.0, 10.0), 0.0))
        .unwrap();
    assert!(!c.is_interacting().unwrap());
}

#[test]
fn mounting_twice_is_an_error() {
    let fx = Fixture::new();
    let _d = fx.mount([]);
    assert_eq!(
        fx.engine.mount(fx.node, []).unwrap_err(),
        DragError::AlreadyMounted
    );
}

#[test]
fn reentrant_calls_fail_with_busy() {
    use understory_draggable::plugins::Events;

    let fx = Fixture::new();
    let engine = Rc::new(Engine::new(fx.host.clone(), DraggableOptions::default()));
    let seen: Rc<RefCell<Vec<Result<(), DragError>>>> = Rc::default();
    let events = {
        let engine = engine.clone();
        let seen = seen.clone();
        let node = fx.node;
        Events::<MemoryHost>::new().on_drag_start(move |_| {
            let nested = PointerEvent::new(9, node, Point::ZERO, 0.0);
            seen.borrow_mut().push(engine.pointer_down(&nested));
            seen.borrow_mut().push(engine.mount(node, []).map(|_| ()));
        })
    };
    let d = engine.mount(fx.node, [PluginRef::new(events)]).unwrap();

    engine
        .pointer_down(&PointerEvent::new(1, fx.node, Point::new(10.0, 10.0), 0.0))
        .unwrap();
    engine
        .pointer_move(&PointerEvent::new(1, fx.node, Point::new(40.0, 10.0), 16.0))
        .unwrap();
    assert_eq!(
        *seen.borrow(),
        [Err(DragError::Busy), Err(DragError::Busy)]
    );
    assert_eq!(d.offset().unwrap(), Vec2::new(30.0, 0.0));
}
