#![forbid(unsafe_code)]

//! Edge autoscroll against a scrolling [`SimGrid`].
//!
//! The grid is 20 cells in two columns (ten rows of 10px plus a 10px
//! new-group zone) inside a 40px viewport, so the scroll extent is `0..=70`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gridshift::{
    AutoscrollConfig, DragToken, GridIndex, ImmediateRecognizer, Point, PointerEvent, Rect,
    ReorderConfig, ReorderCoordinator, ReorderEffect, ReorderError, Size,
};
use gridshift_harness::SimGrid;

const FRAME: Duration = Duration::from_millis(16);
const MAX_SCROLL: f32 = 70.0;

fn idx(group: usize, item: usize) -> GridIndex {
    GridIndex::new(group, item)
}

struct Fixture {
    grid: SimGrid,
    coordinator: ReorderCoordinator,
    calls: Rc<RefCell<Vec<(GridIndex, GridIndex)>>>,
}

impl Fixture {
    fn new(config: ReorderConfig, scroll: f32) -> Self {
        let calls: Rc<RefCell<Vec<(GridIndex, GridIndex)>>> = Rc::default();
        let sink = Rc::clone(&calls);
        let mut coordinator = ReorderCoordinator::new(config, [20])
            .expect("valid config")
            .with_on_reorder(move |from, to| sink.borrow_mut().push((from, to)));
        let mut grid = SimGrid::new(
            [20],
            2,
            Size::new(10.0, 10.0),
            Rect::new(0.0, 0.0, 20.0, 40.0),
        );
        assert_eq!(grid.max_scroll(), MAX_SCROLL);
        grid.set_scroll(scroll);
        grid.sync_mounts(&mut coordinator);
        Self {
            grid,
            coordinator,
            calls,
        }
    }

    fn press(&mut self, index: GridIndex) -> DragToken {
        let at = self.grid.cell_center(index).expect("slot on screen");
        self.coordinator
            .start_item_drag_reorder(
                index,
                PointerEvent::new(0, at),
                Box::new(ImmediateRecognizer::on_down()),
                &mut self.grid,
            )
            .expect("mounted target")
    }

    /// One pointer sample followed by one frame.
    fn hold(&mut self, token: DragToken, at: Point) {
        self.coordinator
            .pointer_move(token, PointerEvent::new(0, at), &mut self.grid);
        self.grid.run_frames(&mut self.coordinator, FRAME, 1);
    }
}

fn assert_monotonic(jumps: &[f32], increasing: bool) {
    for pair in jumps.windows(2) {
        if increasing {
            assert!(pair[1] >= pair[0], "{jumps:?}");
        } else {
            assert!(pair[1] <= pair[0], "{jumps:?}");
        }
    }
}

#[test]
fn holding_near_bottom_scrolls_to_extent() {
    let mut fx = Fixture::new(ReorderConfig::default(), 0.0);
    let token = fx.press(idx(0, 2));
    // Pressed at the cell centre, so the proxy bottom sits 3px past the edge.
    for _ in 0..60 {
        fx.hold(token, Point::new(5.0, 38.0));
    }

    let jumps = fx.grid.jumps();
    assert!(!jumps.is_empty());
    assert_monotonic(&jumps, true);
    assert!(jumps.iter().all(|&p| (0.0..=MAX_SCROLL).contains(&p)), "{jumps:?}");
    // Minimum overrun step: threshold 20 / coefficient 10.
    assert_eq!(jumps[0], 2.0);
    assert_eq!(fx.grid.scroll_position(), MAX_SCROLL);
}

#[test]
fn holding_near_top_scrolls_back_to_start() {
    let mut fx = Fixture::new(ReorderConfig::default(), MAX_SCROLL);
    let token = fx.press(idx(0, 18));
    for _ in 0..60 {
        fx.hold(token, Point::new(5.0, 2.0));
    }

    let jumps = fx.grid.jumps();
    assert!(!jumps.is_empty());
    assert_monotonic(&jumps, false);
    assert!(jumps.iter().all(|&p| (0.0..=MAX_SCROLL).contains(&p)), "{jumps:?}");
    assert_eq!(fx.grid.scroll_position(), 0.0);
}

#[test]
fn scrolling_stops_once_proxy_is_back_inside() {
    let mut fx = Fixture::new(ReorderConfig::default(), 0.0);
    let token = fx.press(idx(0, 2));
    for _ in 0..5 {
        fx.hold(token, Point::new(5.0, 38.0));
    }
    let before = fx.grid.jumps().len();
    assert!(before > 0);

    for _ in 0..20 {
        fx.hold(token, Point::new(5.0, 20.0));
    }
    // At most the step already in flight lands.
    assert!(fx.grid.jumps().len() <= before + 1);
}

#[test]
fn disabled_autoscroll_never_jumps() {
    let config = ReorderConfig::default().with_autoscroll(AutoscrollConfig {
        enabled: false,
        ..AutoscrollConfig::default()
    });
    let mut fx = Fixture::new(config, 0.0);
    assert!(!fx.coordinator.config().autoscroll.enabled);
    let token = fx.press(idx(0, 2));
    for _ in 0..20 {
        fx.hold(token, Point::new(5.0, 38.0));
    }
    assert!(fx.grid.jumps().is_empty());
    assert_eq!(fx.grid.scroll_position(), 0.0);
}

#[test]
fn zero_velocity_is_rejected_up_front() {
    let config = ReorderConfig::default().with_autoscroll(AutoscrollConfig {
        velocity_scalar: 0.0,
        ..AutoscrollConfig::default()
    });
    assert!(matches!(
        ReorderCoordinator::new(config, [20]),
        Err(ReorderError::InvalidConfig {
            field: "autoscroll.velocity_scalar",
            ..
        })
    ));
}

#[test]
fn drop_onto_cell_revealed_by_scrolling() {
    let mut fx = Fixture::new(ReorderConfig::default(), 0.0);
    let token = fx.press(idx(0, 2));
    for _ in 0..60 {
        fx.hold(token, Point::new(5.0, 38.0));
    }
    assert_eq!(fx.grid.scroll_position(), MAX_SCROLL);
    // The dragged cell scrolled out and was unmounted.
    assert!(!fx.coordinator.registry().contains(idx(0, 2)));
    assert!(fx.coordinator.registry().contains(idx(0, 19)));

    let last = fx.grid.cell_center(idx(0, 19)).expect("visible");
    let effect = fx
        .coordinator
        .pointer_move(token, PointerEvent::new(0, last), &mut fx.grid);
    assert!(matches!(
        effect,
        ReorderEffect::InsertChanged { insert, .. } if insert == idx(0, 19)
    ));

    let drop = fx.coordinator.pointer_up(token, &mut fx.grid);
    assert!(matches!(
        drop,
        ReorderEffect::Dropping { drop_position, .. } if drop_position == Point::new(10.0, 20.0)
    ));
    let jumps_at_release = fx.grid.jumps().len();
    fx.grid.run_frames(&mut fx.coordinator, FRAME, 200);

    assert_eq!(*fx.calls.borrow(), vec![(idx(0, 2), idx(0, 19))]);
    assert_eq!(fx.grid.jumps().len(), jumps_at_release);
    assert!(fx.coordinator.session().is_none());
}
