use desktop_helper::overlay::model::{Rect, DEFAULT_TRANSPARENCY_KEY};
use desktop_helper::overlay::scheduler::DEFAULT_REPAINT_INTERVAL;
use desktop_helper::overlay::{ExStyle, IdleScheduler, OverlayWindow};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mock_backend::{BackendCall, MockBackend};

fn overlay() -> (OverlayWindow<MockBackend>, MockBackend) {
    let backend = MockBackend::new(Rect::new(0, 0, 1280, 720), ExStyle(0));
    let probe = backend.clone();
    let window = OverlayWindow::create(backend, DEFAULT_TRANSPARENCY_KEY).expect("create");
    probe.calls.lock().unwrap().clear();
    (window, probe)
}

#[test]
fn yields_within_one_cycle_of_a_message_arriving() {
    for arrive_after in [0u64, 1, 2, 7, 30] {
        let (mut window, probe) = overlay();
        let polls = Rc::new(Cell::new(0u64));
        let sleeps = Rc::new(Cell::new(0u64));
        let polls_in = Rc::clone(&polls);
        let sleeps_in = Rc::clone(&sleeps);
        let mut scheduler = IdleScheduler::new(
            DEFAULT_REPAINT_INTERVAL,
            move || {
                polls_in.set(polls_in.get() + 1);
                // The message lands while the thread sleeps in cycle `arrive_after`.
                sleeps_in.get() >= arrive_after
            },
            {
                let sleeps = Rc::clone(&sleeps);
                move |_| sleeps.set(sleeps.get() + 1)
            },
        );

        let cycles = scheduler.tick(&mut window);
        assert_eq!(cycles, arrive_after);
        assert_eq!(polls.get(), arrive_after + 1);
        let invalidations = probe
            .calls()
            .iter()
            .filter(|c| **c == BackendCall::Invalidate)
            .count() as u64;
        assert_eq!(invalidations, arrive_after);
    }
}

#[test]
fn cycle_order_is_topmost_front_invalidate() {
    let (mut window, probe) = overlay();
    let mut remaining = 2;
    let mut scheduler = IdleScheduler::new(
        DEFAULT_REPAINT_INTERVAL,
        move || {
            if remaining == 0 {
                return true;
            }
            remaining -= 1;
            false
        },
        |_| {},
    );
    scheduler.tick(&mut window);
    assert_eq!(
        probe.calls(),
        vec![
            BackendCall::BringToTop,
            BackendCall::CanvasToFront,
            BackendCall::Invalidate,
            BackendCall::BringToTop,
            BackendCall::CanvasToFront,
            BackendCall::Invalidate,
        ]
    );
}

#[test]
fn scheduler_never_touches_input_mode() {
    let (mut window, probe) = overlay();
    let mut remaining = 10;
    let mut scheduler = IdleScheduler::new(
        DEFAULT_REPAINT_INTERVAL,
        move || {
            if remaining == 0 {
                return true;
            }
            remaining -= 1;
            false
        },
        |_| {},
    );
    scheduler.tick(&mut window);
    assert!(probe.applied_styles().is_empty());
    assert!(window.is_click_through());
}

#[test]
fn sleeps_exactly_the_configured_interval_per_cycle() {
    let (mut window, _probe) = overlay();
    let interval = Duration::from_millis(5);
    let mut remaining = 6;
    let mut slept = Vec::new();
    {
        let mut scheduler = IdleScheduler::new(
            interval,
            move || {
                if remaining == 0 {
                    return true;
                }
                remaining -= 1;
                false
            },
            |d| slept.push(d),
        );
        assert_eq!(scheduler.tick(&mut window), 6);
        assert_eq!(scheduler.total_cycles(), 6);
    }
    assert_eq!(slept, vec![interval; 6]);
}

#[test]
fn repeated_idle_notifications_accumulate_cycles() {
    let (mut window, _probe) = overlay();
    let mut counter = 0u32;
    let mut scheduler = IdleScheduler::new(
        DEFAULT_REPAINT_INTERVAL,
        move || {
            counter += 1;
            // Three cycles, then a message; repeated for every notification.
            counter % 4 == 0
        },
        |_| {},
    );
    for _ in 0..5 {
        assert_eq!(scheduler.tick(&mut window), 3);
    }
    assert_eq!(scheduler.total_cycles(), 15);
}

#[test]
fn sustained_idle_rate_tracks_the_interval() {
    let (mut window, _probe) = overlay();
    let deadline = Instant::now() + Duration::from_millis(400);
    let mut scheduler = IdleScheduler::with_thread_sleep(DEFAULT_REPAINT_INTERVAL, move || {
        Instant::now() >= deadline
    });
    scheduler.tick(&mut window);

    let hz = scheduler.rate().hz().expect("rate after sustained idling");
    // Sleep never returns early, so the rate cannot exceed 125 Hz; allow a
    // generous floor for loaded machines.
    assert!(hz <= 125.0 + 1e-6, "hz = {hz}");
    assert!(hz > 20.0, "hz = {hz}");
}
