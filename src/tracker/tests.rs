use super::*;

fn p(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

fn tap(tracker: &mut PointerTracker, down_ms: u64, up_ms: u64, at: Point) -> GestureState {
    tracker.detect_state(ContactPhase::Begin, at, down_ms);
    tracker.detect_state(ContactPhase::End, at, up_ms)
}

fn stroke(from: Point, to: Point, duration_ms: u64) -> GestureState {
    let mut tracker = PointerTracker::default();
    tracker.detect_state(ContactPhase::Begin, from, 1_000);
    tracker.detect_state(ContactPhase::End, to, 1_000 + duration_ms)
}

#[test]
fn down_starts_fresh_cycle_at_sample() {
    let mut tracker = PointerTracker::default();
    let state = tracker.detect_state(ContactPhase::Begin, p(100.0, 100.0), 0);

    assert_eq!(state, GestureState::Down);
    assert_eq!(tracker.previous_state(), GestureState::None);
    assert!(tracker.is_tracking());
    assert_eq!(tracker.position_initial(), p(100.0, 100.0));
    assert_eq!(tracker.position_current(), p(100.0, 100.0));
    assert_eq!(tracker.time_initial_ms(), 0);
    assert!(tracker.previous_cycle().is_none());
}

#[test]
fn straight_up_release_is_swipe_up() {
    assert_eq!(
        stroke(p(100.0, 100.0), p(100.0, 40.0), 100),
        GestureState::Swipe(Direction::Up)
    );
}

#[test]
fn short_travel_release_is_up() {
    assert_eq!(stroke(p(100.0, 100.0), p(105.0, 103.0), 50), GestureState::Up);
}

#[test]
fn swipe_direction_follows_dominant_axis_sign_at_any_scale() {
    let cases = [
        (p(0.0, -1.0), Direction::Up),
        (p(0.3, 1.0), Direction::Down),
        (p(-1.0, 0.4), Direction::Left),
        (p(1.0, -0.9), Direction::Right),
    ];
    for (unit, expected) in cases {
        for scale in [10.0_f32, 15.0, 60.0, 250.0, 1_000.0] {
            for duration_ms in [0, 120, 400] {
                let to = p(200.0 + unit.x * scale, 200.0 + unit.y * scale);
                assert_eq!(
                    stroke(p(200.0, 200.0), to, duration_ms),
                    GestureState::Swipe(expected),
                    "unit={unit:?} scale={scale} duration={duration_ms}"
                );
            }
        }
    }
}

#[test]
fn sub_threshold_travel_is_up_regardless_of_duration() {
    for duration_ms in [0, 10, 399, 400, 401, 5_000] {
        for (dx, dy) in [(0.0, 0.0), (9.9, -9.9), (-9.0, 3.0), (0.0, 9.5)] {
            assert_eq!(
                stroke(p(50.0, 50.0), p(50.0 + dx, 50.0 + dy), duration_ms),
                GestureState::Up,
                "dx={dx} dy={dy} duration={duration_ms}"
            );
        }
    }
}

#[test]
fn slow_release_is_up_even_with_travel() {
    assert_eq!(stroke(p(0.0, 0.0), p(300.0, 0.0), 401), GestureState::Up);
    assert_eq!(
        stroke(p(0.0, 0.0), p(300.0, 0.0), 400),
        GestureState::Swipe(Direction::Right)
    );
}

#[test]
fn exact_diagonal_release_is_up() {
    assert_eq!(stroke(p(0.0, 0.0), p(40.0, 40.0), 100), GestureState::Up);
}

#[test]
fn quick_second_tap_on_same_slot_is_double_tap() {
    let mut tracker = PointerTracker::default();
    assert_eq!(tap(&mut tracker, 1_000, 1_050, p(10.0, 10.0)), GestureState::Up);
    assert_eq!(
        tap(&mut tracker, 1_200, 1_260, p(12.0, 11.0)),
        GestureState::DoubleTap
    );
    assert_eq!(tracker.previous_cycle().map(|c| c.state()), Some(GestureState::Up));
}

#[test]
fn double_tap_requires_every_bound() {
    // (first down, first up, second down, second up)
    let violations = [
        (1_000, 1_050, 1_250, 1_300), // gap == max gap
        (1_000, 1_100, 1_150, 1_200), // first hold == max hold
        (1_000, 1_050, 1_100, 1_200), // second hold == max hold
    ];
    for (d1, u1, d2, u2) in violations {
        let mut tracker = PointerTracker::default();
        tap(&mut tracker, d1, u1, p(10.0, 10.0));
        assert_eq!(
            tap(&mut tracker, d2, u2, p(10.0, 10.0)),
            GestureState::Up,
            "cycle ({d1}, {u1}, {d2}, {u2})"
        );
    }
}

#[test]
fn double_tap_takes_precedence_over_swipe() {
    let mut tracker = PointerTracker::default();
    tap(&mut tracker, 0, 40, p(10.0, 10.0));
    tracker.detect_state(ContactPhase::Begin, p(10.0, 10.0), 100);
    assert_eq!(
        tracker.detect_state(ContactPhase::End, p(10.0, 90.0), 150),
        GestureState::DoubleTap
    );
}

#[test]
fn failed_double_tap_falls_back_to_swipe() {
    let mut tracker = PointerTracker::default();
    tap(&mut tracker, 0, 40, p(10.0, 10.0));
    tracker.detect_state(ContactPhase::Begin, p(10.0, 10.0), 500);
    assert_eq!(
        tracker.detect_state(ContactPhase::End, p(10.0, 90.0), 550),
        GestureState::Swipe(Direction::Down)
    );
}

#[test]
fn first_cycle_never_double_taps() {
    let mut tracker = PointerTracker::default();
    assert!(!tracker.is_double_tap());
    assert_eq!(tap(&mut tracker, 0, 10, p(1.0, 1.0)), GestureState::Up);
}

#[test]
fn snapshot_keeps_one_generation_and_is_not_aliased() {
    let mut tracker = PointerTracker::default();
    tap(&mut tracker, 0, 50, p(10.0, 10.0));
    tap(&mut tracker, 1_000, 1_050, p(20.0, 20.0));
    tracker.detect_state(ContactPhase::Begin, p(30.0, 30.0), 2_000);
    tracker.detect_state(ContactPhase::Move, p(90.0, 30.0), 2_010);

    let previous = tracker.previous_cycle().expect("previous cycle retained");
    assert_eq!(previous.position_initial(), p(20.0, 20.0));
    assert_eq!(previous.position_current(), p(20.0, 20.0));
    assert!(previous.previous_cycle().is_none());
}

#[test]
fn config_survives_resets() {
    let config = TrackerConfig {
        min_swipe_distance_px: 80.0,
        ..TrackerConfig::default()
    };
    let mut tracker = PointerTracker::new(config);
    tap(&mut tracker, 0, 50, p(0.0, 0.0));
    tracker.detect_state(ContactPhase::Begin, p(0.0, 0.0), 1_000);
    assert_eq!(tracker.config(), &config);
    assert_eq!(
        tracker.detect_state(ContactPhase::End, p(60.0, 0.0), 1_100),
        GestureState::Up
    );
}

#[test]
fn move_below_threshold_keeps_state_and_last_sample() {
    let mut tracker = PointerTracker::default();
    tracker.detect_state(ContactPhase::Begin, p(100.0, 100.0), 0);

    let state = tracker.detect_state(ContactPhase::Move, p(110.0, 105.0), 16);
    assert_eq!(state, GestureState::Down);
    assert!(!tracker.updates_last_sample());
    assert_eq!(tracker.position_last(), p(100.0, 100.0));

    // Jitter accumulates against the frozen reference until it clears the threshold.
    let state = tracker.detect_state(ContactPhase::Move, p(125.0, 104.0), 32);
    assert_eq!(state, GestureState::Down);
    let state = tracker.detect_state(ContactPhase::Move, p(131.0, 104.0), 48);
    assert_eq!(state, GestureState::Move(Direction::Right));
    assert!(tracker.updates_last_sample());
    assert_eq!(tracker.position_last(), p(100.0, 100.0));
    assert_eq!(tracker.delta_last(), p(31.0, 4.0));
    assert_eq!(tracker.time_last_ms(), 0);
    assert_eq!(tracker.duration_last_ms(), 48);
}

#[test]
fn accepted_move_advances_reference_for_next_move() {
    let mut tracker = PointerTracker::default();
    tracker.detect_state(ContactPhase::Begin, p(0.0, 0.0), 0);
    tracker.detect_state(ContactPhase::Move, p(0.0, -40.0), 20);
    assert_eq!(tracker.state(), GestureState::Move(Direction::Up));

    let state = tracker.detect_state(ContactPhase::Move, p(-35.0, -40.0), 40);
    assert_eq!(state, GestureState::Move(Direction::Left));
    assert_eq!(tracker.previous_state(), GestureState::Move(Direction::Up));
    assert_eq!(tracker.position_last(), p(0.0, -40.0));
    assert_eq!(tracker.delta_initial(), p(-35.0, -40.0));
    assert_eq!(tracker.duration_initial_ms(), 40);
    assert_eq!(tracker.duration_last_ms(), 20);
}

#[test]
fn diagonal_move_past_threshold_keeps_state_but_advances_reference() {
    let mut tracker = PointerTracker::default();
    tracker.detect_state(ContactPhase::Begin, p(0.0, 0.0), 0);

    let state = tracker.detect_state(ContactPhase::Move, p(40.0, 40.0), 20);
    assert_eq!(state, GestureState::Down);
    assert_eq!(tracker.previous_state(), GestureState::Down);
    assert!(tracker.updates_last_sample());
    assert_eq!(tracker.delta_last(), p(40.0, 40.0));

    // The next sample is measured from the diagonal sample, not the contact point.
    tracker.detect_state(ContactPhase::Move, p(45.0, 42.0), 40);
    assert_eq!(tracker.position_last(), p(40.0, 40.0));
    assert_eq!(tracker.state(), GestureState::Down);

    let mut moving = PointerTracker::default();
    moving.detect_state(ContactPhase::Begin, p(0.0, 0.0), 0);
    moving.detect_state(ContactPhase::Move, p(40.0, 0.0), 20);
    let state = moving.detect_state(ContactPhase::Move, p(80.0, 40.0), 40);
    assert_eq!(state, GestureState::Move(Direction::Right));
    assert_eq!(moving.previous_state(), GestureState::Move(Direction::Right));
    assert!(moving.updates_last_sample());
}

#[test]
fn kinematics_report_distances() {
    let mut tracker = PointerTracker::default();
    tracker.detect_state(ContactPhase::Begin, p(0.0, 0.0), 0);
    tracker.detect_state(ContactPhase::Move, p(30.0, 40.0), 10);

    assert_eq!(tracker.distance_initial(), 50.0);
    assert_eq!(tracker.distance_last(), 50.0);
}

#[test]
fn release_after_jitter_measures_from_last_sample() {
    let mut tracker = PointerTracker::default();
    tracker.detect_state(ContactPhase::Begin, p(0.0, 0.0), 0);
    tracker.detect_state(ContactPhase::Move, p(5.0, 0.0), 10);
    tracker.detect_state(ContactPhase::End, p(8.0, 0.0), 20);

    assert_eq!(tracker.position_last(), p(5.0, 0.0));
    assert_eq!(tracker.time_last_ms(), 10);
    assert!(tracker.updates_last_sample());
}

#[test]
fn promote_shifts_current_into_previous() {
    let mut tracker = PointerTracker::default();
    tracker.detect_state(ContactPhase::Begin, p(0.0, 0.0), 0);
    tracker.promote(GestureState::HoldDown);

    assert_eq!(tracker.state(), GestureState::HoldDown);
    assert_eq!(tracker.previous_state(), GestureState::Down);

    // A sub-threshold move re-reads the same state, so nothing changes.
    tracker.detect_state(ContactPhase::Move, p(1.0, 1.0), 150);
    assert_eq!(tracker.previous_state(), tracker.state());
}

#[test]
fn display_state_keeps_settled_gesture_visible() {
    let mut tracker = PointerTracker::default();
    tracker.detect_state(ContactPhase::Begin, p(0.0, 0.0), 0);
    tracker.detect_state(ContactPhase::End, p(0.0, 80.0), 60);
    assert_eq!(tracker.display_state(), GestureState::Swipe(Direction::Down));

    tracker.promote(GestureState::Up);
    assert_eq!(tracker.state(), GestureState::Up);
    assert_eq!(tracker.display_state(), GestureState::Swipe(Direction::Down));

    let mut held = PointerTracker::default();
    held.detect_state(ContactPhase::Begin, p(0.0, 0.0), 0);
    held.promote(GestureState::HoldDown);
    held.detect_state(ContactPhase::End, p(0.0, 0.0), 500);
    assert_eq!(held.display_state(), GestureState::Up);
}
