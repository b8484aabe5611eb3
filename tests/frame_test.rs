use instant::Duration;
use petal_ngin::frame::{FrameClock, MAX_FRAME_SCALE};

use crate::common::test_utils::assert_close;

mod common;

#[test]
fn one_tick_per_frame() {
    let mut clock = FrameClock::default();
    for expected in 0..10u64 {
        let tick = clock.tick(Duration::from_millis(16));
        assert_eq!(tick.index, expected);
        assert_eq!(clock.ticks(), expected + 1);
    }
}

#[test]
fn scale_counts_reference_frames() {
    let mut clock = FrameClock::new(60.0);
    assert_close(clock.tick(Duration::from_secs_f32(1.0 / 60.0)).scale, 1.0);
    assert_close(clock.tick(Duration::from_secs_f32(1.0 / 30.0)).scale, 2.0);
    assert_close(clock.tick(Duration::from_secs_f32(1.0 / 120.0)).scale, 0.5);
    assert_eq!(clock.tick(Duration::ZERO).scale, 0.0);
}

#[test]
fn long_frames_are_clamped() {
    let mut clock = FrameClock::new(60.0);
    let tick = clock.tick(Duration::from_secs(5));
    assert_eq!(tick.scale, MAX_FRAME_SCALE);
    // Elapsed time still reflects the real gap
    assert_close(tick.elapsed, 5.0);
}

#[test]
fn elapsed_accumulates() {
    let mut clock = FrameClock::default();
    clock.tick(Duration::from_millis(250));
    let tick = clock.tick(Duration::from_millis(500));
    assert_close(tick.elapsed, 0.75);
    assert_close(clock.elapsed(), 0.75);
}
