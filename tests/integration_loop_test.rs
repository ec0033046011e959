//! Integration tests for the dual-camera session.
//!
//! Runs two `IntegrationLoop`s concurrently against one shared
//! accumulator, the way the rig runs them, and checks the pixel-exact
//! accumulation contract, the owner-reset protocol, and the
//! partial-result semantics of early exits.

use dualcam_daq::acquisition::{
    AccumulatorRole, Correction, IntegrationLoop, QuadrantLut, SharedAccumulator, StopReason,
    QUADRANTS,
};
use dualcam_daq::hardware::{Frame, MockFrameSource, WaitOutcome};
use std::sync::Arc;

const SAMPLES: usize = 16;

fn dual_loops(
    cam0: Arc<MockFrameSource>,
    cam1: Arc<MockFrameSource>,
    accumulator: &Arc<SharedAccumulator>,
    num_integrations: u32,
) -> (
    IntegrationLoop<MockFrameSource>,
    IntegrationLoop<MockFrameSource>,
) {
    let loop0 = IntegrationLoop::new(
        "cam0",
        AccumulatorRole::Owner,
        cam0,
        Correction::Passthrough,
        Arc::clone(accumulator),
        num_integrations,
    );
    let loop1 = IntegrationLoop::new(
        "cam1",
        AccumulatorRole::Sibling,
        cam1,
        Correction::Passthrough,
        Arc::clone(accumulator),
        num_integrations,
    );
    (loop0, loop1)
}

#[tokio::test]
async fn two_cameras_sum_eight_frames_each_over_two_cycles() {
    // 2 cycles x 4 quadrant passes = 8 frames per camera.
    let cam0 = Arc::new(MockFrameSource::with_ready_frames("cam0", 8, |seq| {
        vec![seq as u16 + 1; SAMPLES]
    }));
    let cam1 = Arc::new(MockFrameSource::with_ready_frames("cam1", 8, |seq| {
        vec![(seq as u16 + 1) * 100; SAMPLES]
    }));
    let accumulator = Arc::new(SharedAccumulator::new(SAMPLES, 2));
    let (loop0, loop1) = dual_loops(Arc::clone(&cam0), Arc::clone(&cam1), &accumulator, 2);

    let (r0, r1) = tokio::join!(loop0.run_session(), loop1.run_session());

    assert!(r0.ran_to_completion());
    assert!(r1.ran_to_completion());
    assert_eq!(r0.cycles_completed, 2);
    assert_eq!(r1.cycles_completed, 2);

    // 1+2+..+8 from cam0 plus 100*(1+2+..+8) from cam1, at every position.
    let expected = 36 + 100 * 36;
    assert_eq!(accumulator.snapshot(), vec![expected; SAMPLES]);
    assert_eq!(cam0.release_count().await, 8);
    assert_eq!(cam1.release_count().await, 8);
}

#[tokio::test]
async fn abort_on_one_camera_leaves_the_sibling_running() {
    // cam0 aborts on the third pass of cycle 1; cam1 runs both cycles.
    let cam0 = Arc::new(MockFrameSource::new("cam0"));
    for seq in 0..2 {
        cam0.push_frame(Frame::filled(seq, SAMPLES, 1)).await;
    }
    cam0.push_outcome(WaitOutcome::Aborted).await;

    let cam1 = Arc::new(MockFrameSource::with_ready_frames("cam1", 8, |_| {
        vec![10u16; SAMPLES]
    }));
    let accumulator = Arc::new(SharedAccumulator::new(SAMPLES, 2));
    let (loop0, loop1) = dual_loops(Arc::clone(&cam0), Arc::clone(&cam1), &accumulator, 2);

    let (r0, r1) = tokio::join!(loop0.run_session(), loop1.run_session());

    assert_eq!(r0.stop_reason, Some(StopReason::Aborted));
    assert_eq!(r0.cycles_completed, 0);
    assert_eq!(r0.frames_accumulated, 2);

    assert!(r1.ran_to_completion());
    assert_eq!(r1.frames_accumulated, 8);

    // Frames 1-2 from cam0 (2 counts) plus all 8 frames from cam1.
    assert_eq!(accumulator.snapshot(), vec![2 + 80; SAMPLES]);
}

#[tokio::test]
async fn lut_correction_applies_the_quadrant_table_per_stream() {
    let offset_table =
        |offset: u16| -> Vec<u16> { (0..=u16::MAX).map(|v| v.wrapping_add(offset)).collect() };
    let lut = QuadrantLut::from_tables([
        offset_table(1),
        offset_table(2),
        offset_table(3),
        offset_table(4),
    ])
    .unwrap();

    let raw: Vec<u16> = (0..SAMPLES as u16).map(|i| i * 7).collect();
    let source = Arc::new(MockFrameSource::with_ready_frames("cam0", 4, {
        let raw = raw.clone();
        move |_| raw.clone()
    }));
    let accumulator = Arc::new(SharedAccumulator::new(SAMPLES, 1));
    let int_loop = IntegrationLoop::new(
        "cam0",
        AccumulatorRole::Owner,
        source,
        Correction::Lut(lut),
        Arc::clone(&accumulator),
        1,
    );

    let report = int_loop.run_session().await;
    assert!(report.ran_to_completion());

    // One cycle = 4 frames, each contributing lut_{i mod 4}[raw[i]].
    let expected: Vec<u64> = raw
        .iter()
        .enumerate()
        .map(|(i, &v)| 4 * u64::from(v + 1 + (i % QUADRANTS) as u16))
        .collect();
    assert_eq!(accumulator.snapshot(), expected);
}

#[tokio::test]
async fn identity_lut_matches_passthrough_sums() {
    let raw: Vec<u16> = (0..SAMPLES as u16).map(|i| i * 31 + 5).collect();

    let run = |correction: Correction, raw: Vec<u16>| async move {
        let source = Arc::new(MockFrameSource::with_ready_frames("cam", 12, {
            move |_| raw.clone()
        }));
        let accumulator = Arc::new(SharedAccumulator::new(SAMPLES, 1));
        let int_loop = IntegrationLoop::new(
            "cam",
            AccumulatorRole::Owner,
            source,
            correction,
            Arc::clone(&accumulator),
            3,
        );
        int_loop.run_session().await;
        accumulator.snapshot()
    };

    let with_lut = run(Correction::Lut(QuadrantLut::identity()), raw.clone()).await;
    let without = run(Correction::Passthrough, raw.clone()).await;

    assert_eq!(with_lut, without);
    let expected: Vec<u64> = raw.iter().map(|&v| 12 * u64::from(v)).collect();
    assert_eq!(with_lut, expected);
}

#[tokio::test]
async fn persistent_backlog_is_counted_on_both_cameras() {
    let cam0 = Arc::new(MockFrameSource::with_ready_frames("cam0", 8, |_| {
        vec![1u16; SAMPLES]
    }));
    let cam1 = Arc::new(MockFrameSource::with_ready_frames("cam1", 8, |_| {
        vec![1u16; SAMPLES]
    }));
    // Every pass reports five frames queued ahead of the loop.
    cam0.script_queued([5; 8]).await;
    cam1.script_queued([5; 8]).await;

    let accumulator = Arc::new(SharedAccumulator::new(SAMPLES, 2));
    let (loop0, loop1) = dual_loops(Arc::clone(&cam0), Arc::clone(&cam1), &accumulator, 2);

    let (r0, r1) = tokio::join!(loop0.run_session(), loop1.run_session());

    assert_eq!(r0.backlog_total, 40);
    assert_eq!(r1.backlog_total, 40);
    // Backlog is diagnostic only: sums are exactly the 16 frames.
    assert_eq!(accumulator.snapshot(), vec![16; SAMPLES]);
    assert!(r0.ran_to_completion());
    assert!(r1.ran_to_completion());
}

#[tokio::test]
async fn owner_reset_lands_before_any_sibling_add() {
    let accumulator = Arc::new(SharedAccumulator::new(SAMPLES, 2));
    // Stale sums from a previous session.
    accumulator.accumulate(&vec![7u16; SAMPLES], &Correction::Passthrough);

    let cam0 = Arc::new(MockFrameSource::with_ready_frames("cam0", 4, |_| {
        vec![1u16; SAMPLES]
    }));
    let cam1 = Arc::new(MockFrameSource::with_ready_frames("cam1", 4, |_| {
        vec![1u16; SAMPLES]
    }));
    let (loop0, loop1) = dual_loops(cam0, cam1, &accumulator, 1);

    let (r0, r1) = tokio::join!(loop0.run_session(), loop1.run_session());

    assert!(r0.ran_to_completion());
    assert!(r1.ran_to_completion());
    // The stale 7s are gone; only this session's 8 frames remain.
    assert_eq!(accumulator.snapshot(), vec![8; SAMPLES]);
}
