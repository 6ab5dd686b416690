//! Integration tests for the countdown driver.
//!
//! Runs on tokio's paused clock, so every minute of countdown completes
//! instantly while tick spacing stays exact.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pomolock_core::timer::EventReceiver;
use pomolock_core::{Config, CoreError, Event, Notifier, Phase, Status, TimerDriver};

#[derive(Default)]
struct Recorder {
    notified: Mutex<Vec<Phase>>,
    locks: Mutex<usize>,
}

impl Notifier for Recorder {
    fn notify(&self, completed: Phase) {
        self.notified.lock().unwrap().push(completed);
    }

    fn lock_screen(&self) {
        *self.locks.lock().unwrap() += 1;
    }
}

fn short_config() -> Config {
    Config {
        work_time: 1,
        short_break: 1,
        long_break: 2,
        cycles: 2,
        auto_lock: true,
    }
}

async fn next_event(events: &mut EventReceiver) -> Event {
    events.recv().await.expect("driver closed the event stream")
}

/// Read events until the next snapshot and return its status.
async fn next_status(events: &mut EventReceiver) -> Status {
    loop {
        if let Some(status) = next_event(events).await.status() {
            return status.clone();
        }
    }
}

/// Read events until a phase completes, checking that the countdown only
/// ever goes down on the way.
async fn next_completion(events: &mut EventReceiver) -> (Phase, Phase, u32) {
    let mut last: Option<u64> = None;
    loop {
        match next_event(events).await {
            Event::StateSnapshot { status, .. } => {
                if let Some(prev) = last {
                    assert!(
                        status.remaining_secs <= prev,
                        "countdown went up: {prev} -> {}",
                        status.remaining_secs
                    );
                }
                last = Some(status.remaining_secs);
            }
            Event::PhaseCompleted {
                completed,
                next,
                cycle_count,
                ..
            } => {
                assert_eq!(last, Some(0), "phase completed before reaching zero");
                return (completed, next, cycle_count);
            }
            _ => {}
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_round_with_long_break() {
    let recorder = Arc::new(Recorder::default());
    let (handle, mut events) = TimerDriver::new(short_config())
        .notifier(recorder.clone())
        .spawn()
        .unwrap();

    handle.start().unwrap();
    assert!(matches!(
        next_event(&mut events).await,
        Event::TimerStarted {
            phase: Phase::Work,
            remaining_secs: 60,
            ..
        }
    ));

    let expected = [
        (Phase::Work, Phase::ShortBreak, 1, 60),
        (Phase::ShortBreak, Phase::Work, 1, 60),
        (Phase::Work, Phase::LongBreak, 2, 120),
        (Phase::LongBreak, Phase::Work, 0, 60),
        (Phase::Work, Phase::ShortBreak, 1, 60),
    ];
    for (completed, next, cycle_count, loaded) in expected {
        assert_eq!(
            next_completion(&mut events).await,
            (completed, next, cycle_count)
        );
        // The snapshot right after a transition shows the new phase, fully loaded.
        let status = next_status(&mut events).await;
        assert_eq!(status.phase, next);
        assert_eq!(status.remaining_secs, loaded);
        assert!(status.running);
    }

    assert_eq!(
        *recorder.notified.lock().unwrap(),
        vec![
            Phase::Work,
            Phase::ShortBreak,
            Phase::Work,
            Phase::LongBreak,
            Phase::Work
        ]
    );
    assert_eq!(*recorder.locks.lock().unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_one_decrement_per_second() {
    let (handle, mut events) = TimerDriver::new(short_config())
        .notifier(Arc::new(pomolock_core::NoopNotifier))
        .spawn()
        .unwrap();

    let begin = tokio::time::Instant::now();
    handle.start().unwrap();
    let first = next_status(&mut events).await;
    assert_eq!(first.remaining_secs, 60);

    next_completion(&mut events).await;
    let elapsed = begin.elapsed();
    assert!(
        elapsed >= Duration::from_secs(60) && elapsed < Duration::from_secs(61),
        "work phase took {elapsed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_lock_when_auto_lock_disabled() {
    let recorder = Arc::new(Recorder::default());
    let config = Config {
        auto_lock: false,
        ..short_config()
    };
    let (handle, mut events) = TimerDriver::new(config)
        .notifier(recorder.clone())
        .spawn()
        .unwrap();

    handle.start().unwrap();
    next_completion(&mut events).await;

    assert_eq!(*recorder.notified.lock().unwrap(), vec![Phase::Work]);
    assert_eq!(*recorder.locks.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_countdown() {
    let (handle, mut events) = TimerDriver::new(short_config())
        .notifier(Arc::new(pomolock_core::NoopNotifier))
        .spawn()
        .unwrap();

    handle.start().unwrap();
    while next_status(&mut events).await.remaining_secs > 57 {}

    handle.toggle_pause().unwrap();
    assert!(matches!(
        next_event(&mut events).await,
        Event::TimerPaused {
            remaining_secs: 57,
            ..
        }
    ));
    let paused = next_status(&mut events).await;
    assert!(paused.paused);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let status = handle.status();
    assert_eq!(status.remaining_secs, 57);
    assert_eq!(status.phase, Phase::Work);
    assert!(status.paused);

    handle.toggle_pause().unwrap();
    assert!(matches!(
        next_event(&mut events).await,
        Event::TimerResumed {
            remaining_secs: 57,
            ..
        }
    ));
    assert!(!next_status(&mut events).await.paused);
    assert_eq!(next_status(&mut events).await.remaining_secs, 56);
}

#[tokio::test(start_paused = true)]
async fn test_stop_resets_status() {
    let (handle, mut events) = TimerDriver::new(short_config())
        .notifier(Arc::new(pomolock_core::NoopNotifier))
        .spawn()
        .unwrap();

    handle.start().unwrap();
    next_completion(&mut events).await;
    next_status(&mut events).await;

    handle.stop().unwrap();
    loop {
        if matches!(next_event(&mut events).await, Event::TimerStopped { .. }) {
            break;
        }
    }
    let after_stop = next_status(&mut events).await;
    assert_eq!(after_stop, handle.status());
    assert_eq!(after_stop.phase, Phase::Work);
    assert_eq!(after_stop.cycle, 1);
    assert_eq!(after_stop.remaining_secs, 0);
    assert!(!after_stop.running);

    // A later start begins a fresh work phase.
    handle.start().unwrap();
    assert!(matches!(
        next_event(&mut events).await,
        Event::TimerStarted {
            phase: Phase::Work,
            remaining_secs: 60,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_toggle_starts_then_pauses() {
    let (handle, mut events) = TimerDriver::new(short_config())
        .notifier(Arc::new(pomolock_core::NoopNotifier))
        .spawn()
        .unwrap();

    handle.toggle().unwrap();
    assert!(next_status(&mut events).await.running);

    handle.toggle().unwrap();
    assert!(next_status(&mut events).await.paused);
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_toggles_start_then_pause() {
    let (handle, _events) = TimerDriver::new(short_config())
        .notifier(Arc::new(pomolock_core::NoopNotifier))
        .spawn()
        .unwrap();

    // Both sent before the driver task has run once.
    handle.toggle().unwrap();
    handle.toggle().unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let status = handle.status();
    assert!(status.running);
    assert!(status.paused);
    assert_eq!(status.remaining_secs, 60);
}

#[tokio::test(start_paused = true)]
async fn test_reconfigure_rejects_invalid_config() {
    let (handle, mut events) = TimerDriver::new(short_config())
        .notifier(Arc::new(pomolock_core::NoopNotifier))
        .spawn()
        .unwrap();

    let bad = Config {
        cycles: 0,
        ..short_config()
    };
    assert!(matches!(
        handle.reconfigure(bad),
        Err(CoreError::Validation(_))
    ));

    let good = Config {
        cycles: 6,
        ..short_config()
    };
    handle.reconfigure(good.clone()).unwrap();
    match next_event(&mut events).await {
        Event::ConfigChanged { config, .. } => assert_eq!(config, good),
        other => panic!("expected ConfigChanged, got {other:?}"),
    }
    assert_eq!(next_status(&mut events).await.total_cycles, 6);
}

#[tokio::test(start_paused = true)]
async fn test_spawn_rejects_invalid_config() {
    let bad = Config {
        work_time: 0,
        ..Config::default()
    };
    assert!(TimerDriver::new(bad).spawn().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_driver() {
    let (handle, _events) = TimerDriver::new(short_config())
        .notifier(Arc::new(pomolock_core::NoopNotifier))
        .spawn()
        .unwrap();

    handle.start().unwrap();
    handle.shutdown().unwrap();
    handle.join().await;

    assert!(matches!(handle.start(), Err(CoreError::DriverClosed)));
    assert!(!handle.status().running);
}

#[tokio::test(start_paused = true)]
async fn test_driver_runs_without_event_listener() {
    let (handle, events) = TimerDriver::new(short_config())
        .notifier(Arc::new(pomolock_core::NoopNotifier))
        .spawn()
        .unwrap();
    drop(events);

    handle.start().unwrap();
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(handle.status().remaining_secs, 55);
}
