//! End-to-end monitor sessions against a scripted status source, run on
//! paused time so interval-driven properties are deterministic.

mod support;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use fretwire_core::{
    JobMonitor, MonitorEvent, MonitorPolicy, Reconciled,
};
use fretwire_model::{
    JobHandle, JobScope, PartialSnapshot, SegmentStatus, SessionStatus,
};

use support::{PollStep, ScriptedApi, counters, make_course, make_segment};

#[tokio::test(start_paused = true)]
async fn single_segment_success_reconciles_the_full_record() {
    let segment = make_segment(SegmentStatus::Completed);
    let api = Arc::new(
        ScriptedApi::new(vec![
            PollStep::Ok(vec![counters(1, 0, 0, 0, 1, 0)]),
            PollStep::Ok(vec![counters(1, 1, 0, 0, 0, 0)]),
        ])
        .with_segment(segment.clone()),
    );

    let handle = JobHandle::single_segment(segment.id);
    let mut sub = JobMonitor::spawn(
        handle,
        api.clone(),
        MonitorPolicy::for_scope(JobScope::SingleSegment),
    );

    let first = sub.recv().await.expect("first progress");
    match first {
        MonitorEvent::Progress(snapshot) => {
            assert_eq!(snapshot.processing, 1);
            assert!(!snapshot.is_terminal());
        }
        other => panic!("expected progress, got {other:?}"),
    }

    match sub.recv().await.expect("second progress") {
        MonitorEvent::Progress(snapshot) => assert!(snapshot.is_terminal()),
        other => panic!("expected progress, got {other:?}"),
    }

    match sub.recv().await.expect("terminal") {
        MonitorEvent::Terminal { status, snapshot } => {
            assert_eq!(status, SessionStatus::CompletedSuccess);
            assert_eq!(snapshot.processed(), 1);
        }
        other => panic!("expected terminal, got {other:?}"),
    }

    match sub.recv().await.expect("reconciled") {
        MonitorEvent::Reconciled(Reconciled::Segment(record)) => {
            assert_eq!(record.id, segment.id);
            assert_eq!(record.status, SegmentStatus::Completed);
            assert!(record.transcript_url.is_some());
        }
        other => panic!("expected reconciled segment, got {other:?}"),
    }

    // Polling stopped: the stream closes, and no third poll happened.
    assert!(sub.recv().await.is_none());
    assert_eq!(api.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn bulk_stall_surfaces_on_the_fortieth_poll() {
    // 100 segments, 5 processing / 20 queued, and nothing ever moves.
    let api = Arc::new(
        ScriptedApi::new(vec![PollStep::Ok(vec![
            PartialSnapshot {
                total: Some(100),
                ..Default::default()
            },
            counters(100, 0, 0, 0, 5, 20),
        ])])
        .with_courses(vec![make_course("Blues Foundations")]),
    );

    let mut sub = JobMonitor::spawn(
        JobHandle::global_bulk(),
        api.clone(),
        MonitorPolicy::for_scope(JobScope::GlobalBulk),
    );

    let mut progress_events = 0u32;
    let terminal = loop {
        match sub.recv().await.expect("event stream ended early") {
            MonitorEvent::Progress(_) => progress_events += 1,
            MonitorEvent::Terminal { status, .. } => break status,
            other => panic!("unexpected event {other:?}"),
        }
    };

    // 40 consecutive no-progress polls (~120s at the 3s cadence), and
    // the stall is detected from the polls already made.
    assert_eq!(terminal, SessionStatus::StalledTimeout);
    assert_eq!(progress_events, 40);
    assert_eq!(api.polls(), 40);

    // Stall still reconciles the aggregate catalog view.
    match sub.recv().await.expect("reconciled") {
        MonitorEvent::Reconciled(Reconciled::Catalog(courses)) => {
            assert_eq!(courses.len(), 1);
        }
        other => panic!("expected reconciled catalog, got {other:?}"),
    }
    assert!(sub.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn persistent_poll_failure_escalates_to_error() {
    let api = Arc::new(ScriptedApi::new(vec![PollStep::Err(
        "connection refused".into(),
    )]));

    let mut sub = JobMonitor::spawn(
        JobHandle::single_segment(make_segment(SegmentStatus::Queued).id),
        api.clone(),
        MonitorPolicy::for_scope(JobScope::SingleSegment),
    );

    let mut poll_errors = 0u32;
    let terminal = loop {
        match sub.recv().await.expect("event stream ended early") {
            MonitorEvent::PollError { consecutive, .. } => {
                poll_errors += 1;
                assert_eq!(consecutive, poll_errors);
            }
            MonitorEvent::Terminal { status, .. } => break status,
            other => panic!("unexpected event {other:?}"),
        }
    };

    assert_eq!(terminal, SessionStatus::Error);
    assert_eq!(poll_errors, 10);
    assert_eq!(api.polls(), 10);
    // No reconciliation when the status source itself is unreachable.
    assert!(sub.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn late_response_after_stop_is_discarded() {
    let gate = Arc::new(Semaphore::new(1));
    let api = Arc::new(
        ScriptedApi::new(vec![PollStep::Ok(vec![counters(
            10, 1, 0, 0, 2, 7,
        )])])
        .with_gate(gate.clone()),
    );

    let mut sub = JobMonitor::spawn(
        JobHandle::global_bulk(),
        api.clone(),
        MonitorPolicy::for_scope(JobScope::GlobalBulk),
    );

    match sub.recv().await.expect("first progress") {
        MonitorEvent::Progress(snapshot) => {
            assert_eq!(snapshot.processed(), 1);
        }
        other => panic!("expected progress, got {other:?}"),
    }

    // Let the second poll start and block inside the request.
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(api.polls(), 2);

    // Stop while the request is in flight, then let it complete.
    sub.stop();
    assert!(sub.is_stopped());
    sub.stop(); // idempotent
    gate.add_permits(1);

    // The late response produced no event and no state change.
    assert!(sub.recv().await.is_none());
    assert_eq!(api.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn processed_counters_never_move_backward() {
    let api = Arc::new(
        ScriptedApi::new(vec![
            PollStep::Ok(vec![counters(10, 5, 0, 0, 2, 3)]),
            // The server briefly reports a regressed counter set.
            PollStep::Ok(vec![PartialSnapshot {
                succeeded: Some(3),
                ..Default::default()
            }]),
            PollStep::Ok(vec![counters(10, 10, 0, 0, 0, 0)]),
        ])
        .with_courses(vec![]),
    );

    let mut sub = JobMonitor::spawn(
        JobHandle::global_bulk(),
        api.clone(),
        MonitorPolicy::for_scope(JobScope::GlobalBulk),
    );

    let mut processed_seen = Vec::new();
    let terminal = loop {
        match sub.recv().await.expect("event stream ended early") {
            MonitorEvent::Progress(snapshot) => {
                processed_seen.push(snapshot.processed());
            }
            MonitorEvent::Terminal { status, .. } => break status,
            other => panic!("unexpected event {other:?}"),
        }
    };

    assert_eq!(terminal, SessionStatus::CompletedSuccess);
    assert_eq!(processed_seen, vec![5, 5, 10]);
    assert!(processed_seen.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn bulk_absolute_timeout_fires() {
    let api = Arc::new(
        ScriptedApi::new(vec![PollStep::Ok(vec![counters(
            100, 1, 0, 0, 5, 94,
        )])])
        .with_courses(vec![make_course("Jazz Comping")]),
    );

    let mut policy = MonitorPolicy::for_scope(JobScope::GlobalBulk);
    policy.absolute_timeout = Some(Duration::from_secs(10));

    let mut sub =
        JobMonitor::spawn(JobHandle::global_bulk(), api.clone(), policy);

    let terminal = loop {
        match sub.recv().await.expect("event stream ended early") {
            MonitorEvent::Progress(_) => {}
            MonitorEvent::Terminal { status, .. } => break status,
            other => panic!("unexpected event {other:?}"),
        }
    };

    // Ticks land at 0/3/6/9/12s; 12s is past the 10s ceiling.
    assert_eq!(terminal, SessionStatus::AbsoluteTimeout);
    assert_eq!(api.polls(), 5);
    assert!(matches!(
        sub.recv().await,
        Some(MonitorEvent::Reconciled(Reconciled::Catalog(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn reconciliation_failure_is_reported_distinctly() {
    // Terminal snapshot on the first poll, but no segment scripted:
    // the authoritative refetch fails.
    let api = Arc::new(ScriptedApi::new(vec![PollStep::Ok(vec![counters(
        1, 1, 0, 0, 0, 0,
    )])]));

    let mut sub = JobMonitor::spawn(
        JobHandle::single_segment(make_segment(SegmentStatus::Queued).id),
        api.clone(),
        MonitorPolicy::for_scope(JobScope::SingleSegment),
    );

    assert!(matches!(
        sub.recv().await,
        Some(MonitorEvent::Progress(_))
    ));
    assert!(matches!(
        sub.recv().await,
        Some(MonitorEvent::Terminal {
            status: SessionStatus::CompletedSuccess,
            ..
        })
    ));
    match sub.recv().await.expect("reconcile failure") {
        MonitorEvent::ReconcileFailed { message } => {
            assert!(message.contains("no segment scripted"));
        }
        other => panic!("expected reconcile failure, got {other:?}"),
    }
    assert!(sub.recv().await.is_none());
}
