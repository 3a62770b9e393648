mod common;

use std::time::Duration;

use async_trait::async_trait;
use common::*;
use runtime::{Cue, EventKind, PresentationEvent, Presenter, QueueEvent, Runtime, Topic};

fn damage(amount: u32) -> PresentationEvent {
    PresentationEvent::DamagePlayer {
        target: OPPONENT_A,
        amount,
    }
}

#[tokio::test(start_paused = true)]
async fn events_run_once_in_push_order_without_overlap() {
    let (runtime, _outbound) = start(RecordingPresenter::default()).await;
    let handle = runtime.handle();
    let mut queue_rx = handle.subscribe(Topic::Queue);

    for amount in 1..=4 {
        handle.push(damage(amount)).unwrap();
    }
    let events = next_queue_events(&mut queue_rx, 8).await;

    for (index, pair) in events.chunks(2).enumerate() {
        let seq = index as u64;
        assert!(matches!(pair[0], QueueEvent::Started { seq: s, .. } if s == seq));
        match pair[1] {
            QueueEvent::Completed {
                seq: s, elapsed, ..
            } => {
                assert_eq!(s, seq);
                assert!(elapsed >= Duration::from_millis(250));
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    settle(&handle).await;
    let session = handle.query_session().await.unwrap();
    assert_eq!(session.participant(OPPONENT_A).unwrap().health, 100 - 10);
}

#[tokio::test(start_paused = true)]
async fn batch_is_never_interleaved() {
    let (runtime, _outbound) = start(RecordingPresenter::default()).await;
    let handle = runtime.handle();
    let other_caller = handle.clone();
    let mut queue_rx = handle.subscribe(Topic::Queue);

    handle
        .push_many(vec![
            damage(1),
            PresentationEvent::HealPlayer {
                target: OPPONENT_A,
                amount: 1,
            },
            PresentationEvent::DrawCard {
                player: OPPONENT_B,
                card: game_core::CardId::UNKNOWN,
            },
        ])
        .unwrap();
    tokio::spawn(async move {
        other_caller
            .push(PresentationEvent::ChangeTurn {
                player: Some(OPPONENT_B),
                turn_end: None,
            })
            .unwrap();
    })
    .await
    .unwrap();

    let events = next_queue_events(&mut queue_rx, 8).await;
    assert_eq!(
        started_kinds(&events),
        vec![
            EventKind::DamagePlayer,
            EventKind::HealPlayer,
            EventKind::DrawCard,
            EventKind::ChangeTurn
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn size_counts_running_and_queued_events() {
    let (runtime, _outbound) = start(RecordingPresenter::default()).await;
    let handle = runtime.handle();

    assert_eq!(handle.size(), 0);
    assert!(!handle.is_draining());

    handle.push_many(vec![damage(1), damage(2), damage(3)]).unwrap();
    assert_eq!(handle.size(), 3);
    assert!(handle.is_draining());

    tokio::time::sleep(Duration::from_millis(260)).await;
    assert_eq!(handle.size(), 2);

    settle(&handle).await;
    assert_eq!(handle.size(), 0);
}

#[tokio::test(start_paused = true)]
async fn explicit_completion_waits_for_the_dice() {
    let presenter = RecordingPresenter::with_dice_time(Duration::from_secs(2));
    let (runtime, _outbound) = start(presenter.clone()).await;
    let handle = runtime.handle();
    let mut queue_rx = handle.subscribe(Topic::Queue);

    handle
        .push_many(vec![
            PresentationEvent::ThrowDice {
                player: OPPONENT_A,
                result: 4,
            },
            damage(1),
        ])
        .unwrap();

    let events = next_queue_events(&mut queue_rx, 3).await;
    match events[1] {
        QueueEvent::Completed { kind, elapsed, .. } => {
            assert_eq!(kind, EventKind::ThrowDice);
            assert!(elapsed >= Duration::from_secs(2));
        }
        other => panic!("expected dice completion, got {other:?}"),
    }
    assert_eq!(events[2].kind(), EventKind::DamagePlayer);
    assert!(presenter.cues().contains(&runtime::Cue::DiceRoll {
        player: OPPONENT_A,
        result: 4
    }));
}

#[tokio::test(start_paused = true)]
async fn session_is_queryable_while_an_event_runs() {
    let (runtime, _outbound) = start(RecordingPresenter::default()).await;
    let handle = runtime.handle();
    let mut queue_rx = handle.subscribe(Topic::Queue);

    handle.push(damage(7)).unwrap();
    let started = next_queue_events(&mut queue_rx, 1).await;
    assert!(matches!(started[0], QueueEvent::Started { .. }));

    let session = handle.query_session().await.unwrap();
    assert_eq!(session.participant(OPPONENT_A).unwrap().health, 93);
    assert!(handle.is_draining());
}

#[tokio::test(start_paused = true)]
async fn shutdown_drains_queued_events() {
    let (runtime, _outbound) = start(RecordingPresenter::default()).await;
    let handle = runtime.handle();

    handle.push_many(vec![damage(5), damage(5)]).unwrap();
    let session = runtime.shutdown().await.unwrap();

    assert_eq!(session.participant(OPPONENT_A).unwrap().health, 90);
    assert!(handle.push(damage(1)).is_err());
}

#[tokio::test(start_paused = true)]
async fn push_after_shutdown_request_is_refused() {
    let (runtime, _outbound) = start(RecordingPresenter::default()).await;
    let handle = runtime.handle();
    let late_caller = handle.clone();

    handle.push(damage(5)).unwrap();
    let shutdown = tokio::spawn(runtime.shutdown());
    tokio::time::sleep(Duration::from_millis(10)).await;

    let late = late_caller.push(damage(7));
    assert!(matches!(late, Err(runtime::RuntimeError::QueueClosed)));
    assert_eq!(late_caller.size(), 1);

    let session = shutdown.await.unwrap().unwrap();
    assert_eq!(session.participant(OPPONENT_A).unwrap().health, 95);
    assert_eq!(late_caller.size(), 0);
    assert!(!late_caller.is_draining());
}

/// Fails every dice animation.
struct BrokenDice;

#[async_trait]
impl Presenter for BrokenDice {
    async fn play(&self, cue: Cue) {
        if matches!(cue, Cue::DiceRoll { .. }) {
            panic!("dice animation failed");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn failed_dice_animation_still_completes() {
    let (runtime, _outbound) = Runtime::builder()
        .session(session())
        .presenter(BrokenDice)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut queue_rx = handle.subscribe(Topic::Queue);

    handle
        .push_many(vec![
            PresentationEvent::ThrowDice {
                player: OPPONENT_A,
                result: 6,
            },
            damage(2),
        ])
        .unwrap();

    let events = next_queue_events(&mut queue_rx, 4).await;
    assert!(matches!(
        events[1],
        QueueEvent::Completed {
            kind: EventKind::ThrowDice,
            ..
        }
    ));
    assert_eq!(events[3].kind(), EventKind::DamagePlayer);

    settle(&handle).await;
    let session = handle.query_session().await.unwrap();
    assert_eq!(session.participant(OPPONENT_A).unwrap().health, 98);
}
