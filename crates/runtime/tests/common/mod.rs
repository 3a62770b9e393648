#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::{broadcast, mpsc};

use game_core::{
    CardCatalog, CardDefinition, CardId, Element, GameConfig, GameSession, Kind, PlayerId,
    PlayerProfile, SessionInfo, Stars, TargetType,
};
use runtime::protocol::{GameStatus, OpponentState};
use runtime::{
    ClientAction, Cue, Event, EventKind, Presenter, QueueEvent, Runtime, RuntimeConfig,
    RuntimeHandle,
};

pub const LOCAL: PlayerId = PlayerId(1);
pub const OPPONENT_A: PlayerId = PlayerId(2);
pub const OPPONENT_B: PlayerId = PlayerId(3);

/// Sixteen cards: even ids attack a single target, odd ids heal.
pub fn catalog() -> Arc<CardCatalog> {
    let cards = (0..16)
        .map(|id| CardDefinition {
            name: format!("Card {id}"),
            element: Element::Fire,
            kind: Kind::Spell,
            stars: Stars::One,
            desc: String::new(),
            attack: if id % 2 == 0 { 3 } else { 0 },
            heal: if id % 2 == 1 { 3 } else { 0 },
            draw: 0,
            targets: Some(TargetType::Single),
        })
        .collect();
    Arc::new(CardCatalog::new(cards))
}

pub fn session_info() -> SessionInfo {
    let profile = |id: PlayerId, name: &str| PlayerProfile {
        id,
        name: name.to_owned(),
    };
    SessionInfo {
        id: LOCAL,
        players: vec![
            profile(LOCAL, "local"),
            profile(OPPONENT_A, "alice"),
            profile(OPPONENT_B, "bob"),
        ],
    }
}

pub fn session() -> GameSession {
    GameSession::new(&session_info(), catalog(), GameConfig::default()).expect("valid roster")
}

/// Snapshot where opponents hold five cards and 20 health.
pub fn status(turn: PlayerId, hand: &[i32], discard: &[i32]) -> GameStatus {
    let opponent = |player_id| OpponentState {
        player_id,
        health: 20,
        card_count: 5,
        discard_cards: Vec::new(),
        buffs: Vec::new(),
    };
    GameStatus {
        current_player_turn: turn,
        current_player_turn_end: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        health: 20,
        cards: hand.iter().copied().map(CardId).collect(),
        discard_cards: discard.iter().copied().map(CardId).collect(),
        opponents: vec![opponent(OPPONENT_A), opponent(OPPONENT_B)],
        cards_in_pile: 30,
        buffs: Vec::new(),
    }
}

/// Presenter that records every cue. Dice rolls take `dice_time`.
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    cues: Arc<Mutex<Vec<Cue>>>,
    dice_time: Duration,
}

impl RecordingPresenter {
    pub fn with_dice_time(dice_time: Duration) -> Self {
        Self {
            dice_time,
            ..Self::default()
        }
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().unwrap().clone()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn play(&self, cue: Cue) {
        let is_dice = matches!(cue, Cue::DiceRoll { .. });
        self.cues.lock().unwrap().push(cue);
        if is_dice {
            tokio::time::sleep(self.dice_time).await;
        }
    }
}

pub async fn start(presenter: RecordingPresenter) -> (Runtime, mpsc::UnboundedReceiver<ClientAction>) {
    Runtime::builder()
        .config(RuntimeConfig::default())
        .session(session())
        .presenter(presenter)
        .build()
        .await
        .expect("runtime builds")
}

/// Waits until every queued event has completed.
pub async fn settle(handle: &RuntimeHandle) {
    while handle.is_draining() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Collects the next `n` queue events.
pub async fn next_queue_events(rx: &mut broadcast::Receiver<Event>, n: usize) -> Vec<QueueEvent> {
    let mut events = Vec::with_capacity(n);
    while events.len() < n {
        match rx.recv().await.expect("queue topic open") {
            Event::Queue(event) => events.push(event),
            Event::Model(_) => {}
        }
    }
    events
}

pub fn started_kinds(events: &[QueueEvent]) -> Vec<EventKind> {
    events
        .iter()
        .filter_map(|event| match event {
            QueueEvent::Started { kind, .. } => Some(*kind),
            QueueEvent::Completed { .. } => None,
        })
        .collect()
}
