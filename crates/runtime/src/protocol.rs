//! JSON messages exchanged with the game server.
//!
//! Every frame is a JSON object whose `"type"` field names the variant.
//! Server messages are decoded into [`ServerMessage`]; the client only ever
//! sends [`ClientAction`]s.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use game_core::{Buff, CardId, PlayerId, SessionInfo};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to decode server message")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode client action")]
    Encode(#[source] serde_json::Error),
}

/// Messages pushed by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Chat line.
    Message { message: String },
    /// Sent once when the connection is accepted.
    SessionInfo(SessionInfo),
    /// Full snapshot personalised for this client.
    GameStatus(GameStatus),
    PlayCard(PlayCard),
    /// `card_id` is [`CardId::UNKNOWN`] when an opponent draws.
    DrawCard {
        player_id: PlayerId,
        card_id: CardId,
    },
    ChangeTurn {
        player_id: Option<PlayerId>,
        #[serde(default, with = "chrono::serde::ts_seconds_option")]
        turn_end: Option<DateTime<Utc>>,
    },
    PlayerBuffStatus {
        player_id: PlayerId,
        buffs: Vec<Buff>,
    },
    /// Every discard pile is shuffled back into the draw pile.
    CollectDiscardCards { cards_in_pile: u32 },
    GameEnd {
        #[serde(default)]
        winner_id: Option<PlayerId>,
    },
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }

    /// Variant name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "Message",
            Self::SessionInfo(_) => "SessionInfo",
            Self::GameStatus(_) => "GameStatus",
            Self::PlayCard(_) => "PlayCard",
            Self::DrawCard { .. } => "DrawCard",
            Self::ChangeTurn { .. } => "ChangeTurn",
            Self::PlayerBuffStatus { .. } => "PlayerBuffStatus",
            Self::CollectDiscardCards { .. } => "CollectDiscardCards",
            Self::GameEnd { .. } => "GameEnd",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub current_player_turn: PlayerId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub current_player_turn_end: DateTime<Utc>,
    pub health: u32,
    pub cards: Vec<CardId>,
    pub discard_cards: Vec<CardId>,
    pub opponents: Vec<OpponentState>,
    pub cards_in_pile: u32,
    #[serde(default)]
    pub buffs: Vec<Buff>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentState {
    pub player_id: PlayerId,
    pub health: u32,
    pub card_count: u32,
    pub discard_cards: Vec<CardId>,
    #[serde(default)]
    pub buffs: Vec<Buff>,
}

/// A resolved card play, with every effect already decided by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCard {
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub hand_index: usize,
    pub actions: Vec<PlayAction>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayAction {
    /// Zero when no dice was thrown for this action.
    #[serde(default)]
    pub dice_roll: u8,
    /// Who threw the dice. Defaults to the card's owner.
    #[serde(default)]
    pub player_dice_id: Option<PlayerId>,
    pub targets: Vec<ActionTarget>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTarget {
    pub player_id: PlayerId,
    pub action: ActionType,
    #[serde(default)]
    pub effect: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionType {
    Attack { amount: u32 },
    Heal { amount: u32 },
    Draw { cards: Vec<CardId> },
    /// Hand indices, relative to the hand before any of them is removed.
    Discard { cards: Vec<usize> },
    /// Action kinds this client does not know how to show.
    #[serde(other)]
    Unsupported,
}

/// Messages sent by the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientAction {
    PlayCard {
        card_index: usize,
        targets: Vec<PlayerId>,
    },
    DrawCard {},
    SendChatMessage { message: String },
}

impl ClientAction {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_play_card_with_nested_actions() {
        let text = r#"{
            "type": "PlayCard", "player_id": 2, "card_id": 7, "hand_index": 1,
            "actions": [
                {"dice_roll": 4, "targets": [
                    {"player_id": 1, "action": {"type": "Attack", "amount": 3}, "effect": "burn"}
                ]},
                {"dice_roll": 0, "targets": [
                    {"player_id": 2, "action": {"type": "Discard", "cards": [0, 2]}}
                ]}
            ]
        }"#;

        let ServerMessage::PlayCard(play) = ServerMessage::decode(text).unwrap() else {
            panic!("expected PlayCard");
        };

        assert_eq!(play.player_id, PlayerId(2));
        assert_eq!(play.actions.len(), 2);
        assert_eq!(play.actions[0].player_dice_id, None);
        assert_eq!(play.actions[0].targets[0].action, ActionType::Attack { amount: 3 });
        assert_eq!(
            play.actions[1].targets[0].action,
            ActionType::Discard { cards: vec![0, 2] }
        );
    }

    #[test]
    fn unknown_action_type_is_tolerated() {
        let text = r#"{"player_id": 1, "action": {"type": "Shield", "amount": 2}}"#;

        let target: ActionTarget = serde_json::from_str(text).unwrap();

        assert_eq!(target.action, ActionType::Unsupported);
    }

    #[test]
    fn decodes_turn_deadline_as_unix_seconds() {
        let text = r#"{"type": "ChangeTurn", "player_id": 3, "turn_end": 1700000000}"#;

        let message = ServerMessage::decode(text).unwrap();

        let ServerMessage::ChangeTurn { player_id, turn_end } = message else {
            panic!("expected ChangeTurn");
        };
        assert_eq!(player_id, Some(PlayerId(3)));
        assert_eq!(turn_end.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn decodes_session_info_and_game_end_without_winner() {
        let info = ServerMessage::decode(
            r#"{"type": "SessionInfo", "id": 1, "players": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}"#,
        )
        .unwrap();
        assert!(matches!(info, ServerMessage::SessionInfo(ref s) if s.players.len() == 2));

        let end = ServerMessage::decode(r#"{"type": "GameEnd"}"#).unwrap();
        assert_eq!(end, ServerMessage::GameEnd { winner_id: None });
    }

    #[test]
    fn unknown_message_type_is_an_error() {
        assert!(matches!(
            ServerMessage::decode(r#"{"type": "Teleport"}"#),
            Err(ProtocolError::Decode(_))
        ));
        assert!(ServerMessage::decode("not json").is_err());
    }

    #[test]
    fn encodes_client_actions_with_type_tag() {
        let play = ClientAction::PlayCard {
            card_index: 2,
            targets: vec![PlayerId(4)],
        };

        assert_eq!(
            play.encode().unwrap(),
            r#"{"type":"PlayCard","card_index":2,"targets":[4]}"#
        );
        assert_eq!(
            ClientAction::DrawCard {}.encode().unwrap(),
            r#"{"type":"DrawCard"}"#
        );
    }
}
