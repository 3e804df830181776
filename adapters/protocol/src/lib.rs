#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Line-oriented JSON codec spoken with the game server.
//!
//! Every inbound line is one JSON object `{"type": ..., "params": {...}}`;
//! every reply is one JSON object `{"command": ..., "debug": ...}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use trailrunner_core::{
    ActiveBonus, BonusKind, BonusSnapshot, Decision, Direction, GridConfig, PixelPoint, PlayerId,
    PlayerSnapshot, TickSnapshot,
};

/// Player key the server uses for the controlled agent.
pub const CONTROLLED_KEY: &str = "i";

/// Message received from the game server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// Match parameters, sent once before the first tick.
    StartGame(GridConfig),
    /// State of the world at the start of a tick.
    Tick(TickSnapshot),
    /// The match is over.
    EndGame,
}

/// Errors raised while decoding or encoding protocol lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line was not valid JSON or did not match the expected shape.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    /// The `type` field named a message this bot does not understand.
    #[error("unknown message type `{0}`")]
    UnknownMessage(String),
    /// A player key was neither the controlled key nor a positive number.
    #[error("unknown player key `{0}`")]
    UnknownPlayer(String),
    /// A heading token was not one of the four directions.
    #[error("unknown direction `{0}`")]
    UnknownDirection(String),
    /// A bonus token was not one of the known bonus kinds.
    #[error("unknown bonus kind `{0}`")]
    UnknownBonus(String),
    /// A tick did not report the controlled agent.
    #[error("tick {0} does not include the controlled player")]
    MissingControlledPlayer(u32),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    params: Value,
}

#[derive(Deserialize)]
struct StartParams {
    x_cells_count: u32,
    y_cells_count: u32,
    speed: u32,
    width: u32,
}

#[derive(Deserialize)]
struct TickParams {
    players: BTreeMap<String, WirePlayer>,
    #[serde(default)]
    bonuses: Vec<WireBonus>,
    tick_num: u32,
}

#[derive(Deserialize)]
struct WirePlayer {
    #[serde(default)]
    score: u32,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    territory: Vec<[i32; 2]>,
    #[serde(default)]
    lines: Vec<[i32; 2]>,
    position: [i32; 2],
    #[serde(default)]
    bonuses: Vec<WireActiveBonus>,
}

#[derive(Deserialize)]
struct WireBonus {
    #[serde(rename = "type")]
    kind: String,
    position: [i32; 2],
}

#[derive(Deserialize)]
struct WireActiveBonus {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    ticks: u32,
}

#[derive(Serialize)]
struct Reply<'a> {
    command: &'static str,
    debug: &'a str,
}

/// Decodes one inbound protocol line.
pub fn decode(line: &str) -> Result<Message, ProtocolError> {
    let envelope: Envelope = serde_json::from_str(line.trim())?;
    match envelope.kind.as_str() {
        "start_game" => {
            let params: StartParams = serde_json::from_value(envelope.params)?;
            Ok(Message::StartGame(GridConfig::new(
                params.x_cells_count,
                params.y_cells_count,
                params.speed,
                params.width,
            )))
        }
        "tick" => {
            let params: TickParams = serde_json::from_value(envelope.params)?;
            decode_tick(params).map(Message::Tick)
        }
        "end_game" => Ok(Message::EndGame),
        other => Err(ProtocolError::UnknownMessage(other.to_owned())),
    }
}

/// Encodes a decision as the single-line reply the server expects.
pub fn encode_decision(decision: &Decision) -> Result<String, ProtocolError> {
    let reply = Reply {
        command: decision.direction.as_str(),
        debug: &decision.note,
    };
    Ok(serde_json::to_string(&reply)?)
}

fn decode_tick(params: TickParams) -> Result<TickSnapshot, ProtocolError> {
    if !params.players.contains_key(CONTROLLED_KEY) {
        return Err(ProtocolError::MissingControlledPlayer(params.tick_num));
    }

    let players = params
        .players
        .into_iter()
        .map(|(key, player)| decode_player(&key, player))
        .collect::<Result<Vec<_>, _>>()?;
    let bonuses = params
        .bonuses
        .into_iter()
        .map(|bonus| {
            Ok(BonusSnapshot {
                kind: decode_bonus_kind(&bonus.kind)?,
                position: point(bonus.position),
            })
        })
        .collect::<Result<Vec<_>, ProtocolError>>()?;

    Ok(TickSnapshot::new(params.tick_num, players, bonuses))
}

fn decode_player(key: &str, player: WirePlayer) -> Result<PlayerSnapshot, ProtocolError> {
    let heading = match player.direction.as_deref() {
        None | Some("") => None,
        Some(token) => Some(decode_direction(token)?),
    };
    let bonuses = player
        .bonuses
        .iter()
        .map(|bonus| {
            Ok(ActiveBonus {
                kind: decode_bonus_kind(&bonus.kind)?,
                ticks: bonus.ticks,
            })
        })
        .collect::<Result<Vec<_>, ProtocolError>>()?;

    Ok(PlayerSnapshot {
        id: decode_player_id(key)?,
        position: point(player.position),
        heading,
        trail: player.lines.into_iter().map(point).collect(),
        territory: player.territory.into_iter().map(point).collect(),
        score: player.score,
        bonuses,
    })
}

/// Numeric keys start at one; zero is reserved for the controlled agent.
fn decode_player_id(key: &str) -> Result<PlayerId, ProtocolError> {
    if key == CONTROLLED_KEY {
        return Ok(PlayerId::CONTROLLED);
    }
    match key.parse::<u32>() {
        Ok(value) if value != PlayerId::CONTROLLED.get() => Ok(PlayerId::new(value)),
        _ => Err(ProtocolError::UnknownPlayer(key.to_owned())),
    }
}

fn decode_direction(token: &str) -> Result<Direction, ProtocolError> {
    Direction::ALL
        .into_iter()
        .find(|direction| direction.as_str() == token)
        .ok_or_else(|| ProtocolError::UnknownDirection(token.to_owned()))
}

fn decode_bonus_kind(token: &str) -> Result<BonusKind, ProtocolError> {
    match token {
        "n" => Ok(BonusKind::Nitro),
        "s" => Ok(BonusKind::Slow),
        "saw" => Ok(BonusKind::Saw),
        other => Err(ProtocolError::UnknownBonus(other.to_owned())),
    }
}

fn point([x, y]: [i32; 2]) -> PixelPoint {
    PixelPoint::new(x, y)
}
