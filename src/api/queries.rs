use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::session::GameKind;
use crate::domain::PlayerId;

use super::dto::{RoomInfo, SessionSnapshot};

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Query {
    /// Снимок сессии, в которой сидит игрок.
    Session { player: PlayerId },

    /// Баланс игрока в леджере.
    Balance { player: PlayerId },

    /// Комнаты игры с текущей занятостью.
    Rooms { kind: GameKind },
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryResponse {
    /// `None`, если игрок сейчас ни в одной сессии.
    Session(Option<SessionSnapshot>),
    Balance(Chips),
    Rooms(Vec<RoomInfo>),
}
