use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Максимальный размер комнаты.
pub const MAX_ROOM_CAPACITY: u8 = 6;
/// Минимальный размер комнаты (комната на одного - это уже Solo).
pub const MIN_ROOM_CAPACITY: u8 = 2;

/// Вид игры.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Blackjack,
    Roulette,
    Slots,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Blackjack, GameKind::Roulette, GameKind::Slots];

    /// Метка игры для записей леджера.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Blackjack => "blackjack",
            GameKind::Roulette => "roulette",
            GameKind::Slots => "slots",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blackjack" | "bj" => Ok(GameKind::Blackjack),
            "roulette" | "rl" => Ok(GameKind::Roulette),
            "slots" | "sl" => Ok(GameKind::Slots),
            other => Err(format!("Unknown game: {other}")),
        }
    }
}

/// Идентификатор комнаты. Вместимость зашита в сам идентификатор:
/// текстовая форма `room_<номер>_<вместимость>`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId {
    pub number: u32,
    pub capacity: u8,
}

impl RoomId {
    pub const fn new(number: u32, capacity: u8) -> Self {
        Self { number, capacity }
    }

    pub fn is_valid(&self) -> bool {
        (MIN_ROOM_CAPACITY..=MAX_ROOM_CAPACITY).contains(&self.capacity)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room_{}_{}", self.number, self.capacity)
    }
}

impl FromStr for RoomId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('_');
        let (Some("room"), Some(number), Some(capacity), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("Room id must look like room_<n>_<capacity>, got {s}"));
        };

        let number = number
            .parse::<u32>()
            .map_err(|_| format!("Invalid room number: {number}"))?;
        let capacity = capacity
            .parse::<u8>()
            .map_err(|_| format!("Invalid room capacity: {capacity}"))?;

        let room = RoomId::new(number, capacity);
        if !room.is_valid() {
            return Err(format!(
                "Room capacity must be in {MIN_ROOM_CAPACITY}..={MAX_ROOM_CAPACITY}, got {capacity}"
            ));
        }
        Ok(room)
    }
}

/// Режим сессии.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Один игрок против казино.
    Solo,
    /// Комната: стартует только при полном составе.
    Room(RoomId),
}

impl SessionMode {
    /// Вместимость сессии. В комнате она же - минимум для старта.
    pub fn capacity(&self) -> u8 {
        match self {
            SessionMode::Solo => 1,
            SessionMode::Room(room) => room.capacity,
        }
    }

    pub fn min_players(&self) -> usize {
        self.capacity() as usize
    }

    pub fn room(&self) -> Option<RoomId> {
        match self {
            SessionMode::Solo => None,
            SessionMode::Room(room) => Some(*room),
        }
    }

    pub fn is_room(&self) -> bool {
        matches!(self, SessionMode::Room(_))
    }
}

/// Жизненный цикл раунда.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundState {
    WaitingForPlayers,
    InProgress,
    Complete,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundState::WaitingForPlayers => "waiting",
            RoundState::InProgress => "in progress",
            RoundState::Complete => "complete",
        };
        f.write_str(s)
    }
}
