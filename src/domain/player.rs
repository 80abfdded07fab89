use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::hand::Hand;
use crate::domain::PlayerId;

/// Базовый профиль игрока – то, что не зависит от конкретной сессии.
/// Внутреннюю структуру `id` движок не интерпретирует.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
}

impl PlayerProfile {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Участник раунда блэкджека.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub player_id: PlayerId,
    pub name: String,
    /// Текущая ставка (после double - уже удвоенная).
    pub wager: Chips,
    pub hand: Hand,
    /// Игрок больше ничего не делает в этом раунде.
    pub is_standing: bool,
    pub is_doubled: bool,
}

impl Participant {
    pub fn new(profile: &PlayerProfile, wager: Chips) -> Self {
        Self {
            player_id: profile.id,
            name: profile.name.clone(),
            wager,
            hand: Hand::new(),
            is_standing: false,
            is_doubled: false,
        }
    }

    pub fn score(&self) -> u32 {
        self.hand.score()
    }
}
