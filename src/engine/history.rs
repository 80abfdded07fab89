use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::{ChipDelta, Chips};
use crate::domain::PlayerId;
use crate::engine::roulette::Bet;
use crate::engine::slots::Symbol;

/// Тип события в раунде.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundEventKind {
    /// Раунд начался с этим составом (в порядке входа).
    RoundStarted { players: Vec<PlayerId> },

    /// Карта сдана игроку (`None` – дилеру).
    CardDealt { player: Option<PlayerId>, card: Card },

    /// Стартовая рука дилера слишком сильная – карты вернули в колоду.
    DealerOpeningRedrawn { attempt: u32 },

    Hit { player: PlayerId, card: Card, score: u32 },

    Stood { player: PlayerId, score: u32 },

    Doubled { player: PlayerId, card: Card, wager: Chips },

    /// Добор дилера при расчёте.
    DealerDrew { card: Card, score: u32 },

    BetPlaced { player: PlayerId, bet: Bet },

    WheelSpun { number: u8 },

    ReelsMaterialized { reels: [[Symbol; 3]; 3] },

    LineRead { player: PlayerId, row: u8 },

    PlayerLeft { player: PlayerId },

    /// Итог игрока в раунде.
    Settled { player: PlayerId, net: ChipDelta },
}

/// Событие с порядковым номером.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundEvent {
    pub index: u32,
    pub kind: RoundEventKind,
}

/// Полная история раунда (для аудита и реплея).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundHistory {
    pub events: Vec<RoundEvent>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, kind: RoundEventKind) {
        let idx = self.events.len() as u32;
        self.events.push(RoundEvent { index: idx, kind });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
