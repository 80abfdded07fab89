use serde::{Deserialize, Serialize};

use crate::domain::GameKind;
use crate::engine::roulette::Bet;

/// Действия в блэкджеке.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlackjackAction {
    Hit,
    Stand,
    /// Удвоить ставку: ровно одна карта и stand.
    Double,
}

/// Действия в рулетке.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RouletteAction {
    PlaceBet(Bet),
    Spin,
}

/// Действия в слотах.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SlotsAction {
    Spin,
}

/// Действие игрока внутри сессии. Набор закрытый, матчится исчерпывающе.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameAction {
    Blackjack(BlackjackAction),
    Roulette(RouletteAction),
    Slots(SlotsAction),
}

impl GameAction {
    /// Для какой игры предназначено действие.
    pub fn game(&self) -> GameKind {
        match self {
            GameAction::Blackjack(_) => GameKind::Blackjack,
            GameAction::Roulette(_) => GameKind::Roulette,
            GameAction::Slots(_) => GameKind::Slots,
        }
    }
}
