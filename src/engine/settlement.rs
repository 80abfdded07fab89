use serde::{Deserialize, Serialize};

use crate::domain::chips::{ChipDelta, Chips};
use crate::domain::{GameKind, PlayerId};
use crate::engine::blackjack::BlackjackOutcome;
use crate::engine::slots::Symbol;

/// Чем закончился раунд для конкретного игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Blackjack(BlackjackOutcome),
    Roulette { winning_bets: usize, losing_bets: usize },
    Slots { line: [Symbol; 3], multiplier: u64 },
}

impl Outcome {
    /// Короткая подпись для отчёта о раунде.
    pub fn label(&self) -> String {
        match self {
            Outcome::Blackjack(o) => match o {
                BlackjackOutcome::Natural => "blackjack".into(),
                BlackjackOutcome::BothBust => "both bust".into(),
                BlackjackOutcome::Bust => "bust".into(),
                BlackjackOutcome::DealerBust => "dealer bust".into(),
                BlackjackOutcome::Win => "win".into(),
                BlackjackOutcome::Lose => "lose".into(),
                BlackjackOutcome::Push => "push".into(),
            },
            Outcome::Roulette {
                winning_bets,
                losing_bets,
            } => format!("{winning_bets} won / {losing_bets} lost"),
            Outcome::Slots { line, multiplier } => {
                format!("{}{}{} x{multiplier}", line[0], line[1], line[2])
            }
        }
    }
}

/// Строка расчёта одного игрока.
///
/// `net` – чистый результат (без возврата ставки). Ставка уже списана
/// при входе/ставке, поэтому к зачислению идёт `stake + net`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementLine {
    pub player_id: PlayerId,
    pub name: String,
    /// Сколько игрок поставил в этом раунде (уже списано).
    pub stake: Chips,
    pub net: ChipDelta,
    pub outcome: Outcome,
}

impl SettlementLine {
    /// Сумма к зачислению в леджер: возврат ставки плюс чистый результат.
    pub fn credit(&self) -> ChipDelta {
        (self.stake.as_delta() + self.net).max(0)
    }
}

/// Расчёт раунда целиком.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settlement {
    pub game: GameKind,
    pub lines: Vec<SettlementLine>,
}

impl Settlement {
    pub fn line(&self, player_id: PlayerId) -> Option<&SettlementLine> {
        self.lines.iter().find(|l| l.player_id == player_id)
    }

    /// Чистый результат игрока (0, если его нет в расчёте).
    pub fn net_for(&self, player_id: PlayerId) -> ChipDelta {
        self.line(player_id).map(|l| l.net).unwrap_or(0)
    }
}
