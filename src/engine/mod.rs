//! Игровые движки казино: блэкджек (пошаговый), рулетка и слоты (один спин).
//!
//! Движки чистые: никаких логов, леджера и блокировок внутри.
//! Высокоуровневые объекты:
//!   - `BlackjackGame` – машина состояний раунда с очередностью ходов;
//!   - `RouletteGame` – ставки нескольких игроков против одного спина;
//!   - `SlotsGame` – общие барабаны раунда и по линии на игрока.

pub mod actions;
pub mod blackjack;
pub mod errors;
pub mod history;
pub mod roulette;
pub mod settlement;
pub mod slots;

pub use actions::{BlackjackAction, GameAction, RouletteAction, SlotsAction};
pub use blackjack::{resolve_hand, ActionOutcome, BlackjackGame, BlackjackOutcome};
pub use errors::{ErrorKind, GameError};
pub use history::{RoundEvent, RoundEventKind, RoundHistory};
pub use roulette::{Bet, BetKind, BetTarget, Color, Parity, RouletteGame, Third};
pub use settlement::{Outcome, Settlement, SettlementLine};
pub use slots::{SlotsGame, SlotsSpin, Symbol};

/// RNG интерфейс для движков.
/// Реализации лежат в infra (обёртки над `rand`).
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);

    /// Равномерное целое из `[low, high]` включительно.
    fn gen_range(&mut self, low: u32, high: u32) -> u32;
}
