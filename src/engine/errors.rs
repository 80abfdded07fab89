use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Chips, GameKind, PlayerId, SessionId};

/// Категория ошибки движка. Все они нефатальные: состояние не меняется,
/// ошибка просто возвращается вызывающему.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorKind {
    /// Неверные входные данные: ставка, состав, повторный вход.
    Validation,
    /// Действие не в свой ход или после stand.
    Turn,
    /// Действие не в той фазе жизненного цикла.
    Lifecycle,
}

/// Ошибки игровых движков.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Игрок {0} уже в игре")]
    AlreadyInSession(PlayerId),

    #[error("Сессия заполнена: максимум {capacity} игроков")]
    SessionFull { capacity: u8 },

    #[error("Игра уже началась")]
    SessionAlreadyStarted,

    #[error("Минимальная ставка: {min}")]
    BelowMinimumBet { min: Chips },

    #[error("Максимальная ставка: {max}")]
    AboveMaximumBet { max: Chips },

    #[error("Неверная ставка: {0}")]
    InvalidBet(String),

    #[error("Игрок {0} не участвует в этой сессии")]
    NotInSession(PlayerId),

    #[error("Удвоение возможно только при двух картах")]
    DoubleNotAllowed,

    #[error("Сейчас не ход игрока с id={0}")]
    NotPlayersTurn(PlayerId),

    #[error("Игрок {0} уже остановился")]
    AlreadyStanding(PlayerId),

    #[error("Необходимо минимум {required} игроков, сейчас {seated}")]
    NotEnoughPlayers { required: usize, seated: usize },

    #[error("Игра ещё не началась")]
    NotStarted,

    #[error("Раунд уже завершён")]
    RoundComplete,

    #[error("Раунд ещё не завершён")]
    RoundNotComplete,

    #[error("Раунд уже рассчитан")]
    AlreadySettled,

    #[error("Время для ставок истекло")]
    BettingClosed,

    #[error("Рулетка уже прокручена в этом раунде")]
    AlreadySpun,

    #[error("Комната стартует сама, когда наберётся {capacity} игроков")]
    ManualStartInRoom { capacity: u8 },

    #[error("Сессия {0} уже закрыта")]
    SessionClosed(SessionId),

    #[error("Действие для {requested} не подходит к игре {actual}")]
    WrongGame { requested: GameKind, actual: GameKind },
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        use GameError::*;
        match self {
            AlreadyInSession(_)
            | SessionFull { .. }
            | BelowMinimumBet { .. }
            | AboveMaximumBet { .. }
            | InvalidBet(_)
            | NotInSession(_)
            | DoubleNotAllowed
            | WrongGame { .. } => ErrorKind::Validation,

            NotPlayersTurn(_) | AlreadyStanding(_) => ErrorKind::Turn,

            SessionAlreadyStarted
            | NotEnoughPlayers { .. }
            | NotStarted
            | RoundComplete
            | RoundNotComplete
            | AlreadySettled
            | BettingClosed
            | AlreadySpun
            | ManualStartInRoom { .. }
            | SessionClosed(_) => ErrorKind::Lifecycle,
        }
    }
}
