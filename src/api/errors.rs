use serde::{Deserialize, Serialize};

use crate::casino::CasinoError;
use crate::domain::{PlayerId, SessionId};
use crate::engine::errors::{ErrorKind, GameError};
use crate::infra::ledger::LedgerError;
use crate::lobby::registry::RegistryError;

/// Ошибки внешнего API (то, что отдаём фронту / клиенту).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    /// Неправильные входные данные: ставка, состав, комната.
    BadRequest(String),

    /// Действие не в свой ход.
    NotYourTurn(String),

    /// Команда не подходит к текущей фазе раунда.
    InvalidCommand(String),

    SessionNotFound(SessionId),

    /// Игрок не сидит ни в одной сессии.
    PlayerNotInSession(PlayerId),

    /// Не хватило баланса на ставку.
    InsufficientFunds(String),
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::Validation => ApiError::BadRequest(msg),
            ErrorKind::Turn => ApiError::NotYourTurn(msg),
            ErrorKind::Lifecycle => ApiError::InvalidCommand(msg),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { .. } => ApiError::InsufficientFunds(err.to_string()),
            LedgerError::UnknownAccount(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Game(e) => e.into(),
            RegistryError::SessionNotFound(id) => ApiError::SessionNotFound(id),
            RegistryError::PlayerNotInSession(id) => ApiError::PlayerNotInSession(id),
            RegistryError::InvalidRoom(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<CasinoError> for ApiError {
    fn from(err: CasinoError) -> Self {
        match err {
            CasinoError::Game(e) => e.into(),
            CasinoError::Registry(e) => e.into(),
            CasinoError::Ledger(e) => e.into(),
        }
    }
}
